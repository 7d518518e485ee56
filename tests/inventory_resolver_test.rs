mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{read_json, TestApp};
use pharmafind_api::entities::{inventory_entry, Availability};

/// Decimal fields serialize as JSON strings; compare them numerically.
fn as_price(value: &Value) -> f64 {
    value
        .as_str()
        .expect("price should serialize as a string")
        .parse()
        .expect("price should parse as a number")
}

#[tokio::test]
async fn unknown_ids_yield_empty_lists_not_errors() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/medicines/{}/pharmacies", Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"], json!([]));

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/pharmacies/{}/medicines", Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn added_stock_appears_in_both_views() {
    let app = TestApp::new().await;
    let (pharmacy_id, token) = app.signup_pharmacy("Pharmacie du Marché", "marche@test.cm").await;
    let medicine_id = app.seed_medicine("Amoxicilline").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/pharmacies/{}/inventory", pharmacy_id),
            Some(json!({
                "medicine_id": medicine_id,
                "stock": 42,
                "price": 1750,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Who carries Amoxicilline?
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/medicines/{}/pharmacies", medicine_id),
            None,
            None,
        )
        .await;
    let body = read_json(response).await;
    let rows = body["data"].as_array().expect("list expected");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(pharmacy_id.to_string()));
    assert_eq!(rows[0]["name"], json!("Pharmacie du Marché"));
    assert_eq!(as_price(&rows[0]["medicine_price"]), 1750.0);
    assert_eq!(rows[0]["medicine_stock"], json!(42));
    assert_eq!(rows[0]["availability"], json!("in_stock"));

    // What does the pharmacy stock?
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/pharmacies/{}/medicines", pharmacy_id),
            None,
            None,
        )
        .await;
    let body = read_json(response).await;
    let rows = body["data"].as_array().expect("list expected");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(medicine_id.to_string()));
    assert_eq!(rows[0]["name"], json!("Amoxicilline"));
    assert_eq!(as_price(&rows[0]["pharmacy_price"]), 1750.0);
    assert_eq!(rows[0]["pharmacy_stock"], json!(42));

    // Both views point at the same inventory line
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/medicines/{}/pharmacies", medicine_id),
            None,
            None,
        )
        .await;
    let body = read_json(response).await;
    assert!(body["data"][0]["inventory_id"].is_string());
}

#[tokio::test]
async fn two_pharmacies_carry_the_same_medicine_at_their_own_prices() {
    let app = TestApp::new().await;
    let (pharmacy_a, token_a) = app.signup_pharmacy("Pharmacie A", "a@test.cm").await;
    let (pharmacy_b, token_b) = app.signup_pharmacy("Pharmacie B", "b@test.cm").await;
    let medicine_id = app.seed_medicine("Ibuprofène").await;

    for (pharmacy_id, token, stock, price) in [
        (pharmacy_a, &token_a, 100, 2500),
        (pharmacy_b, &token_b, 5, 2400),
    ] {
        let response = app
            .request(
                Method::POST,
                &format!("/api/v1/pharmacies/{}/inventory", pharmacy_id),
                Some(json!({
                    "medicine_id": medicine_id,
                    "stock": stock,
                    "price": price,
                })),
                Some(token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/medicines/{}/pharmacies", medicine_id),
            None,
            None,
        )
        .await;
    let body = read_json(response).await;
    let rows = body["data"].as_array().expect("list expected");
    assert_eq!(rows.len(), 2);

    let row_a = rows
        .iter()
        .find(|r| r["id"] == json!(pharmacy_a.to_string()))
        .expect("pharmacy A row");
    let row_b = rows
        .iter()
        .find(|r| r["id"] == json!(pharmacy_b.to_string()))
        .expect("pharmacy B row");

    assert_eq!(as_price(&row_a["medicine_price"]), 2500.0);
    assert_eq!(row_a["medicine_stock"], json!(100));
    assert_eq!(row_a["availability"], json!("in_stock"));

    assert_eq!(as_price(&row_b["medicine_price"]), 2400.0);
    assert_eq!(row_b["medicine_stock"], json!(5));
    // 5 units is below the low-stock threshold
    assert_eq!(row_b["availability"], json!("low_stock"));
}

#[tokio::test]
async fn entries_with_unresolved_references_are_dropped_silently() {
    let app = TestApp::new().await;
    let (pharmacy_id, token) = app.signup_pharmacy("Pharmacie Réelle", "reelle@test.cm").await;
    let medicine_id = app.seed_medicine("Doliprane").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/pharmacies/{}/inventory", pharmacy_id),
            Some(json!({ "medicine_id": medicine_id, "stock": 30, "price": 1000 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Orphan: inventory row pointing at a pharmacy that does not exist
    let orphan = inventory_entry::ActiveModel {
        id: Set(Uuid::new_v4()),
        medicine_id: Set(medicine_id),
        pharmacy_id: Set(Uuid::new_v4()),
        stock: Set(10),
        price: Set(dec!(999)),
        availability: Set(Availability::LowStock),
        last_restocked: Set(Some(Utc::now())),
        ..Default::default()
    };
    orphan
        .insert(&*app.state.db)
        .await
        .expect("direct insert of orphan row");

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/medicines/{}/pharmacies", medicine_id),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let rows = body["data"].as_array().expect("list expected");
    assert_eq!(rows.len(), 1, "orphaned entry must be filtered out");
    assert_eq!(rows[0]["id"], json!(pharmacy_id.to_string()));
}

#[tokio::test]
async fn stored_operator_tag_wins_over_derived_classification() {
    let app = TestApp::new().await;
    let (pharmacy_id, token) = app.signup_pharmacy("Pharmacie Nuit", "nuit@test.cm").await;
    let medicine_id = app.seed_medicine("Aspirine").await;

    // 200 units would classify as in_stock; the operator says otherwise
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/pharmacies/{}/inventory", pharmacy_id),
            Some(json!({
                "medicine_id": medicine_id,
                "stock": 200,
                "price": 500,
                "availability": "out_of_stock",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/pharmacies/{}/medicines", pharmacy_id),
            None,
            None,
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"][0]["availability"], json!("out_of_stock"));
}
