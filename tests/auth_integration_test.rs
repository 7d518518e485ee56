mod common;

use axum::http::{Method, StatusCode};
use sea_orm::EntityTrait;
use serde_json::json;
use uuid::Uuid;

use common::{read_json, TestApp};
use pharmafind_api::entities::pharmacy;

const PASSWORD: &str = "correct-horse-battery";

#[tokio::test]
async fn signup_stores_a_hash_not_the_password() {
    let app = TestApp::new().await;
    let (pharmacy_id, _token) = app.signup_pharmacy("Pharmacie Sûre", "sure@test.cm").await;

    let stored = pharmacy::Entity::find_by_id(pharmacy_id)
        .one(&*app.state.db)
        .await
        .expect("query pharmacy")
        .expect("pharmacy row exists");

    assert_ne!(stored.password_hash, PASSWORD);
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn signup_response_never_leaks_the_credential() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/pharmacies/signup",
            Some(json!({
                "name": "Pharmacie Privée",
                "email": "privee@test.cm",
                "password": PASSWORD,
                "city": "Yaoundé",
                "address": "Avenue Kennedy",
                "latitude": 3.8667,
                "longitude": 11.5167,
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    let pharmacy = &body["data"]["pharmacy"];
    assert!(pharmacy.get("password_hash").is_none());
    assert!(pharmacy.get("password").is_none());
}

#[tokio::test]
async fn signup_rejects_out_of_range_coordinates() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/pharmacies/signup",
            Some(json!({
                "name": "Pharmacie Perdue",
                "email": "perdue@test.cm",
                "password": PASSWORD,
                "city": "Douala",
                "address": "Rue Inconnue",
                "latitude": 91.0,
                "longitude": 9.76,
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::new().await;
    app.signup_pharmacy("Pharmacie Une", "meme@test.cm").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pharmacies/signup",
            Some(json!({
                "name": "Pharmacie Deux",
                "email": "meme@test.cm",
                "password": PASSWORD,
                "city": "Douala",
                "address": "Rue Joffre",
                "latitude": 4.05,
                "longitude": 9.76,
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn signin_succeeds_with_correct_credentials() {
    let app = TestApp::new().await;
    app.signup_pharmacy("Pharmacie Connectée", "connectee@test.cm").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pharmacies/signin",
            Some(json!({ "email": "connectee@test.cm", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["data"]["token"].as_str().is_some());
    assert_eq!(body["data"]["pharmacy"]["email"], json!("connectee@test.cm"));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_identically() {
    let app = TestApp::new().await;
    app.signup_pharmacy("Pharmacie Discrète", "discrete@test.cm").await;

    let wrong_password = app
        .request(
            Method::POST,
            "/api/v1/pharmacies/signin",
            Some(json!({ "email": "discrete@test.cm", "password": "wrong-password-here" })),
            None,
        )
        .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password_body = read_json(wrong_password).await;

    let unknown_email = app
        .request(
            Method::POST,
            "/api/v1/pharmacies/signin",
            Some(json!({ "email": "nobody@test.cm", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email_body = read_json(unknown_email).await;

    // Same generic message in both cases, no account-existence leak
    assert_eq!(wrong_password_body["message"], unknown_email_body["message"]);
}

#[tokio::test]
async fn inventory_writes_require_a_token() {
    let app = TestApp::new().await;
    let (pharmacy_id, _token) = app.signup_pharmacy("Pharmacie Fermée", "fermee@test.cm").await;
    let medicine_id = app.seed_medicine("Azithromycine").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/pharmacies/{}/inventory", pharmacy_id),
            Some(json!({ "medicine_id": medicine_id, "stock": 10, "price": 2000 })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/pharmacies/{}/inventory", pharmacy_id),
            Some(json!({ "medicine_id": medicine_id, "stock": 10, "price": 2000 })),
            Some("not-a-valid-jwt"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn a_pharmacy_cannot_write_another_pharmacys_inventory() {
    let app = TestApp::new().await;
    let (pharmacy_a, _token_a) = app.signup_pharmacy("Pharmacie A", "a@test.cm").await;
    let (_pharmacy_b, token_b) = app.signup_pharmacy("Pharmacie B", "b@test.cm").await;
    let medicine_id = app.seed_medicine("Cétirizine").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/pharmacies/{}/inventory", pharmacy_a),
            Some(json!({ "medicine_id": medicine_id, "stock": 10, "price": 800 })),
            Some(&token_b),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn owner_can_update_their_profile_others_cannot() {
    let app = TestApp::new().await;
    let (pharmacy_id, token) = app.signup_pharmacy("Pharmacie Profil", "profil@test.cm").await;
    let (_other_id, other_token) = app.signup_pharmacy("Pharmacie Autre", "autre@test.cm").await;

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/pharmacies/{}", pharmacy_id),
            Some(json!({ "phone": "+237 699 00 00 00", "opening_hours": "08h-20h" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["phone"], json!("+237 699 00 00 00"));

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/pharmacies/{}", pharmacy_id),
            Some(json!({ "name": "Pharmacie Piratée" })),
            Some(&other_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn get_pharmacy_returns_not_found_for_unknown_id() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/pharmacies/{}", Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
