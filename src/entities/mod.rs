pub mod inventory_entry;
pub mod medicine;
pub mod pharmacy;

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stock availability tag shared by the catalog and per-pharmacy inventory.
///
/// The stored value is operator-set; the display-side classification derived
/// from a raw stock count lives in `services::inventory::classify_stock` and
/// never writes back here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[sea_orm(string_value = "in_stock")]
    InStock,
    #[sea_orm(string_value = "low_stock")]
    LowStock,
    #[sea_orm(string_value = "out_of_stock")]
    OutOfStock,
}

impl Default for Availability {
    fn default() -> Self {
        Availability::InStock
    }
}

/// JSON-backed list of strings used for the medical metadata columns
/// (indications, contraindications, side effects).
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
pub struct StringList(pub Vec<String>);

impl From<Vec<String>> for StringList {
    fn from(items: Vec<String>) -> Self {
        StringList(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Availability::LowStock).unwrap(),
            "\"low_stock\""
        );
        let parsed: Availability = serde_json::from_str("\"out_of_stock\"").unwrap();
        assert_eq!(parsed, Availability::OutOfStock);
    }
}
