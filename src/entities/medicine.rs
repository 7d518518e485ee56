use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Availability, StringList};

/// Medicine catalog entity, shared across all pharmacies
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "medicines")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Medicine name
    pub name: String,

    /// Dosage description (e.g., "500 mg")
    pub dosage: Option<String>,

    /// Pharmaceutical form (e.g., "comprimé", "sirop")
    pub form: Option<String>,

    pub description: Option<String>,

    /// Conditions the medicine treats
    #[sea_orm(column_type = "Json")]
    pub indications: StringList,

    #[sea_orm(column_type = "Json")]
    pub contraindications: StringList,

    #[sea_orm(column_type = "Json")]
    pub side_effects: StringList,

    pub manufacturer: Option<String>,

    /// Catalog-level default availability tag
    pub availability: Availability,

    /// Catalog default price, only meaningful before any pharmacy stocks
    /// the medicine; per-pharmacy prices live on inventory entries
    pub price: Option<Decimal>,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_entry::Entity")]
    InventoryEntries,
}

impl Related<super::inventory_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryEntries.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            active_model.created_at = Set(Utc::now());
        }
        active_model.updated_at = Set(Some(Utc::now()));

        Ok(active_model)
    }
}
