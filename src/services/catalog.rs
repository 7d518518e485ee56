use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::medicine::{self, Entity as Medicine};
use crate::entities::{inventory_entry, Availability, StringList};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Shared medicine catalog. Rows here are global; per-pharmacy price and
/// stock live on inventory entries.
#[derive(Clone)]
pub struct MedicineService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateMedicineInput {
    #[validate(length(min = 1, message = "Medicine name is required"))]
    pub name: String,
    pub dosage: Option<String>,
    pub form: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub indications: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub side_effects: Vec<String>,
    pub manufacturer: Option<String>,
    pub availability: Option<Availability>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateMedicineInput {
    #[validate(length(min = 1, message = "Medicine name cannot be empty"))]
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub form: Option<String>,
    pub description: Option<String>,
    pub indications: Option<Vec<String>>,
    pub contraindications: Option<Vec<String>>,
    pub side_effects: Option<Vec<String>>,
    pub manufacturer: Option<String>,
    pub availability: Option<Availability>,
    pub price: Option<Decimal>,
}

impl MedicineService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_medicine(
        &self,
        input: CreateMedicineInput,
    ) -> Result<medicine::Model, ServiceError> {
        input.validate()?;

        if let Some(price) = input.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
        }

        let model = medicine::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            dosage: Set(input.dosage),
            form: Set(input.form),
            description: Set(input.description),
            indications: Set(StringList::from(input.indications)),
            contraindications: Set(StringList::from(input.contraindications)),
            side_effects: Set(StringList::from(input.side_effects)),
            manufacturer: Set(input.manufacturer),
            availability: Set(input.availability.unwrap_or_default()),
            price: Set(input.price),
            ..Default::default()
        };

        let saved = model.insert(&*self.db).await?;
        info!(medicine_id = %saved.id, "medicine created");

        self.event_sender
            .send(Event::MedicineCreated {
                medicine_id: saved.id,
            })
            .await;

        Ok(saved)
    }

    pub async fn get_medicine(&self, id: Uuid) -> Result<medicine::Model, ServiceError> {
        Medicine::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Medicine {} not found", id)))
    }

    /// Lists the catalog newest first, optionally narrowed by a
    /// case-sensitive name substring.
    pub async fn list_medicines(
        &self,
        search: Option<String>,
    ) -> Result<Vec<medicine::Model>, ServiceError> {
        let mut query = Medicine::find().order_by_desc(medicine::Column::CreatedAt);

        if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(medicine::Column::Name.contains(term.trim()));
        }

        Ok(query.all(&*self.db).await?)
    }

    /// Partial update of the shared catalog fields. Global by design: every
    /// stocking pharmacy sees the change.
    #[instrument(skip(self, input))]
    pub async fn update_medicine(
        &self,
        id: Uuid,
        input: UpdateMedicineInput,
    ) -> Result<medicine::Model, ServiceError> {
        input.validate()?;

        if let Some(price) = input.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
        }

        let existing = self.get_medicine(id).await?;
        let mut active: medicine::ActiveModel = existing.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(dosage) = input.dosage {
            active.dosage = Set(Some(dosage));
        }
        if let Some(form) = input.form {
            active.form = Set(Some(form));
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(indications) = input.indications {
            active.indications = Set(StringList::from(indications));
        }
        if let Some(contraindications) = input.contraindications {
            active.contraindications = Set(StringList::from(contraindications));
        }
        if let Some(side_effects) = input.side_effects {
            active.side_effects = Set(StringList::from(side_effects));
        }
        if let Some(manufacturer) = input.manufacturer {
            active.manufacturer = Set(Some(manufacturer));
        }
        if let Some(availability) = input.availability {
            active.availability = Set(availability);
        }
        if let Some(price) = input.price {
            active.price = Set(Some(price));
        }

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send(Event::MedicineUpdated {
                medicine_id: updated.id,
            })
            .await;

        Ok(updated)
    }

    /// Removes a medicine and its inventory lines. Lines go first so views
    /// never see a dangling reference longer than necessary.
    #[instrument(skip(self))]
    pub async fn delete_medicine(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_medicine(id).await?;

        inventory_entry::Entity::delete_many()
            .filter(inventory_entry::Column::MedicineId.eq(id))
            .exec(&*self.db)
            .await?;

        existing.delete(&*self.db).await?;
        info!(medicine_id = %id, "medicine deleted");

        self.event_sender
            .send(Event::MedicineDeleted { medicine_id: id })
            .await;

        Ok(())
    }
}
