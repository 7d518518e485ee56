use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::inventory_entry::{self, Entity as InventoryEntry};
use crate::entities::medicine::{self, Entity as Medicine};
use crate::entities::pharmacy::{self, Entity as Pharmacy};
use crate::entities::{Availability, StringList};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Below this count a non-zero stock is tagged `low_stock`.
pub const LOW_STOCK_THRESHOLD: i32 = 20;

/// Display heuristic for a raw stock count. Never written back to storage;
/// the operator-set tag on the entry wins in every view.
pub fn classify_stock(stock: i32) -> Availability {
    if stock <= 0 {
        Availability::OutOfStock
    } else if stock < LOW_STOCK_THRESHOLD {
        Availability::LowStock
    } else {
        Availability::InStock
    }
}

/// One pharmacy carrying a given medicine, with that pharmacy's price and
/// stock for it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PharmacyStockView {
    /// Pharmacy id
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: Option<String>,
    pub city: String,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub medicine_price: Decimal,
    pub medicine_stock: i32,
    pub availability: Availability,
    pub inventory_id: Uuid,
}

/// One medicine stocked by a given pharmacy, with that pharmacy's price and
/// stock for it. Medicine fields are enumerated rather than nested so the
/// per-pharmacy availability tag replaces the catalog one.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MedicineStockView {
    /// Medicine id
    pub id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub form: Option<String>,
    pub description: Option<String>,
    pub indications: StringList,
    pub contraindications: StringList,
    pub side_effects: StringList,
    pub manufacturer: Option<String>,
    pub pharmacy_price: Decimal,
    pub pharmacy_stock: i32,
    pub availability: Availability,
    pub inventory_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddStockInput {
    pub medicine_id: Uuid,
    pub stock: i32,
    pub price: Decimal,
    pub availability: Option<Availability>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateMedicineAndStockInput {
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
    pub manufacturer: String,
    pub stock: i32,
    pub price: Decimal,
    pub availability: Option<Availability>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateStockInput {
    pub stock: Option<i32>,
    pub price: Option<Decimal>,
    pub availability: Option<Availability>,
    pub last_restocked: Option<DateTime<Utc>>,
}

/// Read and write side of per-pharmacy stock. The read side answers the two
/// symmetric questions "who carries medicine M" and "what does pharmacy P
/// stock"; the write side owns the pharmacy-scoped stock lines.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// All pharmacies carrying the given medicine, each with its own price
    /// and stock. Unknown medicine ids yield an empty list, not an error.
    #[instrument(skip(self))]
    pub async fn pharmacies_carrying(
        &self,
        medicine_id: Uuid,
    ) -> Result<Vec<PharmacyStockView>, ServiceError> {
        let entries = InventoryEntry::find()
            .filter(inventory_entry::Column::MedicineId.eq(medicine_id))
            .all(&*self.db)
            .await?;

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let pharmacy_ids: Vec<Uuid> = entries.iter().map(|e| e.pharmacy_id).collect();
        let pharmacies: HashMap<Uuid, pharmacy::Model> = Pharmacy::find()
            .filter(pharmacy::Column::Id.is_in(pharmacy_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // Entries whose pharmacy no longer resolves are dropped, not errored
        let views = entries
            .into_iter()
            .filter_map(|entry| {
                let p = match pharmacies.get(&entry.pharmacy_id) {
                    Some(p) => p,
                    None => {
                        warn!(inventory_id = %entry.id, pharmacy_id = %entry.pharmacy_id,
                              "dropping inventory entry with unresolved pharmacy");
                        return None;
                    }
                };
                Some(PharmacyStockView {
                    id: p.id,
                    name: p.name.clone(),
                    address: p.address.clone(),
                    location: p.location.clone(),
                    city: p.city.clone(),
                    phone: p.phone.clone(),
                    opening_hours: p.opening_hours.clone(),
                    description: p.description.clone(),
                    latitude: p.latitude,
                    longitude: p.longitude,
                    medicine_price: entry.price,
                    medicine_stock: entry.stock,
                    availability: entry.availability,
                    inventory_id: entry.id,
                })
            })
            .collect();

        Ok(views)
    }

    /// All medicines the given pharmacy stocks, with its price and stock for
    /// each. Symmetric to `pharmacies_carrying`.
    #[instrument(skip(self))]
    pub async fn medicines_stocked_by(
        &self,
        pharmacy_id: Uuid,
    ) -> Result<Vec<MedicineStockView>, ServiceError> {
        let entries = InventoryEntry::find()
            .filter(inventory_entry::Column::PharmacyId.eq(pharmacy_id))
            .all(&*self.db)
            .await?;

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let medicine_ids: Vec<Uuid> = entries.iter().map(|e| e.medicine_id).collect();
        let medicines: HashMap<Uuid, medicine::Model> = Medicine::find()
            .filter(medicine::Column::Id.is_in(medicine_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let views = entries
            .into_iter()
            .filter_map(|entry| {
                let m = match medicines.get(&entry.medicine_id) {
                    Some(m) => m,
                    None => {
                        warn!(inventory_id = %entry.id, medicine_id = %entry.medicine_id,
                              "dropping inventory entry with unresolved medicine");
                        return None;
                    }
                };
                Some(Self::medicine_view(m, &entry))
            })
            .collect();

        Ok(views)
    }

    /// Links an existing catalog medicine to the pharmacy's stock. One line
    /// per (pharmacy, medicine) pair; duplicates are a Conflict.
    #[instrument(skip(self, input), fields(medicine_id = %input.medicine_id))]
    pub async fn add_existing_medicine_to_stock(
        &self,
        pharmacy_id: Uuid,
        input: AddStockInput,
    ) -> Result<MedicineStockView, ServiceError> {
        Self::validate_stock_and_price(input.stock, input.price)?;

        let medicine = Medicine::find_by_id(input.medicine_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Medicine {} not found", input.medicine_id))
            })?;

        let duplicate = InventoryEntry::find()
            .filter(inventory_entry::Column::PharmacyId.eq(pharmacy_id))
            .filter(inventory_entry::Column::MedicineId.eq(input.medicine_id))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(
                "This medicine is already in the pharmacy's inventory".to_string(),
            ));
        }

        let availability = input.availability.unwrap_or_else(|| classify_stock(input.stock));
        let entry = inventory_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            medicine_id: Set(input.medicine_id),
            pharmacy_id: Set(pharmacy_id),
            stock: Set(input.stock),
            price: Set(input.price),
            availability: Set(availability),
            last_restocked: Set(Some(Utc::now())),
            ..Default::default()
        };
        let saved = entry.insert(&*self.db).await?;
        info!(inventory_id = %saved.id, "stock line added");

        self.event_sender
            .send(Event::StockLineAdded {
                pharmacy_id,
                medicine_id: saved.medicine_id,
            })
            .await;

        Ok(Self::medicine_view(&medicine, &saved))
    }

    /// Creates a catalog medicine and links it to the pharmacy in one call.
    /// Inputs are fully validated before any insert. The two inserts are not
    /// transactional: if the linking step fails after the catalog insert
    /// committed, the error carries the orphaned medicine id.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_medicine_and_stock(
        &self,
        pharmacy_id: Uuid,
        input: CreateMedicineAndStockInput,
    ) -> Result<MedicineStockView, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Medicine name is required".to_string(),
            ));
        }
        if input.manufacturer.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Manufacturer is required".to_string(),
            ));
        }
        Self::validate_stock_and_price(input.stock, input.price)?;

        let availability = input.availability.unwrap_or_else(|| classify_stock(input.stock));

        let medicine = medicine::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            dosage: Set(input.dosage),
            form: Set(input.form),
            description: Set(input.description),
            indications: Set(StringList::from(input.indications)),
            contraindications: Set(StringList::from(input.contraindications)),
            side_effects: Set(StringList::from(input.side_effects)),
            manufacturer: Set(Some(input.manufacturer)),
            availability: Set(availability),
            price: Set(Some(input.price)),
            ..Default::default()
        };
        let medicine = medicine.insert(&*self.db).await?;

        self.event_sender
            .send(Event::MedicineCreated {
                medicine_id: medicine.id,
            })
            .await;

        let entry = inventory_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            medicine_id: Set(medicine.id),
            pharmacy_id: Set(pharmacy_id),
            stock: Set(input.stock),
            price: Set(input.price),
            availability: Set(availability),
            last_restocked: Set(Some(Utc::now())),
            ..Default::default()
        };
        let saved = match entry.insert(&*self.db).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(medicine_id = %medicine.id, error = %e,
                      "medicine created but inventory link failed");
                return Err(ServiceError::PartialFailure {
                    medicine_id: medicine.id,
                });
            }
        };
        info!(inventory_id = %saved.id, medicine_id = %medicine.id,
              "medicine created and stocked");

        self.event_sender
            .send(Event::StockLineAdded {
                pharmacy_id,
                medicine_id: medicine.id,
            })
            .await;

        Ok(Self::medicine_view(&medicine, &saved))
    }

    /// Patches a stock line. The update filters on both the line id and the
    /// pharmacy id so a line owned by another pharmacy reports NotFound
    /// instead of being touched.
    #[instrument(skip(self, input))]
    pub async fn update_stock_line(
        &self,
        pharmacy_id: Uuid,
        inventory_id: Uuid,
        input: UpdateStockInput,
    ) -> Result<MedicineStockView, ServiceError> {
        if let Some(stock) = input.stock {
            if stock < 0 {
                return Err(ServiceError::ValidationError(
                    "Stock cannot be negative".to_string(),
                ));
            }
        }
        if let Some(price) = input.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
        }
        if input.stock.is_none()
            && input.price.is_none()
            && input.availability.is_none()
            && input.last_restocked.is_none()
        {
            return Err(ServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        let mut update = InventoryEntry::update_many()
            .filter(inventory_entry::Column::Id.eq(inventory_id))
            .filter(inventory_entry::Column::PharmacyId.eq(pharmacy_id));

        if let Some(stock) = input.stock {
            update = update
                .col_expr(inventory_entry::Column::Stock, Expr::value(stock))
                .col_expr(
                    inventory_entry::Column::LastRestocked,
                    Expr::value(Some(Utc::now())),
                );
        }
        if let Some(price) = input.price {
            update = update.col_expr(inventory_entry::Column::Price, Expr::value(price));
        }
        if let Some(availability) = input.availability {
            update = update.col_expr(
                inventory_entry::Column::Availability,
                Expr::value(availability),
            );
        }
        if let Some(last_restocked) = input.last_restocked {
            update = update.col_expr(
                inventory_entry::Column::LastRestocked,
                Expr::value(Some(last_restocked)),
            );
        }
        // update_many bypasses ActiveModelBehavior, stamp updated_at here
        update = update.col_expr(
            inventory_entry::Column::UpdatedAt,
            Expr::value(Some(Utc::now())),
        );

        let result = update.exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "Stock line not found for this pharmacy".to_string(),
            ));
        }

        let (updated, medicine) = InventoryEntry::find_by_id(inventory_id)
            .find_also_related(Medicine)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError("updated stock line disappeared".to_string())
            })?;
        let medicine = medicine.ok_or_else(|| {
            ServiceError::InternalError("stock line has no catalog entry".to_string())
        })?;

        self.event_sender
            .send(Event::StockLineUpdated {
                pharmacy_id,
                inventory_id,
            })
            .await;

        Ok(Self::medicine_view(&medicine, &updated))
    }

    /// Deletes a stock line with the same double-filter scoping as
    /// `update_stock_line`. The shared medicine row is never touched.
    #[instrument(skip(self))]
    pub async fn remove_stock_line(
        &self,
        pharmacy_id: Uuid,
        inventory_id: Uuid,
    ) -> Result<(), ServiceError> {
        let result = InventoryEntry::delete_many()
            .filter(inventory_entry::Column::Id.eq(inventory_id))
            .filter(inventory_entry::Column::PharmacyId.eq(pharmacy_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "Stock line not found for this pharmacy".to_string(),
            ));
        }
        info!(%inventory_id, "stock line removed");

        self.event_sender
            .send(Event::StockLineRemoved {
                pharmacy_id,
                inventory_id,
            })
            .await;

        Ok(())
    }

    fn validate_stock_and_price(stock: i32, price: Decimal) -> Result<(), ServiceError> {
        if stock < 0 {
            return Err(ServiceError::ValidationError(
                "Stock cannot be negative".to_string(),
            ));
        }
        if price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn medicine_view(
        medicine: &medicine::Model,
        entry: &inventory_entry::Model,
    ) -> MedicineStockView {
        MedicineStockView {
            id: medicine.id,
            name: medicine.name.clone(),
            dosage: medicine.dosage.clone(),
            form: medicine.form.clone(),
            description: medicine.description.clone(),
            indications: medicine.indications.clone(),
            contraindications: medicine.contraindications.clone(),
            side_effects: medicine.side_effects.clone(),
            manufacturer: medicine.manufacturer.clone(),
            pharmacy_price: entry.price,
            pharmacy_stock: entry.stock,
            availability: entry.availability,
            inventory_id: entry.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stock_is_out_of_stock() {
        assert_eq!(classify_stock(0), Availability::OutOfStock);
    }

    #[test]
    fn one_unit_is_low_stock() {
        assert_eq!(classify_stock(1), Availability::LowStock);
    }

    #[test]
    fn nineteen_units_is_low_stock() {
        assert_eq!(classify_stock(LOW_STOCK_THRESHOLD - 1), Availability::LowStock);
    }

    #[test]
    fn twenty_units_is_in_stock() {
        assert_eq!(classify_stock(LOW_STOCK_THRESHOLD), Availability::InStock);
        assert_eq!(classify_stock(150), Availability::InStock);
    }

    #[test]
    fn negative_count_is_out_of_stock() {
        assert_eq!(classify_stock(-3), Availability::OutOfStock);
    }
}
