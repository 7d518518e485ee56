pub mod common;
pub mod inventory;
pub mod medicines;
pub mod pharmacies;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::AuthService;
use crate::events::EventSender;
use crate::services::catalog::MedicineService;
use crate::services::inventory::InventoryService;
use crate::services::pharmacies::PharmacyService;

/// Service instances shared across handlers through `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub medicines: Arc<MedicineService>,
    pub pharmacies: Arc<PharmacyService>,
    pub inventory: Arc<InventoryService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        auth: Arc<AuthService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            medicines: Arc::new(MedicineService::new(db.clone(), event_sender.clone())),
            pharmacies: Arc::new(PharmacyService::new(
                db.clone(),
                auth,
                event_sender.clone(),
            )),
            inventory: Arc::new(InventoryService::new(db, event_sender)),
        }
    }
}
