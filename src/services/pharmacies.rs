use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthService;
use crate::entities::pharmacy::{self, Entity as Pharmacy};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Pharmacy accounts: registration, credential checks, and profile edits.
#[derive(Clone)]
pub struct PharmacyService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
    event_sender: EventSender,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupInput {
    #[validate(length(min = 1, message = "Pharmacy name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SigninInput {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePharmacyInput {
    #[validate(length(min = 1, message = "Pharmacy name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "City cannot be empty"))]
    pub city: Option<String>,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
}

/// Returned by signup and signin. The model's credential hash is skipped
/// during serialization.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthenticatedSession {
    #[schema(value_type = Object)]
    pub pharmacy: pharmacy::Model,
    pub token: String,
}

impl PharmacyService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        auth: Arc<AuthService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            auth,
            event_sender,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup(&self, input: SignupInput) -> Result<AuthenticatedSession, ServiceError> {
        input.validate()?;

        let existing = Pharmacy::find()
            .filter(pharmacy::Column::Email.eq(input.email.as_str()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "A pharmacy with this email already exists".to_string(),
            ));
        }

        let password_hash = self.auth.hash_password(&input.password)?;

        let model = pharmacy::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            city: Set(input.city),
            address: Set(input.address),
            location: Set(input.location),
            phone: Set(input.phone),
            opening_hours: Set(input.opening_hours),
            image: Set(input.image),
            description: Set(input.description),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            ..Default::default()
        };

        let saved = model.insert(&*self.db).await?;
        info!(pharmacy_id = %saved.id, "pharmacy registered");

        self.event_sender
            .send(Event::PharmacyRegistered {
                pharmacy_id: saved.id,
            })
            .await;

        let token = self.auth.issue_token(saved.id, &saved.name, &saved.email)?;
        Ok(AuthenticatedSession {
            pharmacy: saved,
            token,
        })
    }

    /// Wrong email and wrong password return the same generic message so the
    /// endpoint does not leak which accounts exist.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signin(&self, input: SigninInput) -> Result<AuthenticatedSession, ServiceError> {
        input.validate()?;

        let pharmacy = Pharmacy::find()
            .filter(pharmacy::Column::Email.eq(input.email.as_str()))
            .one(&*self.db)
            .await?;

        let pharmacy = match pharmacy {
            Some(p) if self.auth.verify_password(&input.password, &p.password_hash) => p,
            _ => {
                warn!("failed signin attempt");
                return Err(ServiceError::Unauthorized(
                    "Incorrect email or password".to_string(),
                ));
            }
        };

        let token = self
            .auth
            .issue_token(pharmacy.id, &pharmacy.name, &pharmacy.email)?;
        Ok(AuthenticatedSession { pharmacy, token })
    }

    pub async fn get_pharmacy(&self, id: Uuid) -> Result<pharmacy::Model, ServiceError> {
        Pharmacy::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Pharmacy {} not found", id)))
    }

    pub async fn list_pharmacies(
        &self,
        search: Option<String>,
    ) -> Result<Vec<pharmacy::Model>, ServiceError> {
        let mut query = Pharmacy::find().order_by_desc(pharmacy::Column::CreatedAt);

        if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(pharmacy::Column::Name.contains(term.trim()));
        }

        Ok(query.all(&*self.db).await?)
    }

    /// Profile edit for the authenticated owner. Email and password changes
    /// are deliberately out of scope here.
    #[instrument(skip(self, input))]
    pub async fn update_parameters(
        &self,
        id: Uuid,
        input: UpdatePharmacyInput,
    ) -> Result<pharmacy::Model, ServiceError> {
        input.validate()?;

        let existing = self.get_pharmacy(id).await?;
        let mut active: pharmacy::ActiveModel = existing.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(opening_hours) = input.opening_hours {
            active.opening_hours = Set(Some(opening_hours));
        }
        if let Some(image) = input.image {
            active.image = Set(Some(image));
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(latitude) = input.latitude {
            active.latitude = Set(latitude);
        }
        if let Some(longitude) = input.longitude {
            active.longitude = Set(longitude);
        }

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send(Event::PharmacyUpdated {
                pharmacy_id: updated.id,
            })
            .await;

        Ok(updated)
    }
}
