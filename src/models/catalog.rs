use chrono::{DateTime, Utc};
use rocket::FromForm;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

/// A bookable offering of the shop.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Minutes.
    pub duration: i32,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be greater than or equal to 0"))]
    pub price: f64,
    #[validate(range(min = 5, message = "Minimum duration is 5 minutes"))]
    pub duration: i32,
    pub is_active: Option<bool>,
    pub image_url: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Deserialize, Debug, Clone, Default, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdateRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be greater than or equal to 0"))]
    pub price: Option<f64>,
    #[validate(range(min = 5, message = "Minimum duration is 5 minutes"))]
    pub duration: Option<i32>,
    pub is_active: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(FromForm, Debug, Default, JsonSchema)]
pub struct ServiceListQuery {
    #[field(name = "includeInactive")]
    #[schemars(rename = "includeInactive")]
    pub include_inactive: Option<String>,
}

impl ServiceListQuery {
    /// Only the literal `true` includes inactive services.
    pub fn include_inactive(&self) -> bool {
        self.include_inactive.as_deref() == Some("true")
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration: i32,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Service> for ServiceResponse {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            description: service.description.clone(),
            price: service.price,
            duration: service.duration,
            is_active: service.is_active,
            image_url: service.image_url.clone(),
            created_at: service.created_at,
            updated_at: service.updated_at,
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ServiceMessageResponse {
    pub message: String,
    pub service: ServiceResponse,
}
