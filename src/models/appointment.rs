use crate::models::catalog::{Service, ServiceResponse};
use crate::models::user::UserProfile;
use chrono::{DateTime, Utc};
use crate::error::app_error::AppError;
use rocket::{FromForm, FromFormField};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, JsonSchema, FromFormField, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AppointmentStatus {
    #[default]
    #[field(value = "PENDING")]
    Pending,
    #[field(value = "CONFIRMED")]
    Confirmed,
    #[field(value = "COMPLETED")]
    Completed,
    #[field(value = "CANCELLED")]
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "PENDING"),
            AppointmentStatus::Confirmed => write!(f, "CONFIRMED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub barber_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An appointment joined with the service it books and the people involved.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDetails {
    pub appointment: Appointment,
    pub service: Service,
    pub client: UserProfile,
    pub barber: Option<UserProfile>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub barber_id: Option<Uuid>,
}

/// Already-validated changes for an existing appointment. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentChanges {
    pub date: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub barber_id: Option<Uuid>,
    pub notes: Option<String>,
    /// The write only applies while the stored status still equals this value.
    pub expected_status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AppointmentFilters {
    pub status: Option<AppointmentStatus>,
    pub client_id: Option<Uuid>,
    pub barber_id: Option<Uuid>,
}

/// Query string of the staff listing: `?status=&clientId=&barberId=`.
#[derive(FromForm, Debug, Default, JsonSchema)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
    #[field(name = "clientId")]
    #[schemars(rename = "clientId")]
    pub client_id: Option<String>,
    #[field(name = "barberId")]
    #[schemars(rename = "barberId")]
    pub barber_id: Option<String>,
}

impl AppointmentListQuery {
    pub fn filters(&self) -> Result<AppointmentFilters, AppError> {
        let parse = |raw: &Option<String>, what: &str| {
            raw.as_deref()
                .map(|id| Uuid::parse_str(id).map_err(|e| AppError::uuid(format!("Invalid {} id", what), e)))
                .transpose()
        };

        Ok(AppointmentFilters {
            status: self.status,
            client_id: parse(&self.client_id, "client")?,
            barber_id: parse(&self.barber_id, "barber")?,
        })
    }
}

#[derive(Deserialize, Debug, Clone, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    /// ISO 8601 date or date-time.
    #[validate(length(min = 1, message = "Date must be valid"))]
    pub date: String,
    pub service_id: Uuid,
    pub barber_id: Option<Uuid>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    #[validate(length(min = 1, message = "Date must be valid"))]
    pub date: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub barber_id: Option<Uuid>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub barber_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub service: ServiceResponse,
    pub client: UserProfile,
    pub barber: Option<UserProfile>,
}

impl From<&AppointmentDetails> for AppointmentResponse {
    fn from(details: &AppointmentDetails) -> Self {
        let appointment = &details.appointment;
        Self {
            id: appointment.id,
            date: appointment.date,
            status: appointment.status,
            notes: appointment.notes.clone(),
            client_id: appointment.client_id,
            service_id: appointment.service_id,
            barber_id: appointment.barber_id,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
            service: ServiceResponse::from(&details.service),
            client: details.client.clone(),
            barber: details.barber.clone(),
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct AppointmentMessageResponse {
    pub message: String,
    pub appointment: AppointmentResponse,
}
