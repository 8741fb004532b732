use crate::auth::{Admin, Authenticated, Authorized, CurrentUser, Staff};
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::appointment::{AppointmentListQuery, AppointmentMessageResponse, AppointmentResponse, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::models::message::MessageResponse;
use crate::service::appointment::AppointmentService;
use crate::service::lifecycle::StatusAction;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

fn parse_appointment_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid appointment id", e))
}

/// Book an appointment for the signed-in user
#[openapi(tag = "Appointments")]
#[post("/", data = "<payload>")]
pub async fn create_appointment(
    pool: &State<PgPool>,
    auth: Authorized<Authenticated>,
    payload: Json<CreateAppointmentRequest>,
) -> Result<Custom<Json<AppointmentMessageResponse>>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = AppointmentService::new(&repo).create(&auth.user.id, &payload).await?;
    Ok(Custom(Status::Created, Json(response)))
}

/// List appointments, optionally filtered by status, client or barber
#[openapi(tag = "Appointments")]
#[get("/?<query..>")]
pub async fn list_appointments(pool: &State<PgPool>, _staff: Authorized<Staff>, query: AppointmentListQuery) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let filters = query.filters()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let appointments = AppointmentService::new(&repo).find_all(&filters).await?;
    Ok(Json(appointments))
}

/// Appointments of the signed-in user: assigned ones for barbers, booked ones otherwise
#[openapi(tag = "Appointments")]
#[get("/my-appointments")]
pub async fn my_appointments(pool: &State<PgPool>, auth: Authorized<Authenticated>) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let appointments = AppointmentService::new(&repo).find_for_actor(&auth.user.actor()).await?;
    Ok(Json(appointments))
}

/// Get an appointment by id
#[openapi(tag = "Appointments")]
#[get("/<id>")]
pub async fn get_appointment(pool: &State<PgPool>, _auth: Authorized<Authenticated>, id: &str) -> Result<Json<AppointmentResponse>, AppError> {
    let uuid = parse_appointment_id(id)?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let appointment = AppointmentService::new(&repo).find_one(&uuid).await?;
    Ok(Json(appointment))
}

/// Change date, barber or notes; a status change must be a valid transition for the caller's role
#[openapi(tag = "Appointments")]
#[patch("/<id>", data = "<payload>")]
pub async fn update_appointment(
    pool: &State<PgPool>,
    auth: Authorized<Authenticated>,
    id: &str,
    payload: Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentMessageResponse>, AppError> {
    payload.validate()?;
    let uuid = parse_appointment_id(id)?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = AppointmentService::new(&repo).update(&uuid, &payload, &auth.user.actor()).await?;
    Ok(Json(response))
}

async fn change_status(pool: &PgPool, id: &str, action: StatusAction, user: &CurrentUser) -> Result<Json<AppointmentMessageResponse>, AppError> {
    let uuid = parse_appointment_id(id)?;

    let repo = PostgresRepository { pool: pool.clone() };
    let response = AppointmentService::new(&repo).update_status(&uuid, action, &user.actor()).await?;
    Ok(Json(response))
}

/// Confirm a pending appointment
#[openapi(tag = "Appointments")]
#[patch("/<id>/confirm")]
pub async fn confirm_appointment(pool: &State<PgPool>, staff: Authorized<Staff>, id: &str) -> Result<Json<AppointmentMessageResponse>, AppError> {
    change_status(pool, id, StatusAction::Confirm, &staff.user).await
}

/// Mark an appointment as completed
#[openapi(tag = "Appointments")]
#[patch("/<id>/complete")]
pub async fn complete_appointment(pool: &State<PgPool>, staff: Authorized<Staff>, id: &str) -> Result<Json<AppointmentMessageResponse>, AppError> {
    change_status(pool, id, StatusAction::Complete, &staff.user).await
}

/// Cancel an appointment that is still pending or confirmed
#[openapi(tag = "Appointments")]
#[patch("/<id>/cancel")]
pub async fn cancel_appointment(pool: &State<PgPool>, auth: Authorized<Authenticated>, id: &str) -> Result<Json<AppointmentMessageResponse>, AppError> {
    change_status(pool, id, StatusAction::Cancel, &auth.user).await
}

/// Delete an appointment
#[openapi(tag = "Appointments")]
#[delete("/<id>")]
pub async fn delete_appointment(pool: &State<PgPool>, _admin: Authorized<Admin>, id: &str) -> Result<Json<MessageResponse>, AppError> {
    let uuid = parse_appointment_id(id)?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = AppointmentService::new(&repo).remove(&uuid).await?;
    Ok(Json(response))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![
        create_appointment,
        list_appointments,
        my_appointments,
        get_appointment,
        update_appointment,
        confirm_appointment,
        complete_appointment,
        cancel_appointment,
        delete_appointment
    ]
}
