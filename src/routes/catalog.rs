use crate::auth::{Admin, Authorized};
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::catalog::{ServiceListQuery, ServiceMessageResponse, ServiceRequest, ServiceResponse, ServiceUpdateRequest};
use crate::models::message::MessageResponse;
use crate::service::catalog::CatalogService;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// List services. Inactive ones are included only with `includeInactive=true`.
#[openapi(tag = "Services")]
#[get("/?<query..>")]
pub async fn list_services(pool: &State<PgPool>, query: ServiceListQuery) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let services = CatalogService::new(&repo).list_services(query.include_inactive()).await?;
    Ok(Json(services))
}

/// Get a service by id
#[openapi(tag = "Services")]
#[get("/<id>")]
pub async fn get_service(pool: &State<PgPool>, id: &str) -> Result<Json<ServiceResponse>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid service id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = CatalogService::new(&repo).get_service(&uuid).await?;
    Ok(Json(service))
}

/// Create a service
#[openapi(tag = "Services")]
#[post("/", data = "<payload>")]
pub async fn create_service(
    pool: &State<PgPool>,
    _admin: Authorized<Admin>,
    payload: Json<ServiceRequest>,
) -> Result<Custom<Json<ServiceMessageResponse>>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = CatalogService::new(&repo).create_service(&payload).await?;
    Ok(Custom(Status::Created, Json(response)))
}

/// Update some fields of a service
#[openapi(tag = "Services")]
#[patch("/<id>", data = "<payload>")]
pub async fn update_service(
    pool: &State<PgPool>,
    _admin: Authorized<Admin>,
    id: &str,
    payload: Json<ServiceUpdateRequest>,
) -> Result<Json<ServiceMessageResponse>, AppError> {
    payload.validate()?;
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid service id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = CatalogService::new(&repo).update_service(&uuid, &payload).await?;
    Ok(Json(response))
}

/// Delete a service together with its appointments
#[openapi(tag = "Services")]
#[delete("/<id>")]
pub async fn delete_service(pool: &State<PgPool>, _admin: Authorized<Admin>, id: &str) -> Result<Json<MessageResponse>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid service id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = CatalogService::new(&repo).delete_service(&uuid).await?;
    Ok(Json(response))
}

/// Activate or deactivate a service
#[openapi(tag = "Services")]
#[patch("/<id>/toggle")]
pub async fn toggle_service(pool: &State<PgPool>, _admin: Authorized<Admin>, id: &str) -> Result<Json<ServiceMessageResponse>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid service id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = CatalogService::new(&repo).toggle_active(&uuid).await?;
    Ok(Json(response))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_services, get_service, create_service, update_service, delete_service, toggle_service]
}
