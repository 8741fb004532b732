use crate::Config;
use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, UserMessageResponse};
use crate::service::auth::AuthService;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Register a new client account
#[openapi(tag = "Auth")]
#[post("/register", data = "<payload>")]
pub async fn register(pool: &State<PgPool>, config: &State<Config>, payload: Json<RegisterRequest>) -> Result<Custom<Json<AuthResponse>>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = AuthService::new(&repo, &config.auth).register(&payload).await?;
    Ok(Custom(Status::Created, Json(response)))
}

/// Exchange credentials for a bearer token
#[openapi(tag = "Auth")]
#[post("/login", data = "<payload>")]
pub async fn login(pool: &State<PgPool>, config: &State<Config>, payload: Json<LoginRequest>) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = AuthService::new(&repo, &config.auth).login(&payload).await?;
    Ok(Json(response))
}

/// Profile of the signed-in user
#[openapi(tag = "Auth")]
#[get("/profile")]
pub async fn profile(pool: &State<PgPool>, config: &State<Config>, current_user: CurrentUser) -> Result<Json<UserMessageResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = AuthService::new(&repo, &config.auth).profile(&current_user.id).await?;
    Ok(Json(response))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register, login, profile]
}
