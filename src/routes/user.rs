use crate::auth::{Admin, Authenticated, Authorized};
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::message::MessageResponse;
use crate::models::user::{Role, UpdateRoleRequest, UserMessageResponse, UserResponse};
use crate::service::user::UserService;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;

/// List users, newest first, optionally filtered by role
#[openapi(tag = "Users")]
#[get("/?<role>")]
pub async fn list_users(pool: &State<PgPool>, _admin: Authorized<Admin>, role: Option<Role>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let users = UserService::new(&repo).find_all(role).await?;
    Ok(Json(users))
}

/// List barbers, for picking one when booking
#[openapi(tag = "Users")]
#[get("/barbers")]
pub async fn list_barbers(pool: &State<PgPool>, _auth: Authorized<Authenticated>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let barbers = UserService::new(&repo).find_barbers().await?;
    Ok(Json(barbers))
}

/// Get a user by id
#[openapi(tag = "Users")]
#[get("/<id>")]
pub async fn get_user(pool: &State<PgPool>, _auth: Authorized<Authenticated>, id: &str) -> Result<Json<UserResponse>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid user id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let user = UserService::new(&repo).find_one(&uuid).await?;
    Ok(Json(user))
}

/// Change a user's role
#[openapi(tag = "Users")]
#[patch("/<id>/role", data = "<payload>")]
pub async fn update_user_role(
    pool: &State<PgPool>,
    _admin: Authorized<Admin>,
    id: &str,
    payload: Json<UpdateRoleRequest>,
) -> Result<Json<UserMessageResponse>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid user id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = UserService::new(&repo).update_role(&uuid, payload.role).await?;
    Ok(Json(response))
}

/// Delete a user and the appointments they booked
#[openapi(tag = "Users")]
#[delete("/<id>")]
pub async fn delete_user(pool: &State<PgPool>, _admin: Authorized<Admin>, id: &str) -> Result<Json<MessageResponse>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid user id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let response = UserService::new(&repo).remove(&uuid).await?;
    Ok(Json(response))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_users, list_barbers, get_user, update_user_role, delete_user]
}

#[cfg(test)]
mod tests {
    use crate::build_rocket;
    use crate::database::user::UserRepository;
    use crate::models::user::Role;
    use crate::service::token::issue_token;
    use crate::test_utils::{database_config, database_repository, new_user, offline_config};
    use rocket::http::{ContentType, Header, Status};
    use rocket::local::asynchronous::Client;

    #[rocket::async_test]
    async fn directory_requires_a_token() {
        let client = Client::untracked(build_rocket(offline_config())).await.expect("valid rocket instance");

        assert_eq!(client.get("/api/users").dispatch().await.status(), Status::Unauthorized);
        assert_eq!(client.get("/api/users/barbers").dispatch().await.status(), Status::Unauthorized);

        let response = client
            .patch(format!("/api/users/{}/role", uuid::Uuid::new_v4()))
            .header(ContentType::JSON)
            .body(r#"{"role":"ADMIN"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    #[ignore = "requires database"]
    async fn only_admins_manage_the_directory() {
        let config = database_config();
        let repo = database_repository().await;
        let barber = repo.create_user(&new_user(Role::Barber)).await.unwrap();
        let bearer = Header::new("Authorization", format!("Bearer {}", issue_token(&barber, &config.auth).unwrap()));
        let client = Client::untracked(build_rocket(config)).await.expect("valid rocket instance");

        assert_eq!(client.get("/api/users").header(bearer.clone()).dispatch().await.status(), Status::Forbidden);
        let promote = client
            .patch(format!("/api/users/{}/role", barber.id))
            .header(ContentType::JSON)
            .header(bearer.clone())
            .body(r#"{"role":"ADMIN"}"#)
            .dispatch()
            .await;
        assert_eq!(promote.status(), Status::Forbidden);
        assert_eq!(repo.get_user_by_id(&barber.id).await.unwrap().unwrap().role, Role::Barber);

        assert_eq!(client.get("/api/users/barbers").header(bearer).dispatch().await.status(), Status::Ok);
    }
}
