use crate::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::{Actor, Role};
use crate::service::token::validate_token;
use rocket::http::Status;
use rocket::outcome::{Outcome, try_outcome};
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use sqlx::PgPool;
use std::marker::PhantomData;
use uuid::Uuid;

/// The user behind a valid bearer token, freshly loaded from the store.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
}

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor { id: self.id, role: self.role }
    }
}

pub fn has_any_role(user: &CurrentUser, roles: &[Role]) -> bool {
    roles.contains(&user.role)
}

pub(crate) fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(token) = req.headers().get_one("Authorization").and_then(parse_bearer) else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
        };

        let (Some(config), Some(pool)) = (req.rocket().state::<Config>(), req.rocket().state::<PgPool>()) else {
            return Outcome::Error((Status::InternalServerError, AppError::Unauthorized));
        };

        let claims = match validate_token(token, &config.auth) {
            Ok(claims) => claims,
            Err(err) => return Outcome::Error((Status::Unauthorized, err)),
        };

        let repo = PostgresRepository { pool: pool.clone() };
        match repo.get_user_by_id(&claims.sub).await {
            Ok(Some(user)) => {
                let current_user = CurrentUser {
                    id: user.id,
                    email: user.email,
                    name: user.name,
                    phone: user.phone,
                    role: user.role,
                };
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Ok(None) => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
            Err(err) => Outcome::Error((Status::InternalServerError, err)),
        }
    }
}

/// A named set of roles a route requires.
pub trait Capability {
    const ROLES: &'static [Role];
}

/// Any signed-in user.
pub struct Authenticated;

/// Shop staff: administrators and barbers.
pub struct Staff;

pub struct Admin;

impl Capability for Authenticated {
    const ROLES: &'static [Role] = &Role::ALL;
}

impl Capability for Staff {
    const ROLES: &'static [Role] = &[Role::Admin, Role::Barber];
}

impl Capability for Admin {
    const ROLES: &'static [Role] = &[Role::Admin];
}

/// A [`CurrentUser`] whose role is one of `C::ROLES`; otherwise the request fails with 403.
pub struct Authorized<C> {
    pub user: CurrentUser,
    _capability: PhantomData<fn() -> C>,
}

impl<C: Capability> Authorized<C> {
    fn check(user: CurrentUser) -> Result<Self, AppError> {
        if has_any_role(&user, C::ROLES) {
            Ok(Authorized {
                user,
                _capability: PhantomData,
            })
        } else {
            Err(AppError::Forbidden("Insufficient permissions".to_string()))
        }
    }
}

#[rocket::async_trait]
impl<'r, C: Capability + 'static> FromRequest<'r> for Authorized<C> {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let user = try_outcome!(req.guard::<CurrentUser>().await);
        let user_id = user.id;
        let role = user.role;

        match Self::check(user) {
            Ok(authorized) => Outcome::Success(authorized),
            Err(err) => {
                tracing::warn!(user_id = %user_id, role = %role, uri = %req.uri(), "insufficient role");
                Outcome::Error((Status::Forbidden, err))
            }
        }
    }
}

fn bearer_security_input() -> RequestHeaderInput {
    let security_scheme = SecurityScheme {
        description: Some("Bearer token. Obtain one from POST /api/auth/login or /api/auth/register.".to_string()),
        data: SecuritySchemeData::Http {
            scheme: "bearer".to_string(),
            bearer_format: Some("JWT".to_string()),
        },
        extensions: Object::default(),
    };

    let mut security_req = SecurityRequirement::new();
    security_req.insert("bearerAuth".to_string(), Vec::new());

    RequestHeaderInput::Security("bearerAuth".to_string(), security_scheme, security_req)
}

fn auth_responses(include_forbidden: bool) -> Responses {
    use rocket_okapi::okapi::openapi3::{RefOr, Response};
    let mut responses = Responses::default();
    responses.responses.insert(
        "401".to_string(),
        RefOr::Object(Response {
            description: "Unauthorized - Authentication required".to_string(),
            ..Default::default()
        }),
    );
    if include_forbidden {
        responses.responses.insert(
            "403".to_string(),
            RefOr::Object(Response {
                description: "Forbidden - Role not allowed".to_string(),
                ..Default::default()
            }),
        );
    }
    responses
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(bearer_security_input())
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        Ok(auth_responses(false))
    }
}

impl<'a, C: Capability + 'static> OpenApiFromRequest<'a> for Authorized<C> {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(bearer_security_input())
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        Ok(auth_responses(true))
    }
}
