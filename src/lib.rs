mod auth;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod seed;
mod service;
mod util;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use seed::{SeedOutcome, TableCounts, count_records, seed_admin};

use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// `RUST_LOG` takes precedence over the configured level, e.g.
/// `RUST_LOG=info,barbershop::service=debug`.
pub fn init_tracing(log_level: &str, json_format: bool) {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

        // A subscriber may already be installed (tests, embedding binaries).
        let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
    });
}

fn ensure_jwt_secret(auth_config: &config::AuthConfig) {
    let profile = std::env::var("ROCKET_PROFILE").unwrap_or_else(|_| "debug".to_string());

    if profile != "debug" && auth_config.jwt_secret == config::DEFAULT_JWT_SECRET {
        panic!(
            "JWT_SECRET must be set for profile '{}'. Generate one with: openssl rand -base64 32",
            profile
        );
    }
}

fn build_cors(cors_config: &config::CorsConfig) -> CorsOptions {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    // Validate that wildcard origins are not combined with credentials
    if is_wildcard && cors_config.allow_credentials {
        panic!(
            "Invalid CORS configuration: Cannot use wildcard origins (*) with credentials enabled. \
            Either set specific origins or disable credentials."
        );
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![
            Method::Get,
            Method::Post,
            Method::Put,
            Method::Delete,
            Method::Patch,
            Method::Options,
            Method::Head,
        ]
        .into_iter()
        .map(From::from)
        .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Authorization", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
}

fn get_swagger_config(openapi_url: &str) -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: openapi_url.to_string(),
        ..Default::default()
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return config::DEFAULT_API_BASE_PATH.to_string();
    }

    let mut normalized = if trimmed.starts_with('/') { trimmed.to_string() } else { format!("/{}", trimmed) };

    while normalized.ends_with('/') && normalized.len() > 1 {
        normalized.pop();
    }

    normalized
}

fn join_base_path(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let suffix = path.trim_start_matches('/');

    if base.is_empty() {
        format!("/{}", suffix)
    } else {
        format!("{}/{}", base, suffix)
    }
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
    openapi: rocket_okapi::okapi::openapi3::OpenApi,
}

fn collect_route_specs() -> Vec<RouteSpec> {
    let (auth_routes, auth_openapi) = app_routes::auth::routes();
    let (service_routes, service_openapi) = app_routes::catalog::routes();
    let (appointment_routes, appointment_openapi) = app_routes::appointment::routes();
    let (user_routes, user_openapi) = app_routes::user::routes();
    let (health_routes, health_openapi) = app_routes::health::routes();

    vec![
        RouteSpec {
            path: "/auth",
            routes: auth_routes,
            openapi: auth_openapi,
        },
        RouteSpec {
            path: "/services",
            routes: service_routes,
            openapi: service_openapi,
        },
        RouteSpec {
            path: "/appointments",
            routes: appointment_routes,
            openapi: appointment_openapi,
        },
        RouteSpec {
            path: "/users",
            routes: user_routes,
            openapi: user_openapi,
        },
        RouteSpec {
            path: "/health",
            routes: health_routes,
            openapi: health_openapi,
        },
    ]
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, enable_swagger: bool) -> Rocket<Build> {
    let route_specs = collect_route_specs();

    if enable_swagger {
        let mut openapi_list = Vec::new();
        for spec in route_specs {
            rocket = rocket.mount(format!("{}{}", base_path, spec.path), spec.routes);
            openapi_list.push((spec.path, spec.openapi));
        }

        let openapi_docs = match marge_spec_list(&openapi_list) {
            Ok(docs) => docs,
            Err(err) => panic!("Could not merge OpenAPI spec: {}", err),
        };

        let settings = rocket_okapi::settings::OpenApiSettings::default();
        rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

        let docs_path = join_base_path(base_path, "docs");
        let openapi_url = join_base_path(base_path, "openapi.json");
        rocket = rocket.mount(docs_path, make_swagger_ui(&get_swagger_config(&openapi_url)));
    } else {
        for spec in route_specs {
            rocket = rocket.mount(format!("{}{}", base_path, spec.path), spec.routes);
        }
    }

    rocket
}

fn server_figment(server: &config::ServerConfig) -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("port", server.port))
        .merge(("address", server.address.clone()))
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);
    ensure_jwt_secret(&config.auth);

    let cors = build_cors(&config.cors).to_cors().expect("Failed to create CORS fairing");
    let base_path = normalize_base_path(&config.api.base_path);

    let mut rocket = rocket::custom(server_figment(&config.server))
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()));

    rocket = mount_api_routes(rocket, &base_path, config.api.enable_swagger);

    rocket
        .register(
            base_path.as_str(),
            catchers![
                app_routes::error::bad_request,
                app_routes::error::unauthorized,
                app_routes::error::forbidden,
                app_routes::error::not_found,
                app_routes::error::conflict,
                app_routes::error::unprocessable_entity,
                app_routes::error::internal_error,
                app_routes::error::default_catcher
            ],
        )
        .manage(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::offline_config;
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;

    #[test]
    fn base_path_is_normalized() {
        assert_eq!(normalize_base_path(""), "/api");
        assert_eq!(normalize_base_path("v1/"), "/v1");
        assert_eq!(normalize_base_path(" /shop// "), "/shop");
        assert_eq!(normalize_base_path("/"), "/");
    }

    #[test]
    fn joins_paths_without_double_slashes() {
        assert_eq!(join_base_path("/api", "docs"), "/api/docs");
        assert_eq!(join_base_path("/api/", "/openapi.json"), "/api/openapi.json");
        assert_eq!(join_base_path("/", "docs"), "/docs");
    }

    #[test]
    #[should_panic(expected = "Invalid CORS configuration")]
    fn wildcard_origins_with_credentials_are_rejected() {
        build_cors(&config::CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
        });
    }

    #[rocket::async_test]
    async fn openapi_document_lists_every_resource() {
        let client = Client::untracked(build_rocket(offline_config())).await.expect("valid rocket instance");

        let response = client.get("/api/openapi.json").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let document: serde_json::Value = response.into_json().await.expect("json body");
        let paths = document["paths"].as_object().expect("paths object");
        for path in ["/auth/register", "/auth/login", "/auth/profile", "/appointments/{id}/confirm", "/appointments/my-appointments", "/users/barbers"] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }

    #[rocket::async_test]
    async fn responses_carry_request_id_and_security_headers() {
        let client = Client::untracked(build_rocket(offline_config())).await.expect("valid rocket instance");

        let response = client
            .get("/api/appointments")
            .header(rocket::http::Header::new("X-Request-Id", "trace-123"))
            .dispatch()
            .await;
        assert_eq!(response.headers().get_one("X-Request-Id"), Some("trace-123"));
        assert_eq!(response.headers().get_one("X-Content-Type-Options"), Some("nosniff"));
    }
}
