//! Operator tasks run by the `barbershop-admin` binary.

use crate::Config;
use crate::config::BootstrapConfig;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::user::{UserRepository, hash_password};
use crate::db::{init_pool, run_migrations};
use crate::error::app_error::AppError;
use crate::models::user::{NewUser, Role};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(Uuid),
    Promoted(Uuid),
    AlreadyAdmin(Uuid),
}

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct TableCounts {
    pub users: i64,
    pub services: i64,
    pub appointments: i64,
}

async fn connect(config: &Config) -> Result<PgPool, AppError> {
    let pool = init_pool(&config.database)
        .await
        .map_err(|e| AppError::db("Failed to initialize database pool", e))?;

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::db("Failed to run database migrations", e.into()))?;
    }

    Ok(pool)
}

/// Creates the bootstrap administrator, or promotes the account if the email is already registered.
pub async fn seed_admin(config: &Config) -> Result<SeedOutcome, AppError> {
    let pool = connect(config).await?;
    let repo = PostgresRepository { pool: pool.clone() };
    let outcome = ensure_admin(&repo, &config.bootstrap).await;
    pool.close().await;

    outcome
}

pub async fn count_records(config: &Config) -> Result<TableCounts, AppError> {
    let pool = connect(config).await?;
    let counts = sqlx::query_as::<_, TableCounts>(
        r#"
        SELECT (SELECT COUNT(*) FROM users) AS users,
               (SELECT COUNT(*) FROM services) AS services,
               (SELECT COUNT(*) FROM appointments) AS appointments
        "#,
    )
    .fetch_one(&pool)
    .await?;
    pool.close().await;

    Ok(counts)
}

pub(crate) async fn ensure_admin<R: UserRepository>(repo: &R, bootstrap: &BootstrapConfig) -> Result<SeedOutcome, AppError> {
    let (Some(email), Some(password)) = (bootstrap.admin_email.as_deref(), bootstrap.admin_password.as_deref()) else {
        return Err(AppError::BadRequest(
            "bootstrap.admin_email and bootstrap.admin_password must be configured".to_string(),
        ));
    };
    if password.len() < 6 {
        return Err(AppError::BadRequest("Password must be at least 6 characters".to_string()));
    }
    let email = email.trim().to_lowercase();

    match repo.get_user_by_email(&email).await? {
        Some(user) if user.role == Role::Admin => Ok(SeedOutcome::AlreadyAdmin(user.id)),
        Some(user) => {
            repo.update_user_role(&user.id, Role::Admin).await?;
            tracing::info!(user_id = %user.id, "existing account promoted to ADMIN");
            Ok(SeedOutcome::Promoted(user.id))
        }
        None => {
            let user = repo
                .create_user(&NewUser {
                    email,
                    password_hash: hash_password(password)?,
                    name: bootstrap.admin_name.clone(),
                    phone: None,
                    role: Role::Admin,
                })
                .await?;
            tracing::info!(user_id = %user.id, "bootstrap administrator created");
            Ok(SeedOutcome::Created(user.id))
        }
    }
}
