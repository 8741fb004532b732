use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::{NewUser, Role, User};
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::LazyLock;
use uuid::Uuid;

/// A real Argon2 hash generated once at startup, used as a timing decoy
/// so that login requests for non-existent users take the same time as
/// requests for existing users.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", &salt)
        .expect("failed to generate dummy hash")
        .to_string()
});

const USER_COLUMNS: &str = "id, email, password_hash, name, phone, role, created_at, updated_at";

#[async_trait::async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User, AppError>;
    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Returns the user only when it currently holds `role`.
    async fn get_user_with_role(&self, id: &Uuid, role: Role) -> Result<Option<User>, AppError>;
    /// Newest first.
    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, AppError>;
    async fn update_user_role(&self, id: &Uuid, role: Role) -> Result<User, AppError>;
    async fn delete_user(&self, id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl UserRepository for PostgresRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        let query = format!(
            r#"
            INSERT INTO users (email, password_hash, name, phone, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(&user.phone)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query).bind(id).fetch_optional(&self.pool).await?;

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query).bind(email).fetch_optional(&self.pool).await?;

        Ok(user)
    }

    async fn get_user_with_role(&self, id: &Uuid, role: Role) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = $2");
        let user = sqlx::query_as::<_, User>(&query).bind(id).bind(role).fetch_optional(&self.pool).await?;

        Ok(user)
    }

    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, AppError> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE $1::text IS NULL OR role = $1
            ORDER BY created_at DESC
            "#
        );
        let users = sqlx::query_as::<_, User>(&query).bind(role).fetch_all(&self.pool).await?;

        Ok(users)
    }

    async fn update_user_role(&self, id: &Uuid, role: Role) -> Result<User, AppError> {
        let query = format!(
            r#"
            UPDATE users
            SET role = $1, updated_at = now()
            WHERE id = $2
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&query).bind(role).bind(id).fetch_one(&self.pool).await?;

        Ok(user)
    }

    async fn delete_user(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(())
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;

    Ok(password_hash.to_string())
}

pub(crate) fn verify_password(user: &User, password: &str) -> Result<(), AppError> {
    let password_hash = PasswordHash::new(&user.password_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &password_hash)
        .map_err(|_| AppError::InvalidCredentials)?;

    Ok(())
}

/// Perform a throwaway Argon2 verification to equalize response timing
/// regardless of whether the target account exists.
pub(crate) fn dummy_verify(password: &str) {
    if let Ok(hash) = PasswordHash::new(&DUMMY_HASH) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
    }
}
