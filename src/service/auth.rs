use crate::config::AuthConfig;
use crate::database::user::{UserRepository, dummy_verify, hash_password, verify_password};
use crate::error::app_error::AppError;
use crate::models::user::{AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, User, UserMessageResponse, UserResponse};
use crate::service::token::issue_token;
use uuid::Uuid;

pub struct AuthService<'a, R> {
    repository: &'a R,
    config: &'a AuthConfig,
}

impl<'a, R: UserRepository> AuthService<'a, R> {
    pub fn new(repository: &'a R, config: &'a AuthConfig) -> Self {
        AuthService { repository, config }
    }

    /// Every self-registered account is a CLIENT.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&request.email);
        if self.repository.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::UserAlreadyExists(email));
        }

        let new_user = NewUser {
            email,
            password_hash: hash_password(&request.password)?,
            name: request.name.trim().to_string(),
            phone: request.phone.clone(),
            role: Role::Client,
        };
        let user = self.repository.create_user(&new_user).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::UserAlreadyExists(new_user.email.clone()),
            other => other,
        })?;
        tracing::info!(user_id = %user.id, "user registered");

        self.authenticated("User registered successfully", &user)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&request.email);
        let Some(user) = self.repository.get_user_by_email(&email).await? else {
            dummy_verify(&request.password);
            return Err(AppError::InvalidCredentials);
        };

        verify_password(&user, &request.password).inspect_err(|_| {
            tracing::warn!(user_id = %user.id, "failed login attempt");
        })?;

        self.authenticated("Login successful", &user)
    }

    pub async fn profile(&self, user_id: &Uuid) -> Result<UserMessageResponse, AppError> {
        let user = self
            .repository
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok(UserMessageResponse {
            message: "Profile retrieved successfully".to_string(),
            user: UserResponse::from(&user),
        })
    }

    fn authenticated(&self, message: &str, user: &User) -> Result<AuthResponse, AppError> {
        Ok(AuthResponse {
            message: message.to_string(),
            user: UserResponse::from(user),
            access_token: issue_token(user, self.config)?,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
