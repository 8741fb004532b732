use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::catalog::{Service, ServiceRequest, ServiceUpdateRequest};
use uuid::Uuid;

const SERVICE_COLUMNS: &str = "id, name, description, price, duration, is_active, image_url, created_at, updated_at";

#[async_trait::async_trait]
pub trait ServiceRepository {
    async fn create_service(&self, request: &ServiceRequest) -> Result<Service, AppError>;
    async fn get_service_by_id(&self, id: &Uuid) -> Result<Option<Service>, AppError>;
    /// Ordered by name.
    async fn list_services(&self, include_inactive: bool) -> Result<Vec<Service>, AppError>;
    async fn update_service(&self, id: &Uuid, request: &ServiceUpdateRequest) -> Result<Service, AppError>;
    async fn set_service_active(&self, id: &Uuid, is_active: bool) -> Result<Service, AppError>;
    async fn delete_service(&self, id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl ServiceRepository for PostgresRepository {
    async fn create_service(&self, request: &ServiceRequest) -> Result<Service, AppError> {
        let query = format!(
            r#"
            INSERT INTO services (name, description, price, duration, is_active, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SERVICE_COLUMNS}
            "#
        );

        let service = sqlx::query_as::<_, Service>(&query)
            .bind(&request.name)
            .bind(&request.description)
            .bind(request.price)
            .bind(request.duration)
            .bind(request.is_active.unwrap_or(true))
            .bind(&request.image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(service)
    }

    async fn get_service_by_id(&self, id: &Uuid) -> Result<Option<Service>, AppError> {
        let query = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1");
        let service = sqlx::query_as::<_, Service>(&query).bind(id).fetch_optional(&self.pool).await?;

        Ok(service)
    }

    async fn list_services(&self, include_inactive: bool) -> Result<Vec<Service>, AppError> {
        let query = format!(
            r#"
            SELECT {SERVICE_COLUMNS}
            FROM services
            WHERE $1 OR is_active
            ORDER BY name ASC
            "#
        );
        let services = sqlx::query_as::<_, Service>(&query).bind(include_inactive).fetch_all(&self.pool).await?;

        Ok(services)
    }

    async fn update_service(&self, id: &Uuid, request: &ServiceUpdateRequest) -> Result<Service, AppError> {
        let query = format!(
            r#"
            UPDATE services
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                price = COALESCE($3, price),
                duration = COALESCE($4, duration),
                is_active = COALESCE($5, is_active),
                image_url = COALESCE($6, image_url),
                updated_at = now()
            WHERE id = $7
            RETURNING {SERVICE_COLUMNS}
            "#
        );

        let service = sqlx::query_as::<_, Service>(&query)
            .bind(&request.name)
            .bind(&request.description)
            .bind(request.price)
            .bind(request.duration)
            .bind(request.is_active)
            .bind(&request.image_url)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(service)
    }

    async fn set_service_active(&self, id: &Uuid, is_active: bool) -> Result<Service, AppError> {
        let query = format!(
            r#"
            UPDATE services
            SET is_active = $1, updated_at = now()
            WHERE id = $2
            RETURNING {SERVICE_COLUMNS}
            "#
        );
        let service = sqlx::query_as::<_, Service>(&query).bind(is_active).bind(id).fetch_one(&self.pool).await?;

        Ok(service)
    }

    async fn delete_service(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM services WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(())
    }
}
