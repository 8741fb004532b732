use crate::database::catalog::ServiceRepository;
use crate::error::app_error::AppError;
use crate::models::catalog::{Service, ServiceMessageResponse, ServiceRequest, ServiceResponse, ServiceUpdateRequest};
use crate::models::message::MessageResponse;
use uuid::Uuid;

pub struct CatalogService<'a, R> {
    repository: &'a R,
}

impl<'a, R: ServiceRepository> CatalogService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        CatalogService { repository }
    }

    pub async fn create_service(&self, request: &ServiceRequest) -> Result<ServiceMessageResponse, AppError> {
        let service = self.repository.create_service(request).await?;
        tracing::info!(service_id = %service.id, name = %service.name, "service created");

        Ok(message("Service created successfully", &service))
    }

    pub async fn list_services(&self, include_inactive: bool) -> Result<Vec<ServiceResponse>, AppError> {
        let services = self.repository.list_services(include_inactive).await?;
        Ok(services.iter().map(ServiceResponse::from).collect())
    }

    pub async fn get_service(&self, id: &Uuid) -> Result<ServiceResponse, AppError> {
        let service = self.load(id).await?;
        Ok(ServiceResponse::from(&service))
    }

    pub async fn update_service(&self, id: &Uuid, request: &ServiceUpdateRequest) -> Result<ServiceMessageResponse, AppError> {
        self.load(id).await?;
        let service = self.repository.update_service(id, request).await?;

        Ok(message("Service updated successfully", &service))
    }

    pub async fn delete_service(&self, id: &Uuid) -> Result<MessageResponse, AppError> {
        self.load(id).await?;
        self.repository.delete_service(id).await?;
        tracing::info!(service_id = %id, "service deleted");

        Ok(MessageResponse::new("Service deleted successfully"))
    }

    pub async fn toggle_active(&self, id: &Uuid) -> Result<ServiceMessageResponse, AppError> {
        let current = self.load(id).await?;
        let service = self.repository.set_service_active(id, !current.is_active).await?;
        let text = if service.is_active {
            "Service activated successfully"
        } else {
            "Service deactivated successfully"
        };

        Ok(message(text, &service))
    }

    async fn load(&self, id: &Uuid) -> Result<Service, AppError> {
        self.repository.get_service_by_id(id).await?.ok_or_else(|| AppError::not_found("Service"))
    }
}

fn message(text: &str, service: &Service) -> ServiceMessageResponse {
    ServiceMessageResponse {
        message: text.to_string(),
        service: ServiceResponse::from(service),
    }
}
