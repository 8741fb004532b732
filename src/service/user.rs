use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::message::MessageResponse;
use crate::models::user::{Role, User, UserMessageResponse, UserResponse};
use uuid::Uuid;

/// Staff and customer directory.
pub struct UserService<'a, R> {
    repository: &'a R,
}

impl<'a, R: UserRepository> UserService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        UserService { repository }
    }

    pub async fn find_all(&self, role: Option<Role>) -> Result<Vec<UserResponse>, AppError> {
        let users = self.repository.list_users(role).await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    pub async fn find_barbers(&self) -> Result<Vec<UserResponse>, AppError> {
        self.find_all(Some(Role::Barber)).await
    }

    pub async fn find_one(&self, id: &Uuid) -> Result<UserResponse, AppError> {
        let user = self.load(id).await?;
        Ok(UserResponse::from(&user))
    }

    pub async fn update_role(&self, id: &Uuid, role: Role) -> Result<UserMessageResponse, AppError> {
        self.load(id).await?;
        let user = self.repository.update_user_role(id, role).await?;
        tracing::info!(user_id = %id, %role, "user role changed");

        Ok(UserMessageResponse {
            message: format!("Role updated to {}", role),
            user: UserResponse::from(&user),
        })
    }

    pub async fn remove(&self, id: &Uuid) -> Result<MessageResponse, AppError> {
        self.load(id).await?;
        self.repository.delete_user(id).await?;
        tracing::info!(user_id = %id, "user deleted");

        Ok(MessageResponse::new("User deleted successfully"))
    }

    async fn load(&self, id: &Uuid) -> Result<User, AppError> {
        self.repository.get_user_by_id(id).await?.ok_or_else(|| AppError::not_found("User"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::appointment::AppointmentRepository;
    use crate::models::appointment::{AppointmentFilters, AppointmentStatus, NewAppointment};
    use crate::test_utils::MockRepository;
    use chrono::Utc;

    #[tokio::test]
    async fn find_all_filters_by_role() {
        let repo = MockRepository::new();
        repo.add_user(Role::Client);
        let barber = repo.add_user(Role::Barber);
        repo.add_user(Role::Admin);
        let directory = UserService::new(&repo);

        assert_eq!(directory.find_all(None).await.unwrap().len(), 3);
        let barbers = directory.find_barbers().await.unwrap();
        assert_eq!(barbers.len(), 1);
        assert_eq!(barbers[0].id, barber.id);
    }

    #[tokio::test]
    async fn find_one_unknown_is_not_found() {
        let repo = MockRepository::new();
        let error = UserService::new(&repo).find_one(&Uuid::new_v4()).await.unwrap_err();
        assert_eq!(error.to_string(), "User not found");
    }

    #[tokio::test]
    async fn update_role_promotes_user() {
        let repo = MockRepository::new();
        let user = repo.add_user(Role::Client);

        let response = UserService::new(&repo).update_role(&user.id, Role::Barber).await.unwrap();
        assert_eq!(response.message, "Role updated to BARBER");
        assert_eq!(response.user.role, Role::Barber);
    }

    #[tokio::test]
    async fn update_role_unknown_is_not_found() {
        let repo = MockRepository::new();
        let result = UserService::new(&repo).update_role(&Uuid::new_v4(), Role::Admin).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn remove_cascades_client_bookings_and_unassigns_barber() {
        let repo = MockRepository::new();
        let client = repo.add_user(Role::Client);
        let other = repo.add_user(Role::Client);
        let barber = repo.add_user(Role::Barber);
        let service = repo.add_service("Corte", true);
        for client_id in [client.id, other.id] {
            repo.create_appointment(&NewAppointment {
                date: Utc::now(),
                status: AppointmentStatus::Pending,
                notes: None,
                client_id,
                service_id: service.id,
                barber_id: Some(barber.id),
            })
            .await
            .unwrap();
        }
        let directory = UserService::new(&repo);

        assert_eq!(directory.remove(&client.id).await.unwrap().message, "User deleted successfully");
        assert_eq!(repo.appointment_count(), 1);

        directory.remove(&barber.id).await.unwrap();
        let remaining = repo.list_appointments(&AppointmentFilters::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].barber.is_none());
    }
}
