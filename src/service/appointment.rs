//! Booking and status management for appointments.

use crate::database::appointment::AppointmentRepository;
use crate::database::catalog::ServiceRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::appointment::{
    AppointmentChanges, AppointmentDetails, AppointmentFilters, AppointmentMessageResponse, AppointmentResponse, AppointmentStatus,
    CreateAppointmentRequest, NewAppointment, UpdateAppointmentRequest,
};
use crate::models::message::MessageResponse;
use crate::models::user::{Actor, Role};
use crate::service::lifecycle::{StatusAction, next_status, transition_to};
use crate::util::parse_appointment_date;
use uuid::Uuid;

pub struct AppointmentService<'a, R> {
    repository: &'a R,
}

impl<'a, R> AppointmentService<'a, R>
where
    R: AppointmentRepository + ServiceRepository + UserRepository,
{
    pub fn new(repository: &'a R) -> Self {
        AppointmentService { repository }
    }

    /// Books a PENDING appointment for `client_id`. The service must exist and be
    /// active, and a requested barber must hold the BARBER role.
    pub async fn create(&self, client_id: &Uuid, request: &CreateAppointmentRequest) -> Result<AppointmentMessageResponse, AppError> {
        let service = self
            .repository
            .get_service_by_id(&request.service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;
        if !service.is_active {
            return Err(AppError::BadRequest("Service is unavailable".to_string()));
        }

        if let Some(barber_id) = &request.barber_id {
            self.repository
                .get_user_with_role(barber_id, Role::Barber)
                .await?
                .ok_or_else(|| AppError::not_found("Barber"))?;
        }

        let new_appointment = NewAppointment {
            date: parse_appointment_date(&request.date)?,
            status: AppointmentStatus::Pending,
            notes: request.notes.clone(),
            client_id: *client_id,
            service_id: service.id,
            barber_id: request.barber_id,
        };
        let details = self.repository.create_appointment(&new_appointment).await?;
        tracing::info!(
            appointment_id = %details.appointment.id,
            client_id = %client_id,
            service_id = %service.id,
            "appointment booked"
        );

        Ok(message("Appointment created successfully".to_string(), &details))
    }

    pub async fn find_all(&self, filters: &AppointmentFilters) -> Result<Vec<AppointmentResponse>, AppError> {
        let appointments = self.repository.list_appointments(filters).await?;
        Ok(appointments.iter().map(AppointmentResponse::from).collect())
    }

    pub async fn find_one(&self, id: &Uuid) -> Result<AppointmentResponse, AppError> {
        let details = self.load(id).await?;
        Ok(AppointmentResponse::from(&details))
    }

    pub async fn find_by_client(&self, client_id: &Uuid) -> Result<Vec<AppointmentResponse>, AppError> {
        self.find_all(&AppointmentFilters {
            client_id: Some(*client_id),
            ..Default::default()
        })
        .await
    }

    pub async fn find_by_barber(&self, barber_id: &Uuid) -> Result<Vec<AppointmentResponse>, AppError> {
        self.find_all(&AppointmentFilters {
            barber_id: Some(*barber_id),
            ..Default::default()
        })
        .await
    }

    /// Barbers see the appointments assigned to them; everyone else sees the ones they booked.
    pub async fn find_for_actor(&self, actor: &Actor) -> Result<Vec<AppointmentResponse>, AppError> {
        match actor.role {
            Role::Barber => self.find_by_barber(&actor.id).await,
            Role::Client | Role::Admin => self.find_by_client(&actor.id).await,
        }
    }

    pub async fn update(&self, id: &Uuid, request: &UpdateAppointmentRequest, actor: &Actor) -> Result<AppointmentMessageResponse, AppError> {
        let current = self.load(id).await?;
        let from = current.appointment.status;

        let status = match request.status {
            Some(target) => Some(transition_to(from, target, actor.role)?),
            None => None,
        };
        let changes = AppointmentChanges {
            date: request.date.as_deref().map(parse_appointment_date).transpose()?,
            status,
            barber_id: request.barber_id,
            notes: request.notes.clone(),
            expected_status: status.map(|_| from),
        };

        let Some(details) = self.repository.update_appointment(id, &changes).await? else {
            return Err(self.lost_update(id, request.status.and_then(StatusAction::for_target), actor).await);
        };

        Ok(message("Appointment updated successfully".to_string(), &details))
    }

    pub async fn update_status(&self, id: &Uuid, action: StatusAction, actor: &Actor) -> Result<AppointmentMessageResponse, AppError> {
        let current = self.load(id).await?;
        let from = current.appointment.status;
        let status = next_status(from, action, actor.role)?;

        let changes = AppointmentChanges {
            status: Some(status),
            expected_status: Some(from),
            ..Default::default()
        };
        let Some(details) = self.repository.update_appointment(id, &changes).await? else {
            return Err(self.lost_update(id, Some(action), actor).await);
        };
        tracing::info!(appointment_id = %id, actor_id = %actor.id, %from, to = %status, "appointment status changed");

        Ok(message(format!("Appointment status updated to {}", status), &details))
    }

    pub async fn confirm(&self, id: &Uuid, actor: &Actor) -> Result<AppointmentMessageResponse, AppError> {
        self.update_status(id, StatusAction::Confirm, actor).await
    }

    pub async fn cancel(&self, id: &Uuid, actor: &Actor) -> Result<AppointmentMessageResponse, AppError> {
        self.update_status(id, StatusAction::Cancel, actor).await
    }

    pub async fn complete(&self, id: &Uuid, actor: &Actor) -> Result<AppointmentMessageResponse, AppError> {
        self.update_status(id, StatusAction::Complete, actor).await
    }

    pub async fn remove(&self, id: &Uuid) -> Result<MessageResponse, AppError> {
        self.load(id).await?;
        self.repository.delete_appointment(id).await?;

        Ok(MessageResponse::new("Appointment deleted successfully"))
    }

    /// The conditional write matched no row: the appointment was deleted or its
    /// status moved on after it was read. The action is re-judged against the
    /// stored status so terminal states keep rejecting it.
    async fn lost_update(&self, id: &Uuid, action: Option<StatusAction>, actor: &Actor) -> AppError {
        let latest = match self.load(id).await {
            Ok(latest) => latest,
            Err(err) => return err,
        };
        let from = latest.appointment.status;
        tracing::warn!(appointment_id = %id, actor_id = %actor.id, %from, "appointment changed concurrently");

        match action.map(|action| next_status(from, action, actor.role)) {
            Some(Err(err)) => err.into(),
            _ => AppError::Conflict("Appointment was modified by another request".to_string()),
        }
    }

    async fn load(&self, id: &Uuid) -> Result<AppointmentDetails, AppError> {
        self.repository
            .get_appointment_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))
    }
}

fn message(text: String, details: &AppointmentDetails) -> AppointmentMessageResponse {
    AppointmentMessageResponse {
        message: text,
        appointment: AppointmentResponse::from(details),
    }
}
