use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::appointment::{Appointment, AppointmentChanges, AppointmentDetails, AppointmentFilters, AppointmentStatus, NewAppointment};
use crate::models::catalog::Service;
use crate::models::user::UserProfile;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// Projection shared by every read: the appointment plus its service, client and (optional) barber.
const DETAILS_SELECT: &str = r#"
    SELECT a.id, a.date, a.status, a.notes, a.client_id, a.service_id, a.barber_id, a.created_at, a.updated_at,
           s.name AS service_name, s.description AS service_description, s.price AS service_price,
           s.duration AS service_duration, s.is_active AS service_is_active, s.image_url AS service_image_url,
           s.created_at AS service_created_at, s.updated_at AS service_updated_at,
           c.name AS client_name, c.email AS client_email, c.phone AS client_phone,
           b.name AS barber_name, b.email AS barber_email, b.phone AS barber_phone
"#;

const DETAILS_JOINS: &str = r#"
    JOIN services s ON s.id = a.service_id
    JOIN users c ON c.id = a.client_id
    LEFT JOIN users b ON b.id = a.barber_id
"#;

#[derive(sqlx::FromRow)]
struct AppointmentRow {
    id: Uuid,
    date: DateTime<Utc>,
    status: AppointmentStatus,
    notes: Option<String>,
    client_id: Uuid,
    service_id: Uuid,
    barber_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    service_name: String,
    service_description: Option<String>,
    service_price: f64,
    service_duration: i32,
    service_is_active: bool,
    service_image_url: Option<String>,
    service_created_at: DateTime<Utc>,
    service_updated_at: DateTime<Utc>,
    client_name: String,
    client_email: String,
    client_phone: Option<String>,
    barber_name: Option<String>,
    barber_email: Option<String>,
    barber_phone: Option<String>,
}

impl From<AppointmentRow> for AppointmentDetails {
    fn from(row: AppointmentRow) -> Self {
        let barber = match (row.barber_id, row.barber_name, row.barber_email) {
            (Some(id), Some(name), Some(email)) => Some(UserProfile {
                id,
                name,
                email,
                phone: row.barber_phone,
            }),
            _ => None,
        };

        Self {
            appointment: Appointment {
                id: row.id,
                date: row.date,
                status: row.status,
                notes: row.notes,
                client_id: row.client_id,
                service_id: row.service_id,
                barber_id: row.barber_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            service: Service {
                id: row.service_id,
                name: row.service_name,
                description: row.service_description,
                price: row.service_price,
                duration: row.service_duration,
                is_active: row.service_is_active,
                image_url: row.service_image_url,
                created_at: row.service_created_at,
                updated_at: row.service_updated_at,
            },
            client: UserProfile {
                id: row.client_id,
                name: row.client_name,
                email: row.client_email,
                phone: row.client_phone,
            },
            barber,
        }
    }
}

#[async_trait::async_trait]
pub trait AppointmentRepository {
    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<AppointmentDetails, AppError>;
    async fn get_appointment_by_id(&self, id: &Uuid) -> Result<Option<AppointmentDetails>, AppError>;
    /// Filters are combined with AND; results are ordered by date, earliest first.
    async fn list_appointments(&self, filters: &AppointmentFilters) -> Result<Vec<AppointmentDetails>, AppError>;
    /// `None` when no row matched: the id is unknown or the stored status differs from `expected_status`.
    async fn update_appointment(&self, id: &Uuid, changes: &AppointmentChanges) -> Result<Option<AppointmentDetails>, AppError>;
    async fn delete_appointment(&self, id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl AppointmentRepository for PostgresRepository {
    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<AppointmentDetails, AppError> {
        let query = format!(
            r#"
            WITH a AS (
                INSERT INTO appointments (date, status, notes, client_id, service_id, barber_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            {DETAILS_SELECT}
            FROM a
            {DETAILS_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, AppointmentRow>(&query)
            .bind(appointment.date)
            .bind(appointment.status)
            .bind(&appointment.notes)
            .bind(appointment.client_id)
            .bind(appointment.service_id)
            .bind(appointment.barber_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn get_appointment_by_id(&self, id: &Uuid) -> Result<Option<AppointmentDetails>, AppError> {
        let query = format!("{DETAILS_SELECT} FROM appointments a {DETAILS_JOINS} WHERE a.id = $1");
        let row = sqlx::query_as::<_, AppointmentRow>(&query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(AppointmentDetails::from))
    }

    async fn list_appointments(&self, filters: &AppointmentFilters) -> Result<Vec<AppointmentDetails>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!("{DETAILS_SELECT} FROM appointments a {DETAILS_JOINS} WHERE TRUE"));

        if let Some(status) = filters.status {
            builder.push(" AND a.status = ").push_bind(status);
        }
        if let Some(client_id) = filters.client_id {
            builder.push(" AND a.client_id = ").push_bind(client_id);
        }
        if let Some(barber_id) = filters.barber_id {
            builder.push(" AND a.barber_id = ").push_bind(barber_id);
        }
        builder.push(" ORDER BY a.date ASC");

        let rows = builder.build_query_as::<AppointmentRow>().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(AppointmentDetails::from).collect())
    }

    async fn update_appointment(&self, id: &Uuid, changes: &AppointmentChanges) -> Result<Option<AppointmentDetails>, AppError> {
        let query = format!(
            r#"
            WITH a AS (
                UPDATE appointments
                SET date = COALESCE($1, date),
                    status = COALESCE($2, status),
                    barber_id = COALESCE($3, barber_id),
                    notes = COALESCE($4, notes),
                    updated_at = now()
                WHERE id = $5
                  AND ($6::text IS NULL OR status = $6)
                RETURNING *
            )
            {DETAILS_SELECT}
            FROM a
            {DETAILS_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, AppointmentRow>(&query)
            .bind(changes.date)
            .bind(changes.status)
            .bind(changes.barber_id)
            .bind(&changes.notes)
            .bind(id)
            .bind(changes.expected_status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AppointmentDetails::from))
    }

    async fn delete_appointment(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM appointments WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::catalog::ServiceRepository;
    use crate::database::user::UserRepository;
    use crate::models::user::{Role, User};
    use crate::test_utils::{database_repository, new_user, service_request};

    fn row(barber_id: Option<Uuid>, barber_name: Option<&str>) -> AppointmentRow {
        let now = Utc::now();
        AppointmentRow {
            id: Uuid::new_v4(),
            date: now,
            status: AppointmentStatus::Pending,
            notes: None,
            client_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            barber_id,
            created_at: now,
            updated_at: now,
            service_name: "Corte Clásico".to_string(),
            service_description: None,
            service_price: 15.0,
            service_duration: 30,
            service_is_active: true,
            service_image_url: None,
            service_created_at: now,
            service_updated_at: now,
            client_name: "Ana".to_string(),
            client_email: "ana@x.com".to_string(),
            client_phone: None,
            barber_name: barber_name.map(str::to_string),
            barber_email: barber_name.map(|name| format!("{}@x.com", name.to_lowercase())),
            barber_phone: None,
        }
    }

    #[test]
    fn row_without_barber_has_no_barber_profile() {
        let details = AppointmentDetails::from(row(None, None));
        assert!(details.barber.is_none());
        assert_eq!(details.service.id, details.appointment.service_id);
        assert_eq!(details.client.id, details.appointment.client_id);
    }

    #[test]
    fn row_with_barber_builds_profile() {
        let barber_id = Uuid::new_v4();
        let details = AppointmentDetails::from(row(Some(barber_id), Some("Bruno")));
        let barber = details.barber.unwrap();
        assert_eq!(barber.id, barber_id);
        assert_eq!(barber.email, "bruno@x.com");
    }

    struct Seeded {
        repo: PostgresRepository,
        client: User,
        barber: User,
        service: Service,
    }

    async fn seeded() -> Seeded {
        let repo = database_repository().await;
        let client = repo.create_user(&new_user(Role::Client)).await.unwrap();
        let barber = repo.create_user(&new_user(Role::Barber)).await.unwrap();
        let service = repo
            .create_service(&service_request(&format!("Corte {}", Uuid::new_v4().simple())))
            .await
            .unwrap();
        Seeded {
            repo,
            client,
            barber,
            service,
        }
    }

    fn booking(seed: &Seeded, date: &str, barber_id: Option<Uuid>) -> NewAppointment {
        NewAppointment {
            date: date.parse().unwrap(),
            status: AppointmentStatus::Pending,
            notes: Some("Sin prisa".to_string()),
            client_id: seed.client.id,
            service_id: seed.service.id,
            barber_id,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_returns_joined_projection() {
        let seed = seeded().await;
        let created = seed
            .repo
            .create_appointment(&booking(&seed, "2026-10-20T10:00:00Z", Some(seed.barber.id)))
            .await
            .unwrap();

        assert_eq!(created.service.id, seed.service.id);
        assert_eq!(created.client.email, seed.client.email);
        assert_eq!(created.barber.as_ref().map(|b| b.id), Some(seed.barber.id));

        let fetched = seed.repo.get_appointment_by_id(&created.appointment.id).await.unwrap().unwrap();
        assert_eq!(fetched.appointment, created.appointment);

        let unknown_service = NewAppointment {
            service_id: Uuid::new_v4(),
            ..booking(&seed, "2026-10-20T10:00:00Z", None)
        };
        assert!(matches!(seed.repo.create_appointment(&unknown_service).await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn list_combines_filters_and_orders_by_date() {
        let seed = seeded().await;
        let later = seed.repo.create_appointment(&booking(&seed, "2026-10-22T09:00:00Z", Some(seed.barber.id))).await.unwrap();
        let earlier = seed.repo.create_appointment(&booking(&seed, "2026-10-20T09:00:00Z", None)).await.unwrap();

        let by_client = AppointmentFilters {
            client_id: Some(seed.client.id),
            ..Default::default()
        };
        let ids: Vec<Uuid> = seed.repo.list_appointments(&by_client).await.unwrap().iter().map(|d| d.appointment.id).collect();
        assert_eq!(ids, vec![earlier.appointment.id, later.appointment.id]);

        let by_client_and_barber = AppointmentFilters {
            barber_id: Some(seed.barber.id),
            ..by_client
        };
        let matched = seed.repo.list_appointments(&by_client_and_barber).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].appointment.id, later.appointment.id);

        let cancelled = AppointmentFilters {
            status: Some(AppointmentStatus::Cancelled),
            ..by_client
        };
        assert!(seed.repo.list_appointments(&cancelled).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_keeps_absent_fields_and_checks_expected_status() {
        let seed = seeded().await;
        let created = seed.repo.create_appointment(&booking(&seed, "2026-10-20T10:00:00Z", Some(seed.barber.id))).await.unwrap();
        let id = created.appointment.id;

        let notes_only = AppointmentChanges {
            notes: Some("Con barba".to_string()),
            ..Default::default()
        };
        let updated = seed.repo.update_appointment(&id, &notes_only).await.unwrap().unwrap();
        assert_eq!(updated.appointment.notes.as_deref(), Some("Con barba"));
        assert_eq!(updated.appointment.date, created.appointment.date);
        assert_eq!(updated.appointment.barber_id, Some(seed.barber.id));

        let stale = AppointmentChanges {
            status: Some(AppointmentStatus::Cancelled),
            expected_status: Some(AppointmentStatus::Confirmed),
            ..Default::default()
        };
        assert!(seed.repo.update_appointment(&id, &stale).await.unwrap().is_none());
        let stored = seed.repo.get_appointment_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.appointment.status, AppointmentStatus::Pending);

        let current = AppointmentChanges {
            expected_status: Some(AppointmentStatus::Pending),
            ..stale
        };
        let cancelled = seed.repo.update_appointment(&id, &current).await.unwrap().unwrap();
        assert_eq!(cancelled.appointment.status, AppointmentStatus::Cancelled);

        assert!(seed.repo.update_appointment(&Uuid::new_v4(), &notes_only).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn deletes_cascade_or_unassign() {
        let seed = seeded().await;
        let assigned = seed.repo.create_appointment(&booking(&seed, "2026-10-20T10:00:00Z", Some(seed.barber.id))).await.unwrap();

        seed.repo.delete_user(&seed.barber.id).await.unwrap();
        let unassigned = seed.repo.get_appointment_by_id(&assigned.appointment.id).await.unwrap().unwrap();
        assert!(unassigned.appointment.barber_id.is_none());
        assert!(unassigned.barber.is_none());

        seed.repo.delete_service(&seed.service.id).await.unwrap();
        assert!(seed.repo.get_appointment_by_id(&assigned.appointment.id).await.unwrap().is_none());

        let other = seed
            .repo
            .create_service(&service_request(&format!("Barba {}", Uuid::new_v4().simple())))
            .await
            .unwrap();
        let booked = seed
            .repo
            .create_appointment(&NewAppointment {
                service_id: other.id,
                ..booking(&seed, "2026-10-21T10:00:00Z", None)
            })
            .await
            .unwrap();
        seed.repo.delete_user(&seed.client.id).await.unwrap();
        assert!(seed.repo.get_appointment_by_id(&booked.appointment.id).await.unwrap().is_none());

        seed.repo.delete_appointment(&Uuid::new_v4()).await.unwrap();
    }
}
