use sqlx::PgPool;

/// Repository over the shared pool handle. Built per request from Rocket's managed `PgPool`.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}
