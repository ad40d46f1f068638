//! Persistence gateway for accepted applications.
//!
//! `AppState` carries an `Arc<dyn ApplicationStore>`; production uses
//! `PgApplicationStore`, handler tests swap in the in-memory store.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::application::models::{ApplicationRow, CleanedApplication};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Inserts one cleaned application and returns the identifier assigned by the store.
    async fn insert(&self, application: &CleanedApplication) -> Result<i64, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<ApplicationRow>, StoreError>;
}

pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, application: &CleanedApplication) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO requests
                (first_name, last_name, patronymic, email, phone,
                 marital_status, about_request, birthdate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&application.first_name)
        .bind(&application.last_name)
        .bind(&application.patronymic)
        .bind(&application.email)
        .bind(&application.phone)
        .bind(&application.marital_status)
        .bind(&application.about)
        .bind(application.birth_date)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted application {id}");
        Ok(id)
    }

    async fn find(&self, id: i64) -> Result<Option<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, first_name, last_name, patronymic, email, phone,
                   marital_status, about_request, birthdate, created_at
            FROM requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
