//! Postgres persistence adapters.

mod links;
mod sessions;
mod templates;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::application::repos::RepoError;
use crate::infra::error::InfraError;

/// Shared Postgres handle implementing every repository trait.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, InfraError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|err| InfraError::database(err.to_string()))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), InfraError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|err| InfraError::database(err.to_string()))
    }
}

pub(crate) fn map_sqlx_error(error: sqlx::Error) -> RepoError {
    match error {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        other => RepoError::from_persistence(other),
    }
}
