use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{ProfileRecord, RepoError, SessionRecord, SessionsRepo};

use super::{PostgresStore, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct SessionRow {
    prefix: String,
    secret_hash: String,
    user_id: Uuid,
    expires_at: Option<OffsetDateTime>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            prefix: row.prefix,
            secret_hash: row.secret_hash,
            user_id: row.user_id,
            expires_at: row.expires_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: Uuid,
    company_id: Option<Uuid>,
    company_name: String,
    role: String,
}

impl From<ProfileRow> for ProfileRecord {
    fn from(row: ProfileRow) -> Self {
        Self {
            user_id: row.user_id,
            company_id: row.company_id,
            company_name: row.company_name,
            role: row.role,
        }
    }
}

#[async_trait]
impl SessionsRepo for PostgresStore {
    async fn find_session(&self, prefix: &str) -> Result<Option<SessionRecord>, RepoError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT prefix, secret_hash, user_id, expires_at
            FROM user_sessions
            WHERE prefix = $1
            "#,
        )
        .bind(prefix)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SessionRecord::from))
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, company_id, company_name, role
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProfileRecord::from))
    }
}
