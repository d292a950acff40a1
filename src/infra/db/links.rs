use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateLinkParams, ProfileLinksRepo, RepoError};
use crate::domain::links::ProfileLinkRecord;
use crate::domain::templates::TemplateSlug;

use super::{PostgresStore, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct LinkRow {
    token: String,
    user_id: Uuid,
    template_slug: String,
    active: bool,
    created_at: OffsetDateTime,
}

impl LinkRow {
    fn into_record(self) -> Result<ProfileLinkRecord, RepoError> {
        let slug = self
            .template_slug
            .parse::<TemplateSlug>()
            .map_err(RepoError::from_persistence)?;
        Ok(ProfileLinkRecord {
            token: self.token,
            user_id: self.user_id,
            slug,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl ProfileLinksRepo for PostgresStore {
    async fn create_link(
        &self,
        params: CreateLinkParams,
    ) -> Result<ProfileLinkRecord, RepoError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO profile_links (token, user_id, template_slug, active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING token, user_id, template_slug, active, created_at
            "#,
        )
        .bind(&params.token)
        .bind(params.user_id)
        .bind(params.slug.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.into_record()
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ProfileLinkRecord>, RepoError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT token, user_id, template_slug, active, created_at
            FROM profile_links
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(LinkRow::into_record).transpose()
    }

    async fn set_active(
        &self,
        user_id: Uuid,
        token: &str,
        active: bool,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE profile_links
            SET active = $3
            WHERE token = $1 AND user_id = $2
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(active)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
