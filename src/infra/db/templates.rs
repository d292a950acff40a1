use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, TemplateStore, UpsertCustomizationParams};
use crate::domain::templates::{CustomizationRecord, TemplateSlug};

use super::{PostgresStore, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CustomizationRow {
    user_id: Uuid,
    template_slug: String,
    custom_settings: Value,
    is_customized: bool,
    is_published: bool,
    updated_at: OffsetDateTime,
}

impl CustomizationRow {
    fn into_record(self) -> Result<CustomizationRecord, RepoError> {
        let slug = self
            .template_slug
            .parse::<TemplateSlug>()
            .map_err(RepoError::from_persistence)?;
        Ok(CustomizationRecord {
            user_id: self.user_id,
            slug,
            custom_settings: self.custom_settings,
            is_customized: self.is_customized,
            is_published: self.is_published,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl TemplateStore for PostgresStore {
    async fn fetch_customization(
        &self,
        user_id: Uuid,
        slug: TemplateSlug,
    ) -> Result<Option<CustomizationRecord>, RepoError> {
        let row = sqlx::query_as::<_, CustomizationRow>(
            r#"
            SELECT user_id, template_slug, custom_settings, is_customized, is_published, updated_at
            FROM user_templates
            WHERE user_id = $1 AND template_slug = $2
            "#,
        )
        .bind(user_id)
        .bind(slug.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(CustomizationRow::into_record).transpose()
    }

    async fn upsert_customization(
        &self,
        params: UpsertCustomizationParams,
    ) -> Result<CustomizationRecord, RepoError> {
        let row = sqlx::query_as::<_, CustomizationRow>(
            r#"
            INSERT INTO user_templates (user_id, template_slug, custom_settings, is_customized, is_published, updated_at)
            VALUES ($1, $2, $3, TRUE, $4, now())
            ON CONFLICT (user_id, template_slug) DO UPDATE SET
                custom_settings = EXCLUDED.custom_settings,
                is_customized = TRUE,
                is_published = EXCLUDED.is_published,
                updated_at = now()
            RETURNING user_id, template_slug, custom_settings, is_customized, is_published, updated_at
            "#,
        )
        .bind(params.user_id)
        .bind(params.slug.as_str())
        .bind(&params.custom_settings)
        .bind(params.is_published)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.into_record()
    }
}
