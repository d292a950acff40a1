//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::links::ProfileLinkRecord;
use crate::domain::templates::{CustomizationRecord, TemplateSlug};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UpsertCustomizationParams {
    pub user_id: Uuid,
    pub slug: TemplateSlug,
    pub custom_settings: Value,
    pub is_published: bool,
}

/// The template store: the single source of truth for customizations.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Load the stored customization row, if any.
    async fn fetch_customization(
        &self,
        user_id: Uuid,
        slug: TemplateSlug,
    ) -> Result<Option<CustomizationRecord>, RepoError>;

    /// Create or replace the customization row, marking it customized.
    async fn upsert_customization(
        &self,
        params: UpsertCustomizationParams,
    ) -> Result<CustomizationRecord, RepoError>;
}

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub prefix: String,
    pub secret_hash: String,
    pub user_id: Uuid,
    pub expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub company_name: String,
    pub role: String,
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn find_session(&self, prefix: &str) -> Result<Option<SessionRecord>, RepoError>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateLinkParams {
    pub token: String,
    pub user_id: Uuid,
    pub slug: TemplateSlug,
}

#[async_trait]
pub trait ProfileLinksRepo: Send + Sync {
    async fn create_link(&self, params: CreateLinkParams)
    -> Result<ProfileLinkRecord, RepoError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<ProfileLinkRecord>, RepoError>;

    /// Returns `false` when the token does not exist or is owned by a
    /// different user.
    async fn set_active(
        &self,
        user_id: Uuid,
        token: &str,
        active: bool,
    ) -> Result<bool, RepoError>;
}
