//! Public, unauthenticated profile resolution.
//!
//! Anonymous traffic never touches the per-user cache tiers: those are
//! keyed by an authenticated user the visitor does not have, and a public
//! page must reflect the store, not another session's cache. Every call
//! resolves the link token and fetches the owner's published bundle.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{CreateLinkParams, ProfileLinksRepo, TemplateStore};
use crate::domain::links::ProfileLinkRecord;
use crate::domain::templates::{ResolvedTemplate, TemplateSlug, UserTemplateContext};

#[derive(Clone)]
pub struct PublicProfileService {
    links: Arc<dyn ProfileLinksRepo>,
    store: Arc<dyn TemplateStore>,
}

impl PublicProfileService {
    pub fn new(links: Arc<dyn ProfileLinksRepo>, store: Arc<dyn TemplateStore>) -> Self {
        Self { links, store }
    }

    /// Resolve a published bundle by link token.
    ///
    /// Not found covers an unknown token, a deactivated link, and an
    /// unpublished bundle alike: a visitor learns nothing about which it
    /// was, and the owner may reactivate the link at any time.
    pub async fn resolve_public(&self, token: &str) -> Result<ResolvedTemplate, AppError> {
        let link = self
            .links
            .find_by_token(token)
            .await?
            .ok_or(AppError::NotFound)?;
        if !link.active {
            return Err(AppError::NotFound);
        }

        let record = self
            .store
            .fetch_customization(link.user_id, link.slug)
            .await?
            .filter(|record| record.is_published)
            .ok_or(AppError::NotFound)?;

        let user_info = UserTemplateContext {
            user_id: link.user_id,
            company_id: None,
            company_name: String::new(),
            user_role: String::new(),
            has_custom_settings: record.is_customized,
        };
        Ok(ResolvedTemplate::compose(link.slug, user_info, Some(&record)))
    }

    pub async fn create_link(
        &self,
        user_id: Uuid,
        slug: TemplateSlug,
    ) -> Result<ProfileLinkRecord, AppError> {
        let params = CreateLinkParams {
            token: ProfileLinkRecord::generate_token(),
            user_id,
            slug,
        };
        Ok(self.links.create_link(params).await?)
    }

    /// Activate or deactivate a link the caller owns.
    pub async fn set_link_active(
        &self,
        user_id: Uuid,
        token: &str,
        active: bool,
    ) -> Result<(), AppError> {
        if self.links.set_active(user_id, token, active).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}
