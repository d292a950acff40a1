//! Template resolution over the cache tiers and the store.
//!
//! Resolution order, first answer wins: the customizer draft, the session
//! map, the cache-tier chain, and finally a single-flighted store fetch
//! that writes back through the tiers. A user with no stored customization
//! always receives the default bundle; only a store fault is an error.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use metrics::counter;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{RepoError, TemplateStore, UpsertCustomizationParams};
use crate::application::sessions::AuthedUser;
use crate::cache::{CacheKey, SessionMap, TierChain};
use crate::domain::templates::{ResolvedTemplate, TemplateSlug, UserTemplateContext};

use super::customizer::CustomizerMode;
use super::single_flight::{FlightError, SingleFlight};

type FlightKey = (Uuid, TemplateSlug);

pub struct TemplateService {
    store: Arc<dyn TemplateStore>,
    tiers: TierChain,
    sessions: SessionMap,
    flights: SingleFlight<FlightKey, ResolvedTemplate>,
}

impl TemplateService {
    pub fn new(
        store: Arc<dyn TemplateStore>,
        tiers: TierChain,
        session_capacity: usize,
        flight_wait_cap: Duration,
    ) -> Self {
        Self {
            store,
            tiers,
            sessions: SessionMap::new(session_capacity),
            flights: SingleFlight::new(flight_wait_cap),
        }
    }

    /// Resolve one template for an authenticated user.
    pub async fn resolve(
        &self,
        user: &AuthedUser,
        slug: TemplateSlug,
        mode: &CustomizerMode,
    ) -> Result<ResolvedTemplate, AppError> {
        if let Some(preview) = mode.preview(user, slug) {
            debug!(user_id = %user.user_id, slug = %slug, "serving customizer draft");
            return Ok(preview);
        }

        if let Some(resolved) = self.sessions.get(user.user_id, slug) {
            return Ok(resolved);
        }

        let key = CacheKey::template(user.user_id, slug);
        if let Some(cached) = self.read_tiers(&key).await {
            self.sessions.insert(user.user_id, slug, cached.clone());
            return Ok(cached);
        }

        match self.fetch_via_flight(user, slug).await? {
            Some(resolved) => {
                self.sessions.insert(user.user_id, slug, resolved.clone());
                Ok(resolved)
            }
            // Waited out someone else's fetch. Serve whatever that fetch
            // may have left in the session map, else the default bundle,
            // uncached so the next call tries again.
            None => match self.sessions.get(user.user_id, slug) {
                Some(resolved) => Ok(resolved),
                None => Ok(ResolvedTemplate::compose(slug, self.user_context(user), None)),
            },
        }
    }

    /// Non-blocking read: the customizer draft or the session map only.
    pub fn get_sync(
        &self,
        user: &AuthedUser,
        slug: TemplateSlug,
        mode: &CustomizerMode,
    ) -> Option<ResolvedTemplate> {
        if let Some(preview) = mode.preview(user, slug) {
            return Some(preview);
        }
        self.sessions.get(user.user_id, slug)
    }

    pub fn has_template(&self, user_id: Uuid, slug: TemplateSlug) -> bool {
        self.sessions.contains(user_id, slug)
    }

    pub fn template_count(&self, user_id: Uuid) -> usize {
        TemplateSlug::ALL
            .iter()
            .filter(|slug| self.sessions.contains(user_id, **slug))
            .count()
    }

    /// Drop every cached copy for `(user, slug)` and fetch fresh.
    pub async fn refresh(
        &self,
        user: &AuthedUser,
        slug: TemplateSlug,
    ) -> Result<ResolvedTemplate, AppError> {
        let key = CacheKey::template(user.user_id, slug);
        self.tiers.delete(&key).await;
        self.sessions.remove(user.user_id, slug);
        self.resolve(user, slug, &CustomizerMode::Browsing).await
    }

    /// Persist custom settings, then invalidate and re-resolve.
    ///
    /// The cache is only touched after the store write succeeds; a failed
    /// save leaves every cached copy exactly as it was.
    pub async fn save(
        &self,
        user: &AuthedUser,
        slug: TemplateSlug,
        custom_settings: Value,
        is_published: bool,
    ) -> Result<ResolvedTemplate, AppError> {
        self.store
            .upsert_customization(UpsertCustomizationParams {
                user_id: user.user_id,
                slug,
                custom_settings,
                is_published,
            })
            .await
            .map_err(|err| AppError::persistence(err.to_string()))?;

        self.refresh(user, slug).await
    }

    /// Resolve every known slug for a session bootstrap. A slug that fails
    /// to resolve is skipped rather than failing the whole bootstrap.
    pub async fn initialize(&self, user: &AuthedUser) -> Vec<(TemplateSlug, ResolvedTemplate)> {
        let resolutions = join_all(TemplateSlug::ALL.iter().map(|slug| async move {
            (*slug, self.resolve(user, *slug, &CustomizerMode::Browsing).await)
        }))
        .await;

        let mut resolved = Vec::with_capacity(resolutions.len());
        for (slug, result) in resolutions {
            match result {
                Ok(bundle) => resolved.push((slug, bundle)),
                Err(error) => {
                    warn!(user_id = %user.user_id, slug = %slug, error = %error, "skipping slug during bootstrap");
                }
            }
        }
        resolved
    }

    /// Forget everything cached for this user. Logout path.
    pub async fn clear_user(&self, user_id: Uuid) {
        self.sessions.remove_user(user_id);
        for slug in TemplateSlug::ALL {
            self.tiers.delete(&CacheKey::template(user_id, slug)).await;
        }
    }

    async fn read_tiers(&self, key: &CacheKey) -> Option<ResolvedTemplate> {
        let raw = self.tiers.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(resolved) => Some(resolved),
            Err(error) => {
                warn!(key = %key.render(), error = %error, "dropping undecodable cache entry");
                self.tiers.delete(key).await;
                None
            }
        }
    }

    async fn fetch_via_flight(
        &self,
        user: &AuthedUser,
        slug: TemplateSlug,
    ) -> Result<Option<ResolvedTemplate>, AppError> {
        let store = Arc::clone(&self.store);
        let tiers = self.tiers.clone();
        let user_info = self.user_context(user);
        let user_id = user.user_id;

        self.flights
            .run((user_id, slug), move || async move {
                counter!("vetrina_store_fetch_total").increment(1);
                let record = store
                    .fetch_customization(user_id, slug)
                    .await
                    .map_err(|err| FlightError::new(err.to_string()))?;
                let resolved = ResolvedTemplate::compose(slug, user_info, record.as_ref());
                write_through(&tiers, user_id, slug, &resolved).await;
                Ok(resolved)
            })
            .await
            .map_err(|err| AppError::from(RepoError::from_persistence(err)))
    }

    fn user_context(&self, user: &AuthedUser) -> UserTemplateContext {
        UserTemplateContext {
            user_id: user.user_id,
            company_id: user.company_id,
            company_name: user.company_name.clone(),
            user_role: user.role.clone(),
            // Raised during composition when a customized row exists.
            has_custom_settings: false,
        }
    }
}

async fn write_through(
    tiers: &TierChain,
    user_id: Uuid,
    slug: TemplateSlug,
    resolved: &ResolvedTemplate,
) {
    let key = CacheKey::template(user_id, slug);
    match serde_json::to_string(resolved) {
        Ok(serialized) => tiers.set(&key, &serialized).await,
        Err(error) => {
            warn!(key = %key.render(), error = %error, "skipping cache write for unserializable bundle");
        }
    }
}
