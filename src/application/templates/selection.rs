//! Active-template selection.
//!
//! A plain key-value mapping over the cache-tier chain: the distributed
//! tier first, the local tier when it is unreachable. Slug validity is
//! enforced by the type, so callers must parse user input first; that is
//! where unknown slugs are rejected instead of being silently dropped.

use tracing::warn;
use uuid::Uuid;

use crate::cache::{CacheKey, TierChain};
use crate::domain::templates::TemplateSlug;

pub const DEFAULT_SELECTION: TemplateSlug = TemplateSlug::Template1;

#[derive(Clone)]
pub struct SelectionService {
    tiers: TierChain,
}

impl SelectionService {
    pub fn new(tiers: TierChain) -> Self {
        Self { tiers }
    }

    /// The user's active slug; the default when nothing was ever selected
    /// or the stored value no longer parses.
    pub async fn get_selected(&self, user_id: Uuid) -> TemplateSlug {
        let key = CacheKey::selection(user_id);
        match self.tiers.get(&key).await {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(%user_id, value = %raw, "stored selection is not a known slug, using default");
                DEFAULT_SELECTION
            }),
            None => DEFAULT_SELECTION,
        }
    }

    /// Persist the active slug, overwriting any previous selection.
    pub async fn set_selected(&self, user_id: Uuid, slug: TemplateSlug) {
        let key = CacheKey::selection(user_id);
        self.tiers.set(&key, slug.as_str()).await;
    }
}
