//! Session-scoped resolved-template map.
//!
//! Holds what the current session has already resolved so repeat reads are
//! synchronous. Entries leave on save, refresh, or logout. The LRU bound
//! keeps a large tenant population from growing the map without limit;
//! once an entry is here, concurrent resolutions for the same key cannot
//! regress it to an older value because only the single-flight leader
//! writes it.

use std::num::NonZeroUsize;
use std::sync::RwLock;

use lru::LruCache;
use uuid::Uuid;

use crate::domain::templates::{ResolvedTemplate, TemplateSlug};

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::session_map";

pub const DEFAULT_SESSION_CAPACITY: usize = 512;

pub struct SessionMap {
    entries: RwLock<LruCache<(Uuid, TemplateSlug), ResolvedTemplate>>,
}

impl SessionMap {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, user_id: Uuid, slug: TemplateSlug) -> Option<ResolvedTemplate> {
        rw_write(&self.entries, SOURCE, "get")
            .get(&(user_id, slug))
            .cloned()
    }

    /// Membership check without promoting the entry.
    pub fn contains(&self, user_id: Uuid, slug: TemplateSlug) -> bool {
        rw_read(&self.entries, SOURCE, "contains").peek(&(user_id, slug)).is_some()
    }

    pub fn insert(&self, user_id: Uuid, slug: TemplateSlug, resolved: ResolvedTemplate) {
        rw_write(&self.entries, SOURCE, "insert").put((user_id, slug), resolved);
    }

    pub fn remove(&self, user_id: Uuid, slug: TemplateSlug) {
        rw_write(&self.entries, SOURCE, "remove").pop(&(user_id, slug));
    }

    pub fn remove_user(&self, user_id: Uuid) {
        let mut entries = rw_write(&self.entries, SOURCE, "remove_user");
        for slug in TemplateSlug::ALL {
            entries.pop(&(user_id, slug));
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionMap {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}
