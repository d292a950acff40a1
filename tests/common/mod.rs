//! In-memory fakes shared by the integration suites.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use vetrina::application::repos::{
    CreateLinkParams, ProfileLinksRepo, ProfileRecord, RepoError, SessionRecord, SessionsRepo,
    TemplateStore, UpsertCustomizationParams,
};
use vetrina::application::sessions::AuthedUser;
use vetrina::cache::{CacheKey, CacheTier, TierError};
use vetrina::domain::links::ProfileLinkRecord;
use vetrina::domain::templates::{CustomizationRecord, TemplateSlug};

pub fn officer(user_id: Uuid) -> AuthedUser {
    AuthedUser {
        user_id,
        company_id: Some(Uuid::new_v4()),
        company_name: "Acme Lending".to_string(),
        role: "officer".to_string(),
    }
}

/// Template store over a mutex-guarded map, with switchable failures and
/// a fetch counter for deduplication assertions.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<(Uuid, TemplateSlug), CustomizationRecord>>,
    fetches: AtomicUsize,
    fetch_delay: Mutex<Option<Duration>>,
    fail_fetches: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn insert_row(&self, record: CustomizationRecord) {
        self.rows
            .lock()
            .unwrap()
            .insert((record.user_id, record.slug), record);
    }

    pub fn row(
        &self,
        user_id: Uuid,
        slug: TemplateSlug,
        custom_settings: serde_json::Value,
        is_published: bool,
    ) -> CustomizationRecord {
        CustomizationRecord {
            user_id,
            slug,
            custom_settings,
            is_customized: true,
            is_published,
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn fetch_customization(
        &self,
        user_id: Uuid,
        slug: TemplateSlug,
    ) -> Result<Option<CustomizationRecord>, RepoError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("store offline".to_string()));
        }
        Ok(self.rows.lock().unwrap().get(&(user_id, slug)).cloned())
    }

    async fn upsert_customization(
        &self,
        params: UpsertCustomizationParams,
    ) -> Result<CustomizationRecord, RepoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("store offline".to_string()));
        }
        let record = CustomizationRecord {
            user_id: params.user_id,
            slug: params.slug,
            custom_settings: params.custom_settings,
            is_customized: true,
            is_published: params.is_published,
            updated_at: OffsetDateTime::now_utc(),
        };
        self.insert_row(record.clone());
        Ok(record)
    }
}

/// Cache tier over a plain map with switchable read/write failure.
pub struct MemoryTier {
    label: &'static str,
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
}

impl MemoryTier {
    pub fn named(label: &'static str) -> Self {
        Self {
            label,
            entries: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn seed(&self, key: &CacheKey, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.render(), value.to_string());
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().unwrap().contains_key(&key.render())
    }

    pub fn raw(&self, key: &CacheKey) -> Option<String> {
        self.entries.lock().unwrap().get(&key.render()).cloned()
    }
}

#[async_trait]
impl CacheTier for MemoryTier {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, TierError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TierError::Unavailable("tier offline".to_string()));
        }
        Ok(self.entries.lock().unwrap().get(&key.render()).cloned())
    }

    async fn set(&self, key: &CacheKey, value: &str) -> Result<(), TierError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TierError::Unavailable("tier offline".to_string()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.render(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), TierError> {
        self.entries.lock().unwrap().remove(&key.render());
        Ok(())
    }
}

/// Profile links over a mutex-guarded map.
#[derive(Default)]
pub struct MemoryLinks {
    links: Mutex<HashMap<String, ProfileLinkRecord>>,
}

impl MemoryLinks {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileLinksRepo for MemoryLinks {
    async fn create_link(
        &self,
        params: CreateLinkParams,
    ) -> Result<ProfileLinkRecord, RepoError> {
        let record = ProfileLinkRecord {
            token: params.token.clone(),
            user_id: params.user_id,
            slug: params.slug,
            active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.links
            .lock()
            .unwrap()
            .insert(params.token, record.clone());
        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ProfileLinkRecord>, RepoError> {
        Ok(self.links.lock().unwrap().get(token).cloned())
    }

    async fn set_active(
        &self,
        user_id: Uuid,
        token: &str,
        active: bool,
    ) -> Result<bool, RepoError> {
        let mut links = self.links.lock().unwrap();
        match links.get_mut(token) {
            Some(record) if record.user_id == user_id => {
                record.active = active;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Sessions and profiles over mutex-guarded maps.
#[derive(Default)]
pub struct MemorySessions {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    profiles: Mutex<HashMap<Uuid, ProfileRecord>>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_session(&self, record: SessionRecord) {
        self.sessions
            .lock()
            .unwrap()
            .insert(record.prefix.clone(), record);
    }

    pub fn insert_profile(&self, record: ProfileRecord) {
        self.profiles.lock().unwrap().insert(record.user_id, record);
    }
}

#[async_trait]
impl SessionsRepo for MemorySessions {
    async fn find_session(&self, prefix: &str) -> Result<Option<SessionRecord>, RepoError> {
        Ok(self.sessions.lock().unwrap().get(prefix).cloned())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, RepoError> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }
}
