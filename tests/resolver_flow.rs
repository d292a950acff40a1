//! End-to-end resolver behavior over in-memory fakes: defaults, caching,
//! save round-trips, and customizer precedence.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use vetrina::application::templates::{CustomizerMode, CustomizerRegistry, TemplateService};
use vetrina::cache::TierChain;
use vetrina::domain::templates::{TemplateBundle, TemplateSlug};

use common::{MemoryStore, MemoryTier, officer};

const WAIT_CAP: Duration = Duration::from_secs(15);

fn service(store: Arc<MemoryStore>, tier: Arc<MemoryTier>) -> TemplateService {
    TemplateService::new(store, TierChain::new(vec![tier]), 64, WAIT_CAP)
}

#[tokio::test]
async fn missing_store_row_resolves_to_a_full_default_bundle() {
    let store = Arc::new(MemoryStore::new());
    let tier = Arc::new(MemoryTier::named("memory"));
    let service = service(store.clone(), tier);
    let user = officer(Uuid::new_v4());

    let resolved = service
        .resolve(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .await
        .expect("missing customization is not an error");

    for block in [
        &resolved.template.colors,
        &resolved.template.typography,
        &resolved.template.content,
        &resolved.template.layout,
        &resolved.template.advanced,
        &resolved.template.header_modifications,
        &resolved.template.body_modifications,
        &resolved.template.right_sidebar_modifications,
    ] {
        assert!(block.is_object());
    }
    assert!(!resolved.metadata.is_customized);
    assert!(!resolved.user_info.has_custom_settings);
    assert_eq!(resolved.user_info.company_name, "Acme Lending");
    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn repeat_resolves_are_identical_and_served_from_the_session_map() {
    let store = Arc::new(MemoryStore::new());
    let tier = Arc::new(MemoryTier::named("memory"));
    let service = service(store.clone(), tier);
    let user = officer(Uuid::new_v4());

    let first = service
        .resolve(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .await
        .unwrap();
    let second = service
        .resolve(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.fetch_count(), 1);
    assert!(service.has_template(user.user_id, TemplateSlug::Template1));
}

#[tokio::test]
async fn resolve_populates_the_cache_tier_for_other_instances() {
    let store = Arc::new(MemoryStore::new());
    let tier = Arc::new(MemoryTier::named("memory"));
    let service = service(store.clone(), tier.clone());
    let user = officer(Uuid::new_v4());

    service
        .resolve(&user, TemplateSlug::Template2, &CustomizerMode::Browsing)
        .await
        .unwrap();

    let key = vetrina::cache::CacheKey::template(user.user_id, TemplateSlug::Template2);
    let cached = tier.raw(&key).expect("write-through populated the tier");
    assert!(cached.contains("\"template\""));

    // A second service sharing only the tier resolves without a store
    // fetch of its own.
    let sibling = TemplateService::new(
        store.clone(),
        TierChain::new(vec![tier]),
        64,
        WAIT_CAP,
    );
    sibling
        .resolve(&user, TemplateSlug::Template2, &CustomizerMode::Browsing)
        .await
        .unwrap();
    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn save_round_trip_reflects_settings_and_publish_flag() {
    let store = Arc::new(MemoryStore::new());
    let tier = Arc::new(MemoryTier::named("memory"));
    let service = service(store, tier);
    let user = officer(Uuid::new_v4());

    let settings = json!({ "colors": { "primary": "#ff0000" } });
    let saved = service
        .save(&user, TemplateSlug::Template2, settings.clone(), true)
        .await
        .expect("save succeeds");

    assert_eq!(saved.template.colors, settings["colors"]);
    assert!(saved.metadata.is_published);
    assert!(saved.metadata.is_customized);
    assert!(saved.user_info.has_custom_settings);

    let resolved = service
        .resolve(&user, TemplateSlug::Template2, &CustomizerMode::Browsing)
        .await
        .unwrap();
    assert_eq!(resolved, saved);
}

#[tokio::test]
async fn failed_save_surfaces_and_leaves_cached_data_untouched() {
    let store = Arc::new(MemoryStore::new());
    let tier = Arc::new(MemoryTier::named("memory"));
    let service = service(store.clone(), tier);
    let user = officer(Uuid::new_v4());

    let before = service
        .resolve(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .await
        .unwrap();
    let fetches_before = store.fetch_count();

    store.set_fail_writes(true);
    let result = service
        .save(
            &user,
            TemplateSlug::Template1,
            json!({ "colors": { "primary": "#000000" } }),
            false,
        )
        .await;
    assert!(result.is_err());

    // No invalidation happened: the next read is served from the session
    // map with the pre-save contents.
    let after = service
        .resolve(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .await
        .unwrap();
    assert_eq!(before, after);
    assert_eq!(store.fetch_count(), fetches_before);
}

#[tokio::test]
async fn refresh_picks_up_direct_store_changes() {
    let store = Arc::new(MemoryStore::new());
    let tier = Arc::new(MemoryTier::named("memory"));
    let service = service(store.clone(), tier);
    let user = officer(Uuid::new_v4());

    let stale = service
        .resolve(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .await
        .unwrap();
    assert!(!stale.metadata.is_customized);

    store.insert_row(store.row(
        user.user_id,
        TemplateSlug::Template1,
        json!({ "content": { "headline": "New headline" } }),
        true,
    ));

    // Plain resolution still serves the cached copy.
    let cached = service
        .resolve(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .await
        .unwrap();
    assert_eq!(cached, stale);

    let fresh = service.refresh(&user, TemplateSlug::Template1).await.unwrap();
    assert_eq!(fresh.template.content["headline"], json!("New headline"));
    assert!(fresh.metadata.is_customized);
}

#[tokio::test]
async fn customizer_draft_wins_over_cache_and_store() {
    let store = Arc::new(MemoryStore::new());
    let tier = Arc::new(MemoryTier::named("memory"));
    let service = service(store.clone(), tier);
    let registry = CustomizerRegistry::new();
    let user = officer(Uuid::new_v4());

    store.insert_row(store.row(
        user.user_id,
        TemplateSlug::Template1,
        json!({ "colors": { "primary": "#111111" } }),
        true,
    ));

    let mut draft = TemplateBundle::default_for(TemplateSlug::Template1);
    draft.colors = json!({ "primary": "#00ff00" });
    registry.enter(user.user_id, draft, None);
    let mode = registry.mode_for(user.user_id);

    let resolved = service
        .resolve(&user, TemplateSlug::Template1, &mode)
        .await
        .unwrap();
    assert_eq!(resolved.template.colors, json!({ "primary": "#00ff00" }));
    assert!(!resolved.metadata.is_published);
    // The draft is served without any store traffic.
    assert_eq!(store.fetch_count(), 0);

    // A concurrent refresh repopulates caches from the store but cannot
    // leak into the editing session.
    service.refresh(&user, TemplateSlug::Template1).await.unwrap();
    let still_draft = service
        .resolve(&user, TemplateSlug::Template1, &mode)
        .await
        .unwrap();
    assert_eq!(still_draft.template.colors, json!({ "primary": "#00ff00" }));

    // Exiting editing mode reveals the stored customization.
    registry.exit(user.user_id);
    let mode = registry.mode_for(user.user_id);
    let stored = service
        .resolve(&user, TemplateSlug::Template1, &mode)
        .await
        .unwrap();
    assert_eq!(stored.template.colors, json!({ "primary": "#111111" }));
}

#[tokio::test]
async fn get_sync_reads_only_drafts_and_the_session_map() {
    let store = Arc::new(MemoryStore::new());
    let tier = Arc::new(MemoryTier::named("memory"));
    let service = service(store, tier);
    let user = officer(Uuid::new_v4());

    assert!(service
        .get_sync(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .is_none());

    service
        .resolve(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .await
        .unwrap();
    assert!(service
        .get_sync(&user, TemplateSlug::Template1, &CustomizerMode::Browsing)
        .is_some());
    assert_eq!(service.template_count(user.user_id), 1);
}

#[tokio::test]
async fn initialize_resolves_every_slug_and_clear_user_forgets_them() {
    let store = Arc::new(MemoryStore::new());
    let tier = Arc::new(MemoryTier::named("memory"));
    let service = service(store.clone(), tier.clone());
    let user = officer(Uuid::new_v4());

    let resolved = service.initialize(&user).await;
    assert_eq!(resolved.len(), TemplateSlug::ALL.len());
    assert_eq!(service.template_count(user.user_id), TemplateSlug::ALL.len());
    assert_eq!(store.fetch_count(), TemplateSlug::ALL.len());

    service.clear_user(user.user_id).await;
    assert_eq!(service.template_count(user.user_id), 0);
    for slug in TemplateSlug::ALL {
        let key = vetrina::cache::CacheKey::template(user.user_id, slug);
        assert!(tier.raw(&key).is_none());
    }
}
