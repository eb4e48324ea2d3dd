//! Behavioral tests for the tiered store: local-only commit semantics,
//! fallback ordering, cache policy gating, and loud write failures.

use std::sync::Arc;

use chrono::Utc;
use domains::error::DataError;
use domains::models::{NewPost, Post, PostPatch, Settings, SettingsPatch, Snapshot};
use domains::traits::{CacheStore, MockCacheStore, MockRemoteStore, CACHE_POSTS, CACHE_SETTINGS};
use services::{CachePolicy, TieredStore};
use storage_adapters::MemoryCache;

fn draft(title: &str) -> NewPost {
    NewPost {
        title: title.into(),
        description: format!("{title} description"),
        category: "general".into(),
        ..Default::default()
    }
}

fn post(id: &str, title: &str) -> Post {
    let now = Utc::now();
    Post {
        id: id.into(),
        title: title.into(),
        description: String::new(),
        category: "general".into(),
        video_ref: String::new(),
        thumbnail_ref: String::new(),
        created_at: now,
        updated_at: now,
    }
}

fn empty_seed() -> Snapshot {
    Snapshot {
        admin_pin: "1234".into(),
        posts: vec![],
        settings: Some(Settings::default()),
        exported_at: None,
    }
}

fn seeded() -> Snapshot {
    Snapshot { posts: vec![post("seed-1", "Seeded")], ..empty_seed() }
}

async fn local_store() -> TieredStore {
    TieredStore::init(None, Arc::new(MemoryCache::new()), CachePolicy::Fallback, empty_seed()).await
}

// ── Local-only mode ─────────────────────────────────────────────────────

#[tokio::test]
async fn add_post_assigns_distinct_ids() {
    let store = local_store().await;
    let mut ids = std::collections::HashSet::new();
    for i in 0..5 {
        let created = store.add_post(draft(&format!("Post {i}"))).await.unwrap();
        assert!(ids.insert(created.id));
    }
}

#[tokio::test]
async fn update_preserves_created_at() {
    let store = local_store().await;
    let created = store.add_post(draft("Original")).await.unwrap();

    let patch = PostPatch { title: Some("Renamed".into()), ..Default::default() };
    let updated = store.update_post(&created.id, patch).await.unwrap();

    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.created_at <= updated.updated_at);
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.description, created.description);
}

#[tokio::test]
async fn write_then_read_sees_the_post() {
    let store = local_store().await;
    store.add_post(draft("Fresh")).await.unwrap();

    let posts = store.get_posts().await;
    assert!(posts.iter().any(|p| p.title == "Fresh"));
}

#[tokio::test]
async fn invalid_draft_is_rejected_before_any_write() {
    let store = local_store().await;
    let before = store.get_posts().await.len();

    let bad = NewPost { title: "  ".into(), ..draft("ignored") };
    let err = store.add_post(bad).await.unwrap_err();
    assert!(matches!(err, DataError::Validation(_)));

    assert_eq!(store.get_posts().await.len(), before);
}

#[tokio::test]
async fn delete_of_unknown_id_is_not_found_every_time() {
    let store = local_store().await;
    for _ in 0..2 {
        let err = store.delete_post("nonexistent-id").await.unwrap_err();
        assert!(matches!(err, DataError::NotFound(_, _)));
    }
}

#[tokio::test]
async fn delete_then_lookup_misses() {
    let store = local_store().await;
    let created = store.add_post(draft("Doomed")).await.unwrap();

    store.delete_post(&created.id).await.unwrap();
    assert!(store.get_post_by_id(&created.id).await.is_none());
}

#[tokio::test]
async fn settings_patch_merges_shallowly() {
    let store = local_store().await;
    store
        .update_settings(SettingsPatch {
            adsense_code: Some("X".into()),
            analytics_code: Some("Y".into()),
        })
        .await
        .unwrap();
    let before = store.get_settings().await;

    let merged = store
        .update_settings(SettingsPatch { analytics_code: Some("Z".into()), ..Default::default() })
        .await
        .unwrap();

    assert_eq!(merged.adsense_code, "X");
    assert_eq!(merged.analytics_code, "Z");
    assert!(merged.last_modified >= before.last_modified);
}

#[tokio::test]
async fn search_is_case_insensitive_over_all_fields() {
    let store = local_store().await;
    store.add_post(draft("Welcome")).await.unwrap();
    store.add_post(draft("Farewell")).await.unwrap();

    let hits = store.search("WELC").await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Welcome");

    // Substring anywhere in the field counts.
    let hits = store.search("well").await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Farewell");

    // Category matches too.
    assert_eq!(store.search("GENERAL").await.len(), 2);
}

#[tokio::test]
async fn reset_clears_posts_and_restores_default_settings() {
    let store = local_store().await;
    store.add_post(draft("One")).await.unwrap();
    store
        .update_settings(SettingsPatch { adsense_code: Some("X".into()), ..Default::default() })
        .await
        .unwrap();

    store.reset_all().await.unwrap();

    assert!(store.get_posts().await.is_empty());
    let settings = store.get_settings().await;
    assert!(settings.adsense_code.is_empty());
    assert!(settings.analytics_code.is_empty());
}

#[tokio::test]
async fn local_mode_serves_seed_until_first_write() {
    let store =
        TieredStore::init(None, Arc::new(MemoryCache::new()), CachePolicy::Fallback, seeded()).await;

    let posts = store.get_posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "seed-1");

    // A present-but-empty cache beats the seed: delete the only post and the
    // collection stays empty instead of resurrecting the seed.
    store.delete_post("seed-1").await.unwrap();
    assert!(store.get_posts().await.is_empty());
}

#[tokio::test]
async fn pin_and_export_round_trip() {
    let store = local_store().await;
    assert!(store.verify_pin("1234").await);
    assert!(!store.verify_pin("0000").await);

    store.add_post(draft("Kept")).await.unwrap();
    let exported = store.export_snapshot().await;
    assert_eq!(exported.admin_pin, "1234");
    assert_eq!(exported.posts.len(), 1);
    assert!(exported.exported_at.is_some());

    let restored = Snapshot::from_json(&exported.to_json_pretty().unwrap()).unwrap();
    assert_eq!(restored.posts[0].title, "Kept");
}

#[tokio::test]
async fn failed_local_commit_errors_after_writing_both_keys() {
    let mut cache = MockCacheStore::new();
    cache.expect_load().returning(|_| None);
    cache
        .expect_save()
        .withf(|key, _| key == CACHE_POSTS)
        .times(1)
        .returning(|_, _| false);
    cache
        .expect_save()
        .withf(|key, _| key == CACHE_SETTINGS)
        .times(1)
        .returning(|_, _| true);

    let store =
        TieredStore::init(None, Arc::new(cache), CachePolicy::Fallback, empty_seed()).await;

    // The posts save fails, but the settings key is still written before the
    // error surfaces, so the cache is at most one generation behind on one
    // key rather than holding a half-applied write.
    let err = store.add_post(draft("Unsaved")).await.unwrap_err();
    assert!(matches!(err, DataError::Cache(_)));
}

// ── Remote mode ─────────────────────────────────────────────────────────

fn unreachable_remote() -> MockRemoteStore {
    let mut remote = MockRemoteStore::new();
    remote.expect_list_posts().returning(|| Err(DataError::Transport("refused".into())));
    remote.expect_fetch_all().returning(|| Err(DataError::Transport("refused".into())));
    remote
}

#[tokio::test]
async fn unreachable_backend_falls_back_to_cache_then_seed() {
    let cache = Arc::new(MemoryCache::new());
    let cached = vec![post("a", "A"), post("b", "B")];
    cache.save(CACHE_POSTS, &serde_json::to_string(&cached).unwrap()).await;

    let store = TieredStore::init(
        Some(Arc::new(unreachable_remote())),
        cache,
        CachePolicy::Fallback,
        seeded(),
    )
    .await;

    let titles: Vec<_> = store.get_posts().await.into_iter().map(|p| p.title).collect();
    assert_eq!(titles, vec!["A", "B"]);

    // With nothing cached either, the embedded seed is the floor.
    let bare = TieredStore::init(
        Some(Arc::new(unreachable_remote())),
        Arc::new(MemoryCache::new()),
        CachePolicy::Fallback,
        seeded(),
    )
    .await;
    let posts = bare.get_posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "seed-1");
}

#[tokio::test]
async fn first_run_only_policy_refuses_cache_after_backend_was_reached() {
    let mut remote = MockRemoteStore::new();
    remote.expect_list_posts().returning(|| Ok(vec![]));
    // First refresh succeeds and backs the data up into the cache; every
    // later one fails.
    let mut calls = 0;
    remote.expect_fetch_all().returning(move || {
        calls += 1;
        if calls == 1 {
            Ok(Snapshot { posts: vec![post("r1", "Remote")], ..empty_seed() })
        } else {
            Err(DataError::Transport("gone".into()))
        }
    });

    let cache = Arc::new(MemoryCache::new());
    let store = TieredStore::init(
        Some(Arc::new(remote)),
        Arc::clone(&cache) as Arc<dyn domains::traits::CacheStore>,
        CachePolicy::FirstRunOnly,
        seeded(),
    )
    .await;

    // The cache now holds the remote data, but the backend has been reached
    // this session, so a failed read must not serve it back.
    assert!(cache.load(CACHE_POSTS).await.is_some());
    let posts = store.get_posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "seed-1");
}

#[tokio::test]
async fn disabled_policy_issues_no_cache_io() {
    let mut cache = MockCacheStore::new();
    cache.expect_load().times(0);
    cache.expect_save().times(0);

    let store = TieredStore::init(
        Some(Arc::new(unreachable_remote())),
        Arc::new(cache),
        CachePolicy::Disabled,
        seeded(),
    )
    .await;

    // The unreachable backend forces a fallback on every read; with the
    // cache disabled it must go straight to the seed.
    let posts = store.get_posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "seed-1");
}

#[tokio::test]
async fn remote_write_failure_is_loud_and_demotes_availability() {
    let mut remote = MockRemoteStore::new();
    remote.expect_list_posts().returning(|| Ok(vec![]));
    remote.expect_fetch_all().returning(|| Ok(empty_seed()));
    remote.expect_create_post().returning(|_| {
        Err(DataError::Status { code: 500, message: "backend exploded".into() })
    });

    let store = TieredStore::init(
        Some(Arc::new(remote)),
        Arc::new(MemoryCache::new()),
        CachePolicy::Fallback,
        empty_seed(),
    )
    .await;

    let err = store.add_post(draft("Lost")).await.unwrap_err();
    assert!(matches!(err, DataError::Status { code: 500, .. }));

    // The failure latched availability off: the next write refuses fast.
    assert!(!store.is_online());
    let err = store.add_post(draft("Also lost")).await.unwrap_err();
    assert!(matches!(err, DataError::Transport(_)));
}

#[tokio::test]
async fn remote_create_returns_backend_confirmed_record() {
    let mut remote = MockRemoteStore::new();
    remote.expect_list_posts().returning(|| Ok(vec![]));
    remote.expect_create_post().returning(|p| {
        let mut echoed = p.clone();
        echoed.title = format!("{} (confirmed)", echoed.title);
        Ok(echoed)
    });
    remote.expect_fetch_all().returning(|| Ok(empty_seed()));

    let store = TieredStore::init(
        Some(Arc::new(remote)),
        Arc::new(MemoryCache::new()),
        CachePolicy::Fallback,
        empty_seed(),
    )
    .await;

    let created = store.add_post(draft("Echo")).await.unwrap();
    assert_eq!(created.title, "Echo (confirmed)");
}

#[tokio::test]
async fn remote_not_found_propagates_without_demoting_availability() {
    let mut remote = MockRemoteStore::new();
    remote.expect_list_posts().returning(|| Ok(vec![]));
    remote.expect_fetch_all().returning(|| Ok(empty_seed()));
    remote
        .expect_update_post()
        .returning(|id, _| Err(DataError::NotFound("post".into(), id.into())));

    let store = TieredStore::init(
        Some(Arc::new(remote)),
        Arc::new(MemoryCache::new()),
        CachePolicy::Fallback,
        empty_seed(),
    )
    .await;

    let patch = PostPatch { title: Some("New".into()), ..Default::default() };
    let err = store.update_post("ghost", patch).await.unwrap_err();
    assert!(matches!(err, DataError::NotFound(_, _)));
    assert!(store.is_online());
}

#[tokio::test]
async fn probe_restores_availability_after_an_outage() {
    let mut remote = MockRemoteStore::new();
    let mut probes = 0;
    remote.expect_list_posts().returning(move || {
        probes += 1;
        if probes == 1 {
            Err(DataError::Transport("starting up".into()))
        } else {
            Ok(vec![])
        }
    });
    remote.expect_fetch_all().returning(|| Ok(empty_seed()));

    let store = TieredStore::init(
        Some(Arc::new(remote)),
        Arc::new(MemoryCache::new()),
        CachePolicy::Fallback,
        empty_seed(),
    )
    .await;

    assert!(!store.is_online());
    assert!(store.probe().await);
    assert!(store.is_online());
}
