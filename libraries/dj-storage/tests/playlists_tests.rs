//! Integration tests for the playlists vertical slice
//!
//! Tests playlist operations including:
//! - Conditional insert (no overwrite on duplicate IDs)
//! - Lookup by ID with songs round-tripped through JSON
//! - Per-user listing in creation order


use dj_core::{InsertOutcome, PlaylistId, PlaylistStore, TrackSource, UserId};
use dj_storage::{playlists, LocalPlaylistStore};
use test_helpers::*;

#[tokio::test]
async fn test_insert_and_get_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let record = test_record("p1", "u1", 5);
    let outcome = playlists::insert_if_absent(pool, &record).await.unwrap();
    assert_eq!(outcome, InsertOutcome::Inserted);

    let stored = playlists::get_by_id(pool, &PlaylistId::new("p1"))
        .await
        .unwrap()
        .expect("record should exist");

    assert_eq!(stored, record);
    assert_eq!(stored.songs.len(), 5);
    assert!(stored.songs.iter().all(|s| s.source == TrackSource::Filler));
}

#[tokio::test]
async fn test_get_missing_playlist_returns_none() {
    let test_db = TestDb::new().await;

    let stored = playlists::get_by_id(test_db.pool(), &PlaylistId::new("missing"))
        .await
        .unwrap();

    assert!(stored.is_none());
}

#[tokio::test]
async fn test_duplicate_insert_does_not_overwrite() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let first = test_record("p1", "u1", 3);
    let mut second = test_record("p1", "u1", 7);
    second.prompt = "something else".to_string();

    assert_eq!(
        playlists::insert_if_absent(pool, &first).await.unwrap(),
        InsertOutcome::Inserted
    );
    assert_eq!(
        playlists::insert_if_absent(pool, &second).await.unwrap(),
        InsertOutcome::AlreadyExists
    );

    let stored = playlists::get_by_id(pool, &PlaylistId::new("p1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.songs.len(), 3);
    assert_eq!(stored.prompt, first.prompt);
    assert_eq!(playlists::count(pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_list_by_user_in_creation_order() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    playlists::insert_if_absent(pool, &test_record_at("late", "u1", 1_700_000_300))
        .await
        .unwrap();
    playlists::insert_if_absent(pool, &test_record_at("early", "u1", 1_700_000_100))
        .await
        .unwrap();
    playlists::insert_if_absent(pool, &test_record_at("other", "u2", 1_700_000_200))
        .await
        .unwrap();

    let listed = playlists::list_by_user(pool, &UserId::new("u1"), 10)
        .await
        .unwrap();

    let ids: Vec<&str> = listed.iter().map(|r| r.playlist_id.as_str()).collect();
    assert_eq!(ids, vec!["early", "late"]);
}

#[tokio::test]
async fn test_list_by_user_respects_limit() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    for i in 0..5 {
        playlists::insert_if_absent(pool, &test_record_at(&format!("p{}", i), "u1", 1_700_000_000 + i))
            .await
            .unwrap();
    }

    let listed = playlists::list_by_user(pool, &UserId::new("u1"), 2)
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].playlist_id.as_str(), "p0");
}

#[tokio::test]
async fn test_store_trait_adapter() {
    let test_db = TestDb::new().await;
    let store = LocalPlaylistStore::new(test_db.pool().clone());

    let record = test_record("p1", "u1", 2);
    assert_eq!(
        store.insert_if_absent(&record).await.unwrap(),
        InsertOutcome::Inserted
    );
    assert_eq!(
        store.insert_if_absent(&record).await.unwrap(),
        InsertOutcome::AlreadyExists
    );

    let fetched = store.get(&PlaylistId::new("p1")).await.unwrap();
    assert_eq!(fetched, Some(record));
}
