//! Queue worker tests against a real SQLite queue

mod common;

use async_trait::async_trait;
use common::TestApp;
use dj_core::{
    DjError, InsertOutcome, JobQueue, PlaylistId, PlaylistRecord, PlaylistRequest, PlaylistStore,
    ReceivedMessage, RecommendationSource, Recommendations, Result, Track, UserId,
};
use dj_pipeline::{JobProcessor, RequestIntake, SubmitPlaylist};
use dj_server::{BatchReport, PlaylistWorker, WorkerOptions};
use dj_storage::job_queue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

fn options(app: &TestApp) -> WorkerOptions {
    WorkerOptions {
        retry_delay: Duration::ZERO,
        ..WorkerOptions::from_config(&app.config)
    }
}

async fn worker(app: &TestApp) -> PlaylistWorker {
    PlaylistWorker::new(
        app.backends.job_queue().unwrap(),
        Arc::new(app.backends.processor(&app.config).await.unwrap()),
        options(app),
    )
}

fn submission(prompt: &str, user_id: &str, count: i64) -> SubmitPlaylist {
    SubmitPlaylist {
        prompt: Some(prompt.to_string()),
        user_id: Some(user_id.to_string()),
        count: Some(count),
        idempotency_key: None,
    }
}

/// Sleeps past any reasonable invocation timeout
struct SlowSource;

#[async_trait]
impl RecommendationSource for SlowSource {
    async fn recommend(&self, _seed: &str, _limit: u32) -> Recommendations {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Recommendations::Found(vec![Track::external("Late", "Artist", None)])
    }
}

/// Queue whose first acknowledgment fails, as under a locked database
struct FlakyAckQueue {
    inner: Arc<dyn JobQueue>,
    fail_next_delete: AtomicBool,
}

#[async_trait]
impl JobQueue for FlakyAckQueue {
    async fn send(&self, body: &str) -> Result<String> {
        self.inner.send(body).await
    }

    async fn receive(
        &self,
        max_messages: u32,
        visibility_timeout: Duration,
    ) -> Result<Vec<ReceivedMessage>> {
        self.inner.receive(max_messages, visibility_timeout).await
    }

    async fn delete(&self, receipt_handle: &str) -> Result<bool> {
        if self.fail_next_delete.swap(false, Ordering::SeqCst) {
            return Err(DjError::queue("database is locked"));
        }
        self.inner.delete(receipt_handle).await
    }

    async fn release(
        &self,
        receipt_handle: &str,
        error: &str,
        visible_after: Duration,
    ) -> Result<bool> {
        self.inner
            .release(receipt_handle, error, visible_after)
            .await
    }

    async fn dead_letter(&self, receipt_handle: &str, error: &str) -> Result<bool> {
        self.inner.dead_letter(receipt_handle, error).await
    }
}

/// Store whose table is missing
struct MissingTableStore;

#[async_trait]
impl PlaylistStore for MissingTableStore {
    async fn insert_if_absent(&self, _record: &PlaylistRecord) -> Result<InsertOutcome> {
        Err(DjError::misconfigured("playlist table not configured"))
    }

    async fn get(&self, _id: &PlaylistId) -> Result<Option<PlaylistRecord>> {
        Err(DjError::misconfigured("playlist table not configured"))
    }

    async fn list_by_user(&self, _user_id: &UserId, _limit: u32) -> Result<Vec<PlaylistRecord>> {
        Err(DjError::misconfigured("playlist table not configured"))
    }
}

#[tokio::test]
async fn test_request_is_processed_and_acknowledged() {
    let app = TestApp::new().await;
    let intake: RequestIntake = app.backends.intake(&app.config);
    let accepted = intake
        .submit(submission("songs like 'Blinding Lights'", "u1", 4))
        .await
        .unwrap();

    let report = worker(&app).await.poll_once().await.unwrap();
    assert_eq!(
        report,
        BatchReport {
            received: 1,
            completed: 1,
            failed: 0
        }
    );

    let record = app
        .backends
        .playlist_store()
        .unwrap()
        .get(&accepted.playlist_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.songs.len(), 4);
    assert_eq!(record.prompt, "songs like 'Blinding Lights'");

    let stats = job_queue::stats(app.backends.require_queue().unwrap().pool())
        .await
        .unwrap();
    assert_eq!(stats.visible + stats.in_flight + stats.delayed + stats.dead_lettered, 0);
}

#[tokio::test]
async fn test_empty_queue_reports_nothing() {
    let app = TestApp::new().await;
    let report = worker(&app).await.poll_once().await.unwrap();

    assert_eq!(report, BatchReport::default());
}

#[tokio::test]
async fn test_duplicate_delivery_writes_one_record() {
    let app = TestApp::new().await;
    let queue = app.backends.job_queue().unwrap();

    let mut request = PlaylistRequest::new("chill vibes", UserId::new("u1"), Some(3));
    request.playlist_id = Some(PlaylistId::new("fixed-id"));
    let body = request.to_message_body().unwrap();
    queue.send(&body).await.unwrap();
    queue.send(&body).await.unwrap();

    let report = worker(&app).await.poll_once().await.unwrap();
    assert_eq!(report.completed, 2);

    let records = app
        .backends
        .playlist_store()
        .unwrap()
        .list_by_user(&UserId::new("u1"), 100)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].playlist_id.as_str(), "fixed-id");
}

#[tokio::test]
async fn test_other_message_types_are_acknowledged() {
    let app = TestApp::new().await;
    let queue = app.backends.job_queue().unwrap();
    queue
        .send(r#"{"type": "cleanup", "older_than": 30}"#)
        .await
        .unwrap();

    let report = worker(&app).await.poll_once().await.unwrap();
    assert_eq!(report.completed, 1);

    let stats = job_queue::stats(app.backends.require_queue().unwrap().pool())
        .await
        .unwrap();
    assert_eq!(stats.visible + stats.in_flight + stats.delayed, 0);
}

#[tokio::test]
async fn test_poison_message_is_dead_lettered() {
    let app = TestApp::new().await;
    let queue = app.backends.job_queue().unwrap();
    queue.send("not json").await.unwrap();

    let worker = worker(&app).await;
    let max = app.config.queue.max_receive_count;

    for _ in 0..max {
        let report = worker.poll_once().await.unwrap();
        assert_eq!(report.failed, 1);
    }

    // The next receive moves it aside instead of delivering it
    let report = worker.poll_once().await.unwrap();
    assert_eq!(report.received, 0);

    let pool = app.backends.require_queue().unwrap().pool();
    let stats = job_queue::stats(pool).await.unwrap();
    assert_eq!(stats.dead_lettered, 1);

    let letters = job_queue::dead_letters(pool).await.unwrap();
    assert_eq!(letters[0].body, "not json");
    assert_eq!(letters[0].receive_count, i64::from(max));
    assert!(letters[0].last_error.is_some());
}

#[tokio::test]
async fn test_timed_out_message_is_released() {
    let app = TestApp::new().await;
    let processor = JobProcessor::new(app.backends.playlist_store().unwrap())
        .with_recommendations(Arc::new(SlowSource));

    let worker = PlaylistWorker::new(
        app.backends.job_queue().unwrap(),
        Arc::new(processor),
        WorkerOptions {
            invocation_timeout: Duration::from_millis(50),
            ..options(&app)
        },
    );

    let intake = app.backends.intake(&app.config);
    let accepted = intake.submit(submission("chill", "u1", 2)).await.unwrap();

    let report = worker.poll_once().await.unwrap();
    assert_eq!(report.failed, 1);

    let stored = app
        .backends
        .playlist_store()
        .unwrap()
        .get(&accepted.playlist_id)
        .await
        .unwrap();
    assert!(stored.is_none());

    let stats = job_queue::stats(app.backends.require_queue().unwrap().pool())
        .await
        .unwrap();
    assert_eq!(stats.visible, 1);
}

#[tokio::test]
async fn test_workers_stop_on_cancel() {
    let app = TestApp::new().await;
    let worker = Arc::new(worker(&app).await);
    let cancel = CancellationToken::new();

    let intake = app.backends.intake(&app.config);
    let accepted = intake.submit(submission("focus", "u2", 2)).await.unwrap();

    let handles = Arc::clone(&worker).start(2, cancel.clone());

    let store = app.backends.playlist_store().unwrap();
    let mut written = None;
    for _ in 0..100 {
        written = store.get(&accepted.playlist_id).await.unwrap();
        if written.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(written.is_some());

    cancel.cancel();
    for handle in handles {
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}

#[tokio::test]
async fn test_failed_acknowledgment_does_not_abandon_batch() {
    let app = TestApp::new().await;
    let queue: Arc<dyn JobQueue> = Arc::new(FlakyAckQueue {
        inner: app.backends.job_queue().unwrap(),
        fail_next_delete: AtomicBool::new(true),
    });

    let intake = RequestIntake::new(Some(Arc::clone(&queue)), app.config.intake.max_count);
    let first = intake.submit(submission("chill", "u1", 2)).await.unwrap();
    let second = intake.submit(submission("focus", "u1", 2)).await.unwrap();

    let worker = PlaylistWorker::new(
        queue,
        Arc::new(app.backends.processor(&app.config).await.unwrap()),
        options(&app),
    );
    let report = worker.poll_once().await.unwrap();

    assert_eq!(
        report,
        BatchReport {
            received: 2,
            completed: 1,
            failed: 1
        }
    );

    let store = app.backends.playlist_store().unwrap();
    assert!(store.get(&first.playlist_id).await.unwrap().is_some());
    assert!(store.get(&second.playlist_id).await.unwrap().is_some());

    // The unacknowledged lease is left to expire and be redelivered
    let stats = job_queue::stats(app.backends.require_queue().unwrap().pool())
        .await
        .unwrap();
    assert_eq!(stats.in_flight, 1);
    assert_eq!(stats.dead_lettered, 0);
}

#[tokio::test]
async fn test_unretryable_failure_is_dead_lettered_at_once() {
    let app = TestApp::new().await;
    let worker = PlaylistWorker::new(
        app.backends.job_queue().unwrap(),
        Arc::new(JobProcessor::new(Arc::new(MissingTableStore)).offline(true)),
        options(&app),
    );

    let intake = app.backends.intake(&app.config);
    intake.submit(submission("chill", "u1", 2)).await.unwrap();

    let report = worker.poll_once().await.unwrap();
    assert_eq!(report.failed, 1);

    let pool = app.backends.require_queue().unwrap().pool();
    let letters = job_queue::dead_letters(pool).await.unwrap();
    assert_eq!(letters.len(), 1);
    assert_eq!(letters[0].receive_count, 1);
    assert!(letters[0]
        .last_error
        .as_deref()
        .unwrap()
        .contains("playlist table not configured"));

    assert_eq!(worker.poll_once().await.unwrap().received, 0);
}
