/// Queue consumer for playlist requests
///
/// Each worker leases a batch of messages, runs every message through the
/// job processor under the invocation timeout, deletes messages that
/// succeeded, and releases the rest so they are redelivered after the retry
/// delay. The queue dead-letters a message once it exhausts its deliveries;
/// errors that no retry can fix are dead-lettered at once.
use crate::config::ServiceConfig;
use dj_core::{JobQueue, ReceivedMessage, Result};
use dj_pipeline::{JobProcessor, ProcessOutcome};
use std::{sync::Arc, time::Duration};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub batch_size: u32,
    pub visibility_timeout: Duration,
    pub invocation_timeout: Duration,
    pub retry_delay: Duration,
    pub poll_interval: Duration,
}

impl WorkerOptions {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            batch_size: config.queue.batch_size,
            visibility_timeout: config.visibility_timeout(),
            invocation_timeout: config.invocation_timeout(),
            retry_delay: config.retry_delay(),
            poll_interval: config.poll_interval(),
        }
    }
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

/// What one poll did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub received: usize,
    /// Processed and deleted (including skipped and already-existing)
    pub completed: usize,
    /// Released, dead-lettered, or left for its lease to expire
    pub failed: usize,
}

pub struct PlaylistWorker {
    queue: Arc<dyn JobQueue>,
    processor: Arc<JobProcessor>,
    options: WorkerOptions,
}

impl PlaylistWorker {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        processor: Arc<JobProcessor>,
        options: WorkerOptions,
    ) -> Self {
        Self {
            queue,
            processor,
            options,
        }
    }

    /// Start `workers` polling tasks that stop when `cancel` fires
    pub fn start(
        self: Arc<Self>,
        workers: usize,
        cancel: CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        (0..workers)
            .map(|worker_id| {
                let worker = Arc::clone(&self);
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    tracing::info!(worker_id, "Playlist worker started");
                    worker.run(worker_id, cancel).await;
                    tracing::info!(worker_id, "Playlist worker stopped");
                })
            })
            .collect()
    }

    /// Poll until cancelled. A batch in progress always runs to completion.
    pub async fn run(&self, worker_id: usize, cancel: CancellationToken) {
        while !cancel.is_cancelled() {
            let idle = match self.poll_once().await {
                Ok(report) => report.received == 0,
                Err(e) => {
                    tracing::error!(worker_id, error = %e, "Failed to poll job queue");
                    true
                }
            };

            if idle {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(self.options.poll_interval) => {}
                }
            }
        }
    }

    /// Lease one batch and process its messages concurrently.
    ///
    /// Each message has its own invocation timeout, so every lease in the
    /// batch is settled well inside the visibility timeout.
    pub async fn poll_once(&self) -> Result<BatchReport> {
        let messages = self
            .queue
            .receive(self.options.batch_size, self.options.visibility_timeout)
            .await?;

        let mut report = BatchReport {
            received: messages.len(),
            ..BatchReport::default()
        };

        let mut tasks = JoinSet::new();
        for message in messages {
            let queue = Arc::clone(&self.queue);
            let processor = Arc::clone(&self.processor);
            let options = self.options.clone();
            tasks.spawn(async move { handle(&*queue, &processor, &options, &message).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => report.completed += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    // The lease expires and the message is redelivered
                    tracing::error!(error = %e, "Message task panicked");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Process one message and settle its lease.
///
/// Returns true only when the message was processed and acknowledged.
/// Queue errors while settling are logged; the lease then expires and the
/// message is redelivered.
async fn handle(
    queue: &dyn JobQueue,
    processor: &JobProcessor,
    options: &WorkerOptions,
    message: &ReceivedMessage,
) -> bool {
    let result =
        tokio::time::timeout(options.invocation_timeout, processor.process(&message.body)).await;

    let error = match result {
        Ok(Ok(outcome)) => {
            if let ProcessOutcome::Skipped { kind } = &outcome {
                tracing::debug!(
                    message_id = %message.message_id,
                    kind = ?kind,
                    "Message skipped"
                );
            }
            return acknowledge(queue, message).await;
        }
        Ok(Err(e)) if !e.is_retryable() => {
            tracing::error!(
                message_id = %message.message_id,
                error = %e,
                "Message cannot succeed on retry, dead-lettering"
            );
            if let Err(queue_err) = queue
                .dead_letter(&message.receipt_handle, &e.to_string())
                .await
            {
                tracing::error!(
                    message_id = %message.message_id,
                    error = %queue_err,
                    "Failed to dead-letter message"
                );
            }
            return false;
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!(
            "processing timed out after {:?}",
            options.invocation_timeout
        ),
    };

    tracing::error!(
        message_id = %message.message_id,
        receive_count = message.receive_count,
        error = %error,
        "Failed to process message"
    );

    if let Err(e) = queue
        .release(&message.receipt_handle, &error, options.retry_delay)
        .await
    {
        tracing::error!(
            message_id = %message.message_id,
            error = %e,
            "Failed to release message"
        );
    }

    false
}

async fn acknowledge(queue: &dyn JobQueue, message: &ReceivedMessage) -> bool {
    match queue.delete(&message.receipt_handle).await {
        Ok(true) => true,
        Ok(false) => {
            tracing::warn!(
                message_id = %message.message_id,
                "Lease expired before acknowledgment; message may be redelivered"
            );
            true
        }
        Err(e) => {
            tracing::error!(
                message_id = %message.message_id,
                error = %e,
                "Failed to acknowledge message; it will be redelivered"
            );
            false
        }
    }
}
