/// Write-behind persistence for one comment scope
///
/// The manager mutates its in-memory list first, then hands the serialized
/// list to a single background task per scope. That task applies writes in
/// submission order, so a later list can never be overwritten by an earlier
/// one. Each submission returns a [`WriteReceipt`] the caller may await to
/// learn whether the write reached the store, or drop to fire and forget.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::error::{CommentError, StoreError};
use super::store::KeyValueStore;
use crate::media::{AssetReleaser, PhotoRef};

/// Outcome of one background write
#[derive(Debug)]
pub struct WriteReport {
    /// Whether the full list reached the store
    pub persisted: Result<(), CommentError>,
    /// Result of releasing a deleted record's photo, if there was one
    pub asset_release: Option<Result<(), CommentError>>,
}

/// Handle returned by every mutating manager operation
#[derive(Debug)]
pub struct WriteReceipt<T> {
    value: T,
    rx: oneshot::Receiver<WriteReport>,
}

impl<T> WriteReceipt<T> {
    /// A receipt whose outcome is already known
    pub(crate) fn ready(value: T, report: WriteReport) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(report);
        Self { value, rx }
    }

    /// The operation's result, available immediately
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Take the result and stop tracking the write
    pub fn into_value(self) -> T {
        self.value
    }

    /// Wait for the write; fails only if it did not reach the store
    pub async fn confirm(self) -> Result<T, CommentError> {
        let (value, report) = self.settle().await;
        report.persisted.map(|()| value)
    }

    /// Wait for the write and return everything that happened
    pub async fn settle(self) -> (T, WriteReport) {
        let report = self.rx.await.unwrap_or(WriteReport {
            persisted: Err(CommentError::WriterClosed),
            asset_release: None,
        });
        (self.value, report)
    }
}

enum Job {
    Write {
        payload: String,
        release: Option<PhotoRef>,
        done: oneshot::Sender<WriteReport>,
    },
    Flush {
        done: oneshot::Sender<Option<Arc<StoreError>>>,
    },
}

/// Sender side of a scope's writer task
#[derive(Debug)]
pub struct WriteBehind {
    key: String,
    tx: mpsc::UnboundedSender<Job>,
}

impl WriteBehind {
    /// Start the writer task for `key`. Must be called inside a tokio runtime.
    ///
    /// The task exits once this handle is dropped and the queue is drained.
    pub fn spawn(
        store: Arc<dyn KeyValueStore>,
        releaser: Arc<dyn AssetReleaser>,
        key: String,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, releaser, key.clone(), rx));
        Self { key, tx }
    }

    /// Queue a full-list write, optionally followed by releasing a photo
    pub fn submit<T>(
        &self,
        value: T,
        payload: String,
        release: Option<PhotoRef>,
    ) -> WriteReceipt<T> {
        let (done, rx) = oneshot::channel();
        let job = Job::Write {
            payload,
            release,
            done,
        };
        if self.tx.send(job).is_err() {
            return WriteReceipt::ready(
                value,
                WriteReport {
                    persisted: Err(CommentError::WriterClosed),
                    asset_release: None,
                },
            );
        }
        WriteReceipt { value, rx }
    }

    /// Wait until every queued write has been applied.
    ///
    /// Fails if the most recent write did not reach the store, meaning the
    /// stored list is behind the in-memory one.
    pub async fn flush(&self) -> Result<(), CommentError> {
        let (done, rx) = oneshot::channel();
        self.tx
            .send(Job::Flush { done })
            .map_err(|_| CommentError::WriterClosed)?;
        match rx.await.map_err(|_| CommentError::WriterClosed)? {
            None => Ok(()),
            Some(source) => Err(CommentError::Persistence {
                key: self.key.clone(),
                source,
            }),
        }
    }
}

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    releaser: Arc<dyn AssetReleaser>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<Job>,
) {
    let mut last_failure: Option<Arc<StoreError>> = None;

    while let Some(job) = rx.recv().await {
        match job {
            Job::Write {
                payload,
                release,
                done,
            } => {
                let persisted = match store.set(&key, &payload).await {
                    Ok(()) => {
                        tracing::debug!(key = %key, bytes = payload.len(), "comments persisted");
                        last_failure = None;
                        Ok(())
                    }
                    Err(source) => {
                        tracing::warn!(key = %key, error = %source, "failed to persist comments");
                        let source = Arc::new(source);
                        last_failure = Some(Arc::clone(&source));
                        Err(CommentError::Persistence {
                            key: key.clone(),
                            source,
                        })
                    }
                };

                let asset_release = match release {
                    Some(photo) => Some(release_photo(releaser.as_ref(), photo).await),
                    None => None,
                };

                // Receiver dropped means fire-and-forget; the failure is already logged
                let _ = done.send(WriteReport {
                    persisted,
                    asset_release,
                });
            }
            Job::Flush { done } => {
                let _ = done.send(last_failure.clone());
            }
        }
    }

    tracing::debug!(key = %key, "writer stopped");
}

async fn release_photo(releaser: &dyn AssetReleaser, photo: PhotoRef) -> Result<(), CommentError> {
    releaser.release(&photo).await.map_err(|source| {
        tracing::warn!(photo = %photo, error = %source, "failed to release photo asset");
        CommentError::AssetRelease { photo, source }
    })
}
