use std::sync::Arc;

use tokio::sync::watch;

use super::data::{CommentRecord, Location};
use super::error::CommentError;
use super::manager::{CommentManager, LoadReport, Match};
use super::write_behind::WriteReceipt;
use crate::media::PhotoRef;

/// What a subscriber sees after each change
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Full canonical list
    pub records: Arc<[CommentRecord]>,
    /// Canonical indices of the records passing the active filter
    pub visible: Vec<usize>,
    pub filter: Option<String>,
    pub edit_target: Option<usize>,
}

impl Snapshot {
    fn of(manager: &CommentManager) -> Self {
        Self {
            records: manager.records().into(),
            visible: manager.visible().iter().map(|m| m.index).collect(),
            filter: manager.filter().map(str::to_string),
            edit_target: manager.edit_target(),
        }
    }
}

/// A [`CommentManager`] that publishes a [`Snapshot`] after every operation.
///
/// The manager stays the only source of truth; subscribers just watch it.
pub struct ObservableManager {
    manager: CommentManager,
    tx: watch::Sender<Snapshot>,
}

impl ObservableManager {
    pub fn new(manager: CommentManager) -> Self {
        let (tx, _) = watch::channel(Snapshot::of(&manager));
        Self { manager, tx }
    }

    /// Receiver that always holds the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Read-only access to the wrapped manager
    pub fn manager(&self) -> &CommentManager {
        &self.manager
    }

    pub fn add(
        &mut self,
        text: &str,
        location: Option<Location>,
        photo: Option<PhotoRef>,
    ) -> Result<WriteReceipt<usize>, CommentError> {
        let receipt = self.manager.add(text, location, photo)?;
        self.publish();
        Ok(receipt)
    }

    pub fn begin_edit(&mut self, index: usize) -> Result<String, CommentError> {
        let text = self.manager.begin_edit(index)?.to_string();
        self.publish();
        Ok(text)
    }

    pub fn commit_edit(
        &mut self,
        text: &str,
        location: Option<Location>,
    ) -> Result<WriteReceipt<usize>, CommentError> {
        let receipt = self.manager.commit_edit(text, location)?;
        self.publish();
        Ok(receipt)
    }

    pub fn cancel_edit(&mut self) {
        self.manager.cancel_edit();
        self.publish();
    }

    pub fn delete(&mut self, index: usize) -> Result<WriteReceipt<CommentRecord>, CommentError> {
        let receipt = self.manager.delete(index)?;
        self.publish();
        Ok(receipt)
    }

    pub fn attach_photo(
        &mut self,
        index: usize,
        photo: PhotoRef,
    ) -> Result<WriteReceipt<usize>, CommentError> {
        let receipt = self.manager.attach_photo(index, photo)?;
        self.publish();
        Ok(receipt)
    }

    pub fn search(&mut self, keyword: &str) -> Vec<Match<'_>> {
        self.manager.search(keyword);
        self.publish();
        self.manager.visible()
    }

    pub fn reset_filter(&mut self) -> Vec<Match<'_>> {
        self.search("")
    }

    pub async fn reload(&mut self) -> LoadReport {
        let report = self.manager.reload().await;
        self.publish();
        report
    }

    pub async fn flush(&self) -> Result<(), CommentError> {
        self.manager.flush().await
    }

    fn publish(&self) {
        // send_replace works with no subscribers, unlike send
        self.tx.send_replace(Snapshot::of(&self.manager));
    }
}
