/// Comment record manager
///
/// Owns the ordered comment list of one scope and the edit/filter state
/// the presentation layer drives. Every mutation updates memory first and
/// then queues the full list on the scope's write-behind task.
///
/// Indices always address the canonical list. A search never removes
/// records; its matches carry their canonical index so edit/delete/attach
/// keep targeting the right record while a filter is shown.

use std::sync::Arc;

use super::data::{decode_list, encode_list, validate_text, now_stamp, CommentRecord, Location, Scope};
use super::error::{CommentError, StoreError};
use super::store::KeyValueStore;
use super::write_behind::{WriteBehind, WriteReceipt, WriteReport};
use crate::media::{AssetReleaser, PhotoRef};

/// How the initial load went
#[derive(Debug)]
pub enum LoadReport {
    /// The stored list was read (or the key was absent)
    Loaded,
    /// Stored data was unreadable; the scope starts from an empty list
    Recovered(CommentError),
}

/// One record in a filtered view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    /// Position in the canonical list, valid for edit/delete/attach
    pub index: usize,
    pub record: &'a CommentRecord,
}

pub struct CommentManager {
    scope: Scope,
    key: String,
    records: Vec<CommentRecord>,
    edit_target: Option<usize>,
    filter: Option<String>,
    store: Arc<dyn KeyValueStore>,
    writer: WriteBehind,
}

impl CommentManager {
    /// Load the list for `scope` and start its writer task.
    ///
    /// Never fails: unreadable data is reported through [`LoadReport`] and
    /// replaced by an empty list.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        releaser: Arc<dyn AssetReleaser>,
        scope: Scope,
    ) -> (Self, LoadReport) {
        let key = scope.storage_key();
        let writer = WriteBehind::spawn(Arc::clone(&store), releaser, key.clone());
        let mut manager = Self {
            scope,
            key,
            records: Vec::new(),
            edit_target: None,
            filter: None,
            store,
            writer,
        };
        let report = manager.reload().await;
        (manager, report)
    }

    /// Re-read the stored list, replacing in-memory state.
    ///
    /// Clears any edit in progress and the active filter.
    pub async fn reload(&mut self) -> LoadReport {
        self.edit_target = None;
        self.filter = None;

        let (records, report) = match self.store.get(&self.key).await {
            Ok(None) => (Vec::new(), LoadReport::Loaded),
            Ok(Some(json)) => match decode_list(&json) {
                Ok(records) => (records, LoadReport::Loaded),
                Err(source) => {
                    tracing::warn!(key = %self.key, error = %source, "stored comments are corrupt, starting empty");
                    let err = CommentError::CorruptState {
                        key: self.key.clone(),
                        source,
                    };
                    (Vec::new(), LoadReport::Recovered(err))
                }
            },
            Err(source) => {
                tracing::warn!(key = %self.key, error = %source, "failed to read comments, starting empty");
                let err = CommentError::Persistence {
                    key: self.key.clone(),
                    source: Arc::new(source),
                };
                (Vec::new(), LoadReport::Recovered(err))
            }
        };

        tracing::debug!(scope = %self.scope, count = records.len(), "comments loaded");
        self.records = records;
        report
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The canonical, unfiltered list
    pub fn records(&self) -> &[CommentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CommentRecord> {
        self.records.get(index)
    }

    pub fn edit_target(&self) -> Option<usize> {
        self.edit_target
    }

    /// The active search keyword, if any
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Append a new comment. The receipt's value is the new record's index.
    pub fn add(
        &mut self,
        text: &str,
        location: Option<Location>,
        photo: Option<PhotoRef>,
    ) -> Result<WriteReceipt<usize>, CommentError> {
        let record = CommentRecord::new(text, location, photo)?;
        self.records.push(record);
        let index = self.records.len() - 1;
        Ok(self.persist_with(index, None))
    }

    /// Start editing the record at `index`; returns its text for pre-filling input
    pub fn begin_edit(&mut self, index: usize) -> Result<&str, CommentError> {
        self.check_index(index)?;
        self.edit_target = Some(index);
        Ok(&self.records[index].text)
    }

    /// Replace the text, timestamp and location of the record being edited.
    ///
    /// The photo is kept. On empty text the edit stays open so the user can retry.
    pub fn commit_edit(
        &mut self,
        text: &str,
        location: Option<Location>,
    ) -> Result<WriteReceipt<usize>, CommentError> {
        let index = self.edit_target.ok_or(CommentError::NoEditInProgress)?;
        let text = validate_text(text)?;

        let record = &mut self.records[index];
        record.text = text;
        record.created_at = now_stamp();
        record.location = location;
        self.edit_target = None;

        Ok(self.persist_with(index, None))
    }

    pub fn cancel_edit(&mut self) {
        self.edit_target = None;
    }

    /// Remove the record at `index`. The receipt's value is the removed record.
    ///
    /// A photo owned by the record is released after the write; a failed
    /// release shows up on the receipt's report, never as an error here.
    pub fn delete(&mut self, index: usize) -> Result<WriteReceipt<CommentRecord>, CommentError> {
        self.check_index(index)?;
        let removed = self.records.remove(index);

        self.edit_target = match self.edit_target {
            Some(target) if target == index => None,
            Some(target) if target > index => Some(target - 1),
            other => other,
        };

        let release = removed.photo.clone();
        Ok(self.persist_with(removed, release))
    }

    /// Set or replace the photo of the record at `index`
    pub fn attach_photo(
        &mut self,
        index: usize,
        photo: PhotoRef,
    ) -> Result<WriteReceipt<usize>, CommentError> {
        self.check_index(index)?;
        self.records[index].photo = Some(photo);
        Ok(self.persist_with(index, None))
    }

    /// Case-insensitive substring search over comment text.
    ///
    /// An empty or blank keyword clears the filter and returns everything.
    pub fn search(&mut self, keyword: &str) -> Vec<Match<'_>> {
        self.filter = if keyword.trim().is_empty() {
            None
        } else {
            Some(keyword.to_string())
        };
        self.visible()
    }

    /// Drop the active filter and return the full list
    pub fn reset_filter(&mut self) -> Vec<Match<'_>> {
        self.search("")
    }

    /// The records currently shown, under the active filter
    pub fn visible(&self) -> Vec<Match<'_>> {
        let needle = self.filter.as_deref().map(str::to_lowercase);
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| needle.as_deref().map_or(true, |k| record.matches(k)))
            .map(|(index, record)| Match { index, record })
            .collect()
    }

    /// Queue the current list again, e.g. after a reported write failure
    pub fn persist(&self) -> WriteReceipt<()> {
        self.persist_with((), None)
    }

    /// Wait for every queued write; fails if the latest one didn't land
    pub async fn flush(&self) -> Result<(), CommentError> {
        self.writer.flush().await
    }

    fn check_index(&self, index: usize) -> Result<(), CommentError> {
        if index >= self.records.len() {
            return Err(CommentError::Index {
                index,
                len: self.records.len(),
            });
        }
        Ok(())
    }

    fn persist_with<T>(&self, value: T, release: Option<PhotoRef>) -> WriteReceipt<T> {
        match encode_list(&self.records) {
            Ok(payload) => self.writer.submit(value, payload, release),
            Err(source) => WriteReceipt::ready(
                value,
                WriteReport {
                    persisted: Err(CommentError::Persistence {
                        key: self.key.clone(),
                        source: Arc::new(StoreError::Encode(source)),
                    }),
                    asset_release: None,
                },
            ),
        }
    }
}

impl std::fmt::Debug for CommentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentManager")
            .field("scope", &self.scope)
            .field("records", &self.records.len())
            .field("edit_target", &self.edit_target)
            .field("filter", &self.filter)
            .finish()
    }
}
