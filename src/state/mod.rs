/// State management module
///
/// This module handles all comment state, including:
/// - Shared data structures and the JSON wire format (data.rs)
/// - Error types (error.rs)
/// - The key-value store port and in-memory backend (store.rs)
/// - The SQLite backend (library.rs)
/// - Write-behind persistence per scope (write_behind.rs)
/// - The comment record manager (manager.rs)
/// - Snapshot publishing on top of a manager (observable.rs)

pub mod data;
pub mod error;
pub mod library;
pub mod manager;
pub mod observable;
pub mod store;
pub mod write_behind;

pub use data::{CommentRecord, Coords, Location, Scope};
pub use error::{AssetError, CommentError, StoreError};
pub use library::Library;
pub use manager::{CommentManager, LoadReport, Match};
pub use observable::{ObservableManager, Snapshot};
pub use store::{KeyValueStore, MemoryStore};
pub use write_behind::{WriteReceipt, WriteReport};
