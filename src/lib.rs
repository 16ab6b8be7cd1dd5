/// Wildlife sightings journal.
///
/// Comments on catalog animals (or on the user's own profile list), each
/// optionally tagged with where it was made and a photo. Lists are kept in
/// memory by a [`CommentManager`] per scope and written behind to a
/// [`KeyValueStore`].

pub mod catalog;
pub mod config;
pub mod device;
pub mod journal;
pub mod logging;
pub mod media;
pub mod state;

pub use journal::Journal;
pub use state::{CommentError, CommentManager, CommentRecord, KeyValueStore, Location, Scope};
