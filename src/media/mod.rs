/// Photo handling module
///
/// This module handles:
/// - Opaque photo references (URIs and inline data URIs)
/// - Best-effort release of photo assets when their comment is deleted

pub mod assets;
pub mod photo;

pub use assets::{AssetReleaser, KeepAssets, MediaDirectory};
pub use photo::{PhotoError, PhotoRef, PhotoSource};
