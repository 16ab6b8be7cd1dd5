use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::photo::{PhotoRef, PhotoSource};
use crate::state::error::AssetError;

/// Releases the device asset behind a photo reference.
///
/// Called after a comment owning the photo is deleted. Failures are
/// reported to the caller but never block the delete.
#[async_trait]
pub trait AssetReleaser: Send + Sync {
    async fn release(&self, photo: &PhotoRef) -> Result<(), AssetError>;
}

/// Photos saved by this app live under one media directory.
/// Only files inside it are ever removed.
#[derive(Debug, Clone)]
pub struct MediaDirectory {
    root: PathBuf,
}

impl MediaDirectory {
    /// A relative `root` is anchored to the current directory, so stored
    /// references stay valid when the process later runs from elsewhere.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: anchored(root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy an image into the media directory and return a reference to the copy
    pub async fn import(&self, source: &Path) -> Result<PhotoRef, AssetError> {
        fs::create_dir_all(&self.root).await?;
        let filename = source
            .file_name()
            .ok_or_else(|| AssetError::NotReleasable(source.display().to_string()))?;
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S%3f");
        let target = self
            .root
            .join(format!("{stamp}-{}", filename.to_string_lossy()));
        fs::copy(source, &target).await?;
        Ok(PhotoRef::file(target))
    }

    fn contains(&self, path: &Path) -> bool {
        // Compare lexically; the file may already be gone so canonicalize can't be used
        !path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
            && path.starts_with(&self.root)
    }
}

/// Absolute form of `root` with `.` and `..` folded away
fn anchored(root: PathBuf) -> PathBuf {
    let Ok(absolute) = std::path::absolute(&root) else {
        return root;
    };
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[async_trait]
impl AssetReleaser for MediaDirectory {
    async fn release(&self, photo: &PhotoRef) -> Result<(), AssetError> {
        match photo.source() {
            PhotoSource::Inline { .. } => Ok(()),
            PhotoSource::File(path) => {
                let path = std::path::absolute(&path).unwrap_or(path);
                if !self.contains(&path) {
                    return Err(AssetError::OutsideMediaDir(path));
                }
                match fs::remove_file(&path).await {
                    Ok(()) => {
                        tracing::debug!(path = %path.display(), "released photo asset");
                        Ok(())
                    }
                    // Already gone counts as released
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(e.into()),
                }
            }
            PhotoSource::Remote(uri) => Err(AssetError::NotReleasable(uri.to_string())),
        }
    }
}

/// Releaser for hosts without managed media; every release is a no-op
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAssets;

#[async_trait]
impl AssetReleaser for KeepAssets {
    async fn release(&self, _photo: &PhotoRef) -> Result<(), AssetError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_release_file_inside_media_dir() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaDirectory::new(dir.path());
        let file = dir.path().join("fox.jpg");
        std::fs::write(&file, b"jpeg").unwrap();

        media.release(&PhotoRef::file(&file)).await.unwrap();
        assert!(!file.exists());

        // Second release of a missing file is fine
        media.release(&PhotoRef::file(&file)).await.unwrap();
    }

    #[tokio::test]
    async fn test_release_refuses_outside_files() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let media = MediaDirectory::new(dir.path());
        let file = other.path().join("panda.jpg");
        std::fs::write(&file, b"jpeg").unwrap();

        let err = media.release(&PhotoRef::file(&file)).await.unwrap_err();
        assert!(matches!(err, AssetError::OutsideMediaDir(_)));
        assert!(file.exists());

        let sneaky = dir.path().join("..").join("panda.jpg");
        let err = media.release(&PhotoRef::file(&sneaky)).await.unwrap_err();
        assert!(matches!(err, AssetError::OutsideMediaDir(_)));
    }

    #[tokio::test]
    async fn test_release_remote_and_inline() {
        let media = MediaDirectory::new("/nonexistent/media");

        let err = media.release(&PhotoRef::from("ph://ABC")).await.unwrap_err();
        assert!(matches!(err, AssetError::NotReleasable(_)));

        media
            .release(&PhotoRef::from("data:image/png;base64,AAAA"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_import_copies_into_media_dir() {
        let media_root = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("sparrow.png");
        std::fs::write(&src, b"png").unwrap();

        let media = MediaDirectory::new(media_root.path().join("media"));
        let photo = media.import(&src).await.unwrap();

        let PhotoSource::File(path) = photo.source() else {
            panic!("expected a file reference, got {photo}");
        };
        assert!(path.starts_with(media.root()));
        assert_eq!(std::fs::read(&path).unwrap(), b"png");
        assert!(src.exists());
    }

    #[test]
    fn test_relative_root_is_anchored() {
        let cwd = std::env::current_dir().unwrap();
        let media = MediaDirectory::new("data/./media");
        assert_eq!(media.root(), cwd.join("data").join("media"));

        let media = MediaDirectory::new("data/../media");
        assert_eq!(media.root(), cwd.join("media"));
    }

    #[tokio::test]
    async fn test_import_into_relative_root_stores_absolute_ref() {
        let base = tempfile::tempdir_in(".").unwrap();
        assert!(base.path().is_relative());
        let src = base.path().join("fox.png");
        std::fs::write(&src, b"png").unwrap();

        let media = MediaDirectory::new(base.path().join("media"));
        let photo = media.import(&src).await.unwrap();
        let PhotoSource::File(path) = photo.source() else {
            panic!("expected a file reference, got {photo}");
        };
        assert!(path.is_absolute());
        assert!(path.exists());

        // A directory opened from the absolute location finds and removes the copy
        let absolute_root = std::env::current_dir().unwrap().join(base.path()).join("media");
        MediaDirectory::new(absolute_root)
            .release(&photo)
            .await
            .unwrap();
        assert!(!path.exists());
    }
}
