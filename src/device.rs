/// Geolocation boundary.
///
/// The presentation layer resolves a location *before* calling the comment
/// manager; the manager itself never touches device APIs.

use async_trait::async_trait;
use thiserror::Error;

use crate::state::Location;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Device geolocation service
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_permission(&self) -> Permission;

    async fn current_position(&self) -> Result<Location, LocationError>;
}

/// Ask for permission, then the current position.
///
/// Denial and capture failures are logged and yield `None`, so the comment
/// is saved without a location instead of failing.
pub async fn resolve_location(provider: &dyn LocationProvider) -> Option<Location> {
    if provider.request_permission().await != Permission::Granted {
        tracing::debug!("location permission not granted, saving without location");
        return None;
    }
    match provider.current_position().await {
        Ok(location) => Some(location),
        Err(e) => {
            tracing::warn!(error = %e, "failed to get current position");
            None
        }
    }
}

/// Provider that always reports the same position
#[derive(Debug, Clone)]
pub struct FixedLocation(pub Location);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<Location, LocationError> {
        Ok(self.0.clone())
    }
}

/// Provider for hosts without positioning; permission is always denied
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn request_permission(&self) -> Permission {
        Permission::Denied
    }

    async fn current_position(&self) -> Result<Location, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenGps;

    #[async_trait]
    impl LocationProvider for BrokenGps {
        async fn request_permission(&self) -> Permission {
            Permission::Granted
        }

        async fn current_position(&self) -> Result<Location, LocationError> {
            Err(LocationError::Unavailable("no fix".to_string()))
        }
    }

    #[tokio::test]
    async fn test_granted() {
        let here = Location::new(52.52, 13.40).unwrap();
        let resolved = resolve_location(&FixedLocation(here.clone())).await;
        assert_eq!(resolved, Some(here));
    }

    #[tokio::test]
    async fn test_denied() {
        assert_eq!(resolve_location(&NoLocation).await, None);
    }

    #[tokio::test]
    async fn test_capture_failure() {
        assert_eq!(resolve_location(&BrokenGps).await, None);
    }
}
