/// Shared data structures for the comment state
///
/// These structs represent the data model that flows between
/// the key-value store and the presentation layer. Field names on the
/// wire (`text`, `time`, `location`, `image`) are kept stable so lists
/// written by earlier versions keep loading.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::CommentError;
use crate::media::PhotoRef;

/// Display format for record timestamps, e.g. "2024-05-18 14:03:09"
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage key of the global profile list
pub const PROFILE_KEY: &str = "profile_comments";

/// Prefix of per-item storage keys
pub const ITEM_KEY_PREFIX: &str = "comments_";

/// Which independent comment list an operation targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Comments on one catalog item (e.g. "discover-3")
    Item(String),
    /// The single global profile list
    Profile,
}

impl Scope {
    pub fn item(id: impl Into<String>) -> Self {
        Scope::Item(id.into())
    }

    /// Key this scope's list is stored under
    pub fn storage_key(&self) -> String {
        match self {
            Scope::Item(id) => format!("{ITEM_KEY_PREFIX}{id}"),
            Scope::Profile => PROFILE_KEY.to_string(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Item(id) => write!(f, "item {id}"),
            Scope::Profile => f.write_str("profile"),
        }
    }
}

/// Geographic coordinates of a capture.
///
/// Any additional fields reported by the device (altitude, accuracy,
/// heading, ...) are kept in `extra` and written back untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Coords {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Coords {
    /// Validated coordinates with no extra metadata
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CommentError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CommentError::Validation(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CommentError::Validation(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            extra: Map::new(),
        })
    }
}

/// A resolved device location, as handed over by the geolocation provider
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Location {
    pub coords: Coords,
    /// Capture metadata (timestamp, mocked, ...) preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CommentError> {
        Ok(Self {
            coords: Coords::new(latitude, longitude)?,
            extra: Map::new(),
        })
    }
}

/// One user comment with optional location and photo
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommentRecord {
    /// Comment body, never empty, stored trimmed
    pub text: String,
    /// Local time of creation or last edit, formatted with [`TIME_FORMAT`]
    #[serde(rename = "time")]
    pub created_at: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(rename = "image", default)]
    pub photo: Option<PhotoRef>,
}

impl CommentRecord {
    /// Create a record stamped with the current local time.
    /// Fails if `text` is empty after trimming.
    pub fn new(
        text: &str,
        location: Option<Location>,
        photo: Option<PhotoRef>,
    ) -> Result<Self, CommentError> {
        Ok(Self {
            text: validate_text(text)?,
            created_at: now_stamp(),
            location,
            photo,
        })
    }

    /// Case-insensitive substring match on the text
    pub fn matches(&self, keyword_lower: &str) -> bool {
        self.text.to_lowercase().contains(keyword_lower)
    }

    /// Text message for sharing this sighting.
    /// Only records with a location can be shared.
    pub fn share_message(&self) -> Option<String> {
        let coords = &self.location.as_ref()?.coords;
        Some(format!(
            "Comment: {}\nTime: {}\nLocation: {}, {}",
            self.text, self.created_at, coords.latitude, coords.longitude
        ))
    }
}

/// Trim and reject empty comment text
pub fn validate_text(text: &str) -> Result<String, CommentError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CommentError::Validation(
            "comment cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Current local time in [`TIME_FORMAT`]
pub fn now_stamp() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}

/// Convert a list to JSON for storage
pub fn encode_list(records: &[CommentRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

/// Parse a stored list
pub fn decode_list(json: &str) -> Result<Vec<CommentRecord>, serde_json::Error> {
    serde_json::from_str(json)
}
