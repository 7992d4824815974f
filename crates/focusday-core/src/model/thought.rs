//! Captured thoughts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A thought captured to get it out of the way.
///
/// The capture list is append-only and bulk-clearable; individual entries
/// can be marked reviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    pub id: String,
    pub text: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub reviewed: bool,
}

impl Thought {
    pub fn new(text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("thought-{}-{}", now.timestamp_millis(), uuid::Uuid::new_v4()),
            text: text.into(),
            timestamp: now,
            reviewed: false,
        }
    }
}
