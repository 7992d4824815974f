//! Daily priority slots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::energy::EnergyLevel;

/// One of the three fixed daily top-priority slots.
///
/// Slots are never added or removed, only edited in place; `id` is the
/// slot number (1..=3). `completed_at` is set iff `completed` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    /// Slot number, 1..=3.
    pub id: u8,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub energy: EnergyLevel,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    /// Optional link to an external work item.
    #[serde(default)]
    pub m365_link: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_pattern: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub notes: String,
}

impl Priority {
    /// An empty slot with the given number.
    pub fn empty(id: u8) -> Self {
        Self {
            id,
            text: String::new(),
            completed: false,
            energy: EnergyLevel::default(),
            estimated_minutes: None,
            m365_link: None,
            created_at: Utc::now(),
            completed_at: None,
            is_recurring: false,
            recurring_pattern: None,
            category: String::new(),
            notes: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_keeps_its_number() {
        let p = Priority::empty(2);
        assert_eq!(p.id, 2);
        assert!(p.text.is_empty());
        assert!(!p.completed);
        assert!(p.completed_at.is_none());
    }

    #[test]
    fn decodes_with_missing_fields() {
        let p: Priority = serde_json::from_str("{\"id\": 1}").unwrap();
        assert_eq!(p.id, 1);
        assert_eq!(p.energy, EnergyLevel::Medium);
        assert!(p.notes.is_empty());
    }
}
