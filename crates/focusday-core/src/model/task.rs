//! Ad-hoc tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::energy::EnergyLevel;

/// A user-created task, distinct from the three priority slots.
///
/// Ids are generated at creation and never reused. `completed_at` is set
/// iff `completed` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Task text
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub energy: EnergyLevel,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
}

impl Task {
    /// Create a new task with a fresh id.
    pub fn new(text: impl Into<String>, energy: EnergyLevel) -> Self {
        let now = Utc::now();
        Self {
            id: format!("task-{}-{}", now.timestamp_millis(), uuid::Uuid::new_v4()),
            text: text.into(),
            completed: false,
            energy,
            created_at: now,
            completed_at: None,
            estimated_minutes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_defaults() {
        let task = Task::new("Write report", EnergyLevel::High);
        assert_eq!(task.text, "Write report");
        assert_eq!(task.energy, EnergyLevel::High);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert!(task.estimated_minutes.is_none());
        assert!(task.id.starts_with("task-"));
    }

    #[test]
    fn ids_are_unique() {
        let a = Task::new("a", EnergyLevel::Low);
        let b = Task::new("a", EnergyLevel::Low);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serde_roundtrip() {
        let task = Task::new("roundtrip", EnergyLevel::Medium);
        let json = serde_json::to_string(&task).unwrap();
        let decoded: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, task);
    }
}
