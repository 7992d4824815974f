//! Usage analytics log.
//!
//! Analytics are fire-and-forget: recording must never break a state
//! mutation, so persistence failures here are logged and swallowed. The
//! log lives in its own storage entry, loaded and pruned independently of
//! the application state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::session::FocusContext;
use crate::storage::{KvStore, StorageError, ANALYTICS_KEY};

/// Receiver for usage analytics emitted by the core.
pub trait AnalyticsSink {
    /// A focus session ran to completion.
    fn record_focus_completion(&mut self, duration_min: u32, task: &str, context: &FocusContext);

    /// Free-form named event.
    fn record_event(&mut self, name: &str, data: Value);
}

/// Sink that drops everything; for hosts that opt out of analytics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn record_focus_completion(&mut self, _duration_min: u32, _task: &str, _ctx: &FocusContext) {}

    fn record_event(&mut self, _name: &str, _data: Value) {}
}

/// One recorded analytics event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default = "Utc::now")]
    pub at: DateTime<Utc>,
}

/// Key-value-backed analytics log.
pub struct EventLog<S: KvStore> {
    kv: S,
    records: Vec<AnalyticsRecord>,
}

impl<S: KvStore> EventLog<S> {
    /// Open the log, loading whatever is already stored. An unreadable
    /// log starts empty.
    pub fn open(kv: S) -> Self {
        let records = match kv.get(ANALYTICS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "analytics log unreadable, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "analytics load failed, starting empty");
                Vec::new()
            }
        };
        Self { kv, records }
    }

    pub fn records(&self) -> &[AnalyticsRecord] {
        &self.records
    }

    /// Drop records older than `cutoff`; returns how many were removed.
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.at >= cutoff);
        let dropped = before - self.records.len();
        if dropped > 0 {
            self.save();
        }
        dropped
    }

    fn push(&mut self, record: AnalyticsRecord) {
        self.records.push(record);
        self.save();
    }

    fn save(&mut self) {
        let raw = match serde_json::to_string(&self.records) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "analytics serialization failed");
                return;
            }
        };
        if let Err(err) = self.kv.set(ANALYTICS_KEY, &raw) {
            warn!(error = %err, "analytics write failed");
        }
    }
}

impl<S: KvStore> AnalyticsSink for EventLog<S> {
    fn record_focus_completion(&mut self, duration_min: u32, task: &str, context: &FocusContext) {
        let data = serde_json::json!({
            "duration_min": duration_min,
            "task": task,
            "context": context,
        });
        self.push(AnalyticsRecord {
            name: "focus_completed".into(),
            data,
            at: Utc::now(),
        });
    }

    fn record_event(&mut self, name: &str, data: Value) {
        self.push(AnalyticsRecord {
            name: name.into(),
            data,
            at: Utc::now(),
        });
    }
}

/// Prune persisted analytics in place, without an open log.
///
/// Used by the store's storage-recovery path to free space; returns how
/// many records were removed.
pub fn prune_before<S: KvStore>(kv: &S, cutoff: DateTime<Utc>) -> Result<usize, StorageError> {
    let Some(raw) = kv.get(ANALYTICS_KEY)? else {
        return Ok(0);
    };
    let records: Vec<AnalyticsRecord> = serde_json::from_str(&raw).unwrap_or_default();
    let kept: Vec<&AnalyticsRecord> = records.iter().filter(|r| r.at >= cutoff).collect();
    if kept.len() == records.len() {
        return Ok(0);
    }
    let dropped = records.len() - kept.len();
    let raw = serde_json::to_string(&kept)
        .map_err(|err| StorageError::WriteFailed(err.to_string()))?;
    kv.set(ANALYTICS_KEY, &raw)?;
    Ok(dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::EnergyLevel;
    use crate::session::FocusKind;
    use crate::storage::MemoryKv;
    use chrono::Duration;

    fn context() -> FocusContext {
        FocusContext {
            task: "deep work".into(),
            kind: FocusKind::Priority,
            ref_id: "1".into(),
            energy: EnergyLevel::High,
            estimated_duration: Some(25),
        }
    }

    #[test]
    fn completion_is_recorded_and_persisted() {
        let kv = MemoryKv::new();
        let mut log = EventLog::open(kv.clone());
        log.record_focus_completion(25, "deep work", &context());

        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].name, "focus_completed");
        assert_eq!(log.records()[0].data["duration_min"], 25);

        // A fresh handle sees the same records.
        let reopened = EventLog::open(kv);
        assert_eq!(reopened.records(), log.records());
    }

    #[test]
    fn arbitrary_events_are_recorded() {
        let kv = MemoryKv::new();
        let mut log = EventLog::open(kv);
        log.record_event("energy_changed", serde_json::json!({"to": "low"}));
        assert_eq!(log.records()[0].name, "energy_changed");
    }

    #[test]
    fn recording_survives_write_failures() {
        let kv = MemoryKv::with_quota(4);
        let mut log = EventLog::open(kv);
        // The write fails, the in-memory record stays anyway.
        log.record_event("over_quota", Value::Null);
        assert_eq!(log.records().len(), 1);
    }

    #[test]
    fn prune_drops_only_old_records() {
        let kv = MemoryKv::new();
        let stored = vec![
            AnalyticsRecord {
                name: "ancient".into(),
                data: Value::Null,
                at: Utc::now() - Duration::days(45),
            },
            AnalyticsRecord {
                name: "recent".into(),
                data: Value::Null,
                at: Utc::now(),
            },
        ];
        kv.set(ANALYTICS_KEY, &serde_json::to_string(&stored).unwrap())
            .unwrap();

        let mut log = EventLog::open(kv);
        let dropped = log.prune_before(Utc::now() - Duration::days(30));
        assert_eq!(dropped, 1);
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].name, "recent");
    }

    #[test]
    fn standalone_prune_rewrites_the_stored_log() {
        let kv = MemoryKv::new();
        let records = vec![
            AnalyticsRecord {
                name: "old".into(),
                data: Value::Null,
                at: Utc::now() - Duration::days(40),
            },
            AnalyticsRecord {
                name: "new".into(),
                data: Value::Null,
                at: Utc::now(),
            },
        ];
        kv.set(ANALYTICS_KEY, &serde_json::to_string(&records).unwrap())
            .unwrap();

        let dropped = prune_before(&kv, Utc::now() - Duration::days(30)).unwrap();
        assert_eq!(dropped, 1);

        let kept: Vec<AnalyticsRecord> =
            serde_json::from_str(&kv.get(ANALYTICS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "new");
    }

    #[test]
    fn standalone_prune_on_empty_storage_is_a_noop() {
        let kv = MemoryKv::new();
        assert_eq!(prune_before(&kv, Utc::now()).unwrap(), 0);
        assert!(kv.get(ANALYTICS_KEY).unwrap().is_none());
    }
}
