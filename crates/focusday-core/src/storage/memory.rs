//! In-memory key-value storage.
//!
//! Backs tests and the degraded no-persistence mode. An optional byte
//! quota makes the out-of-space path exercisable.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{KvStore, StorageError};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

/// HashMap-backed key-value store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails with `QuotaExceeded` once the combined size of
    /// all keys and values would pass `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let kv = Self::new();
        kv.inner.borrow_mut().quota_bytes = Some(bytes);
        kv
    }

    /// Change the quota of an existing store (tests simulate storage
    /// filling up mid-session this way).
    pub fn set_quota(&self, bytes: Option<usize>) {
        self.inner.borrow_mut().quota_bytes = bytes;
    }

    /// Combined size of all stored keys and values in bytes.
    pub fn used_bytes(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.borrow().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(quota) = inner.quota_bytes {
            let others: usize = inner
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_is_none() {
        let kv = MemoryKv::new();
        assert!(kv.get("state").unwrap().is_none());
    }

    #[test]
    fn set_then_get() {
        let kv = MemoryKv::new();
        kv.set("state", "value").unwrap();
        assert_eq!(kv.get("state").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn clones_share_entries() {
        let kv = MemoryKv::new();
        let other = kv.clone();
        kv.set("state", "shared").unwrap();
        assert_eq!(other.get("state").unwrap().as_deref(), Some("shared"));
    }

    #[test]
    fn quota_rejects_oversized_writes() {
        let kv = MemoryKv::with_quota(16);
        kv.set("k", "0123456789").unwrap();
        let err = kv.set("other", "0123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded));
        // The original entry is untouched.
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("0123456789"));
    }

    #[test]
    fn quota_counts_replacement_not_double() {
        let kv = MemoryKv::with_quota(16);
        kv.set("k", "0123456789").unwrap();
        // Replacing the same key with a same-sized value stays in quota.
        kv.set("k", "abcdefghij").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("abcdefghij"));
    }
}
