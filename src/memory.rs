// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::backend::{Backend, Batch};
use crate::error::Error;

/// A lock-guarded, ordered in-memory [`Backend`], used throughout this
/// crate's own test suite and available to callers who want a
/// dependency-free store for tests or ephemeral use. Not a production
/// backend recommendation.
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<(), Error> {
        self.inner.write().insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), Error> {
        self.inner.write().remove(key);
        Ok(())
    }

    fn write_batch(&self, batch: Batch) -> Result<(), Error> {
        let mut guard = self.inner.write();
        let (puts, deletes) = batch.into_parts();
        for (key, value) in puts {
            guard.insert(key, value);
        }
        for key in deletes {
            guard.remove(&key);
        }
        Ok(())
    }

    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, Error> {
        Ok(self
            .inner
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let backend = MemoryBackend::new();
        backend.put(b"k".to_vec(), b"v".to_vec()).unwrap();
        assert_eq!(backend.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert!(backend.has(b"k").unwrap());
        assert!(!backend.has(b"missing").unwrap());
    }

    #[test]
    fn prefix_scan_is_ordered_and_bounded() {
        let backend = MemoryBackend::new();
        backend.put(vec![1, 0], vec![0]).unwrap();
        backend.put(vec![1, 1], vec![1]).unwrap();
        backend.put(vec![2, 0], vec![2]).unwrap();
        let scanned = backend.iterate_prefix(&[1]).unwrap();
        assert_eq!(
            scanned,
            vec![(vec![1, 0], vec![0]), (vec![1, 1], vec![1])]
        );
    }

    #[test]
    fn batch_applies_puts_and_deletes_together() {
        let backend = MemoryBackend::new();
        backend.put(b"stale".to_vec(), b"x".to_vec()).unwrap();
        let mut batch = Batch::new();
        batch.put(b"fresh".to_vec(), b"y".to_vec());
        batch.delete(b"stale".to_vec());
        backend.write_batch(batch).unwrap();
        assert_eq!(backend.get(b"fresh").unwrap(), Some(b"y".to_vec()));
        assert_eq!(backend.get(b"stale").unwrap(), None);
    }
}
