// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use crate::error::Error;

/// A batch of writes applied atomically by [`Backend::write_batch`].
#[derive(Debug, Default, Clone)]
pub struct Batch {
    puts: Vec<(Vec<u8>, Vec<u8>)>,
    deletes: Vec<Vec<u8>>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.puts.push((key, value));
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.deletes.push(key);
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }

    pub fn puts(&self) -> &[(Vec<u8>, Vec<u8>)] {
        &self.puts
    }

    pub fn deletes(&self) -> &[Vec<u8>] {
        &self.deletes
    }

    pub fn into_parts(self) -> (Vec<(Vec<u8>, Vec<u8>)>, Vec<Vec<u8>>) {
        (self.puts, self.deletes)
    }
}

/// The ordered key/value store this engine is generic over.
///
/// Implementations are expected to be safe for concurrent `get`/`has`/
/// `iterate_prefix` from multiple callers and to serialize writes
/// internally; the engine itself holds no locks around backend calls.
pub trait Backend: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error>;

    /// Default implementation in terms of `get`; backends with a cheaper
    /// existence check (e.g. a bloom filter) should override this.
    fn has(&self, key: &[u8]) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<(), Error>;

    /// Removes a single record. Does not cascade to any subtree it roots.
    fn delete(&self, key: &[u8]) -> Result<(), Error>;

    /// Applies every put and delete in `batch` atomically.
    fn write_batch(&self, batch: Batch) -> Result<(), Error>;

    /// Ordered scan of every key beginning with `prefix`.
    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, Error>;

    fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}
