// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::backend::Backend;
use crate::error::Error;
use crate::gindex::Gindex;
use crate::node::{NodeHasher, NodeRef, Root};
use crate::reader::{Reader, SlottedNode};
use crate::writer::Writer;

/// Configuration consumed by [`Store::new`]: the namespace partitioning the
/// shared backend key space, and the backend handle itself.
pub struct Config {
    pub namespace: [u8; 3],
    pub backend: Arc<dyn Backend>,
}

/// Ties a namespace and a backend together behind one `put`/`get`/`has`/
/// `delete`/`range` facade.
pub struct Store {
    backend: Arc<dyn Backend>,
    writer: Writer,
    reader: Reader,
}

impl Store {
    pub fn new(config: Config) -> Self {
        Store {
            backend: config.backend.clone(),
            writer: Writer::new(config.backend.clone(), config.namespace),
            reader: Reader::new(config.backend, config.namespace),
        }
    }

    pub fn put(&self, slot: u64, root: &NodeRef, hasher: &dyn NodeHasher) -> Result<(), Error> {
        self.writer.put(slot, root, hasher)
    }

    pub fn get(&self, gindex: &Gindex, root: &Root) -> Result<SlottedNode, Error> {
        self.reader.get(gindex, root)
    }

    pub fn has(&self, gindex: &Gindex, root: &Root) -> Result<bool, Error> {
        self.reader.has(gindex, root)
    }

    pub fn delete(&self, gindex: &Gindex, root: &Root) -> Result<(), Error> {
        self.reader.delete(gindex, root)
    }

    pub fn range(
        &self,
        start_slot: u64,
        end_slot: u64,
        gindex: &Gindex,
    ) -> Result<Vec<SlottedNode>, Error> {
        self.reader.range(start_slot, end_slot, gindex)
    }

    pub fn close(&self) -> Result<(), Error> {
        self.backend.close()
    }
}
