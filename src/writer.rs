// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tracing::{debug, trace};

use crate::backend::{Backend, Batch};
use crate::error::{Error, Side};
use crate::gindex::Gindex;
use crate::key;
use crate::node::{NodeHasher, NodeRef, Root};
use crate::value::Record;

/// Recursive batched insertion of a tree, tagging every emitted record with
/// a caller-supplied slot and skipping subtrees that already exist.
pub struct Writer {
    backend: Arc<dyn Backend>,
    namespace: [u8; 3],
}

impl Writer {
    pub fn new(backend: Arc<dyn Backend>, namespace: [u8; 3]) -> Self {
        Writer { backend, namespace }
    }

    /// Persists `root` and every node it reaches, each tagged with `slot`.
    /// Subtrees already present under the same gindex and root are not
    /// re-walked or re-written.
    pub fn put(&self, slot: u64, root: &NodeRef, hasher: &dyn NodeHasher) -> Result<(), Error> {
        let root_gindex = Gindex::root();
        let root_hash = root.merkle_root(hasher);

        if root.is_leaf() {
            let key = key::encode(self.namespace, &root_gindex, &root_hash);
            self.backend.put(key, Record::Leaf { slot }.encode())?;
            debug!(slot, "wrote single leaf record");
            return Ok(());
        }

        let mut batch = Batch::new();
        self.add(&mut batch, slot, &root_gindex, root, root_hash, hasher)?;
        let record_count = batch.puts().len();
        self.backend.write_batch(batch)?;
        debug!(slot, record_count, "committed tree batch");
        Ok(())
    }

    fn add(
        &self,
        batch: &mut Batch,
        slot: u64,
        gindex: &Gindex,
        node: &NodeRef,
        root: Root,
        hasher: &dyn NodeHasher,
    ) -> Result<(), Error> {
        let key = key::encode(self.namespace, gindex, &root);

        if node.is_leaf() {
            batch.put(key, Record::Leaf { slot }.encode());
            return Ok(());
        }

        let left = node
            .left()
            .map_err(|e| Error::child(Side::Left, e))?;
        let right = node
            .right()
            .map_err(|e| Error::child(Side::Right, e))?;
        let left_root = left.merkle_root(hasher);
        let right_root = right.merkle_root(hasher);
        batch.put(
            key,
            Record::Pair {
                slot,
                left_root,
                right_root,
            }
            .encode(),
        );

        self.add_child(batch, slot, gindex, Side::Left, &left, left_root, hasher)?;
        self.add_child(batch, slot, gindex, Side::Right, &right, right_root, hasher)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn add_child(
        &self,
        batch: &mut Batch,
        slot: u64,
        parent_gindex: &Gindex,
        side: Side,
        child: &NodeRef,
        child_root: Root,
        hasher: &dyn NodeHasher,
    ) -> Result<(), Error> {
        let child_gindex = match side {
            Side::Left => parent_gindex.left_child()?,
            Side::Right => parent_gindex.right_child()?,
        };
        let child_key = key::encode(self.namespace, &child_gindex, &child_root);
        if self.backend.has(&child_key)? {
            trace!(?side, "skipping already-persisted subtree");
            return Ok(());
        }
        self.add(batch, slot, &child_gindex, child, child_root, hasher)
    }
}
