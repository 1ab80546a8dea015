// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tracing::{debug, trace};

use crate::backend::Backend;
use crate::error::Error;
use crate::gindex::Gindex;
use crate::key;
use crate::node::{Node, NodeRef, Root, VirtualNode};
use crate::value::Record;

/// A node retrieved from the store, tagged with the slot it was inserted
/// under.
pub struct SlottedNode {
    pub slot: u64,
    pub node: NodeRef,
}

/// Point lookups, deletion, and range scans against one namespace of a
/// [`Backend`]. Cheap to clone: holds an `Arc` to the backend plus a
/// 3-byte namespace, and is the handle [`VirtualNode`] closes over to
/// fetch its children lazily.
#[derive(Clone)]
pub struct Reader {
    backend: Arc<dyn Backend>,
    namespace: [u8; 3],
}

impl Reader {
    pub fn new(backend: Arc<dyn Backend>, namespace: [u8; 3]) -> Self {
        Reader { backend, namespace }
    }

    pub fn get(&self, gindex: &Gindex, root: &Root) -> Result<SlottedNode, Error> {
        let key = key::encode(self.namespace, gindex, root);
        trace!(gindex_bits = gindex.bit_length(), "fetching record");
        let value = self
            .backend
            .get(&key)?
            .ok_or_else(|| Error::NotFound(hex::encode(&key)))?;
        let record = Record::decode(&key, &value)?;
        match record {
            Record::Leaf { slot } => Ok(SlottedNode {
                slot,
                node: Node::leaf(*root),
            }),
            Record::Pair {
                slot,
                left_root,
                right_root,
            } => {
                let virt = VirtualNode::new(self.clone(), gindex.clone(), *root, left_root, right_root);
                Ok(SlottedNode {
                    slot,
                    node: std::rc::Rc::new(Node::Virtual(virt)),
                })
            }
        }
    }

    pub fn has(&self, gindex: &Gindex, root: &Root) -> Result<bool, Error> {
        let key = key::encode(self.namespace, gindex, root);
        self.backend.has(&key)
    }

    /// Removes only the single record at `(gindex, root)`. Any subtree it
    /// roots is left in place.
    pub fn delete(&self, gindex: &Gindex, root: &Root) -> Result<(), Error> {
        let key = key::encode(self.namespace, gindex, root);
        trace!(gindex_bits = gindex.bit_length(), "deleting record");
        self.backend.delete(&key)
    }

    pub fn range(
        &self,
        start_slot: u64,
        end_slot: u64,
        gindex: &Gindex,
    ) -> Result<Vec<SlottedNode>, Error> {
        let prefix = key::encode_prefix(self.namespace, gindex);
        trace!(
            gindex_bits = gindex.bit_length(),
            start_slot,
            end_slot,
            "scanning range"
        );
        let entries = self.backend.iterate_prefix(&prefix)?;
        let mut out = Vec::new();
        for (entry_key, value) in entries {
            let record = Record::decode(&entry_key, &value)?;
            let slot = record.slot();
            if slot < start_slot || slot > end_slot {
                continue;
            }
            let root = key::root_from_key(&entry_key)?;
            let node = match record {
                Record::Leaf { .. } => Node::leaf(root),
                Record::Pair {
                    left_root,
                    right_root,
                    ..
                } => {
                    let virt = VirtualNode::new(
                        self.clone(),
                        gindex.clone(),
                        root,
                        left_root,
                        right_root,
                    );
                    std::rc::Rc::new(Node::Virtual(virt))
                }
            };
            out.push(SlottedNode { slot, node });
        }
        debug!(result_count = out.len(), "range scan complete");
        Ok(out)
    }

    /// Fetches just the node at `(gindex, root)`, discarding its slot.
    /// Used by [`VirtualNode`] to resolve children on demand.
    pub(crate) fn fetch_node(&self, gindex: &Gindex, root: &Root) -> Result<NodeRef, Error> {
        Ok(self.get(gindex, root)?.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::value::Record;

    fn namespace() -> [u8; 3] {
        [0x42, 0x30, 0x78]
    }

    #[test]
    fn get_missing_key_is_not_found() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let reader = Reader::new(backend, namespace());
        let err = reader.get(&Gindex::root(), &[0u8; 32]).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn get_decodes_leaf_record() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let root = [0xAA; 32];
        let key = key::encode(namespace(), &Gindex::root(), &root);
        backend.put(key, Record::Leaf { slot: 7 }.encode()).unwrap();
        let reader = Reader::new(backend, namespace());
        let slotted = reader.get(&Gindex::root(), &root).unwrap();
        assert_eq!(slotted.slot, 7);
        assert!(slotted.node.is_leaf());
    }

    #[test]
    fn corrupt_value_is_rejected() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let root = [0xAA; 32];
        let key = key::encode(namespace(), &Gindex::root(), &root);
        backend
            .put(key, vec![0x02, 0, 0, 0, 0, 0, 0, 0, 0])
            .unwrap();
        let reader = Reader::new(backend, namespace());
        let err = reader.get(&Gindex::root(), &root).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));
    }

    #[test]
    fn delete_removes_only_targeted_record() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let root_a = [0xAA; 32];
        let root_b = [0xBB; 32];
        let key_a = key::encode(namespace(), &Gindex::root(), &root_a);
        let key_b = key::encode(namespace(), &Gindex::root(), &root_b);
        backend.put(key_a, Record::Leaf { slot: 1 }.encode()).unwrap();
        backend.put(key_b, Record::Leaf { slot: 2 }.encode()).unwrap();
        let reader = Reader::new(backend, namespace());
        reader.delete(&Gindex::root(), &root_a).unwrap();
        assert!(!reader.has(&Gindex::root(), &root_a).unwrap());
        assert!(reader.has(&Gindex::root(), &root_b).unwrap());
    }
}
