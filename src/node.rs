// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{Error, Side};
use crate::gindex::Gindex;
use crate::reader::Reader;

pub type Root = [u8; 32];

/// A shared handle to a [`Node`]. Children are always held behind this type
/// so a pair node's children and a virtual node's cached children share one
/// representation.
pub type NodeRef = Rc<Node>;

/// Computes the root of an interior node from its two children's roots.
/// Supplied by the caller; this crate has no opinion on the hash function.
pub trait NodeHasher {
    fn hash_pair(&self, left: &Root, right: &Root) -> Root;
}

/// The host's tree-node capability set: a leaf, an in-memory pair, or a
/// lazily materialized pair backed by the store. Callers build input trees
/// out of `Node::leaf`/`Node::pair`; `Reader::get` returns a mix of `Leaf`
/// and `Virtual` nodes.
pub enum Node {
    Leaf(Root),
    Pair(PairNode),
    Virtual(VirtualNode),
}

impl Node {
    pub fn leaf(root: Root) -> NodeRef {
        Rc::new(Node::Leaf(root))
    }

    pub fn pair(left: NodeRef, right: NodeRef) -> NodeRef {
        Rc::new(Node::Pair(PairNode::new(left, right)))
    }

    pub fn merkle_root(&self, hasher: &dyn NodeHasher) -> Root {
        match self {
            Node::Leaf(root) => *root,
            Node::Pair(pair) => pair.merkle_root(hasher),
            Node::Virtual(virt) => virt.merkle_root(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn left(&self) -> Result<NodeRef, Error> {
        match self {
            Node::Leaf(_) => Err(Error::child(
                Side::Left,
                Error::NotFound("leaf node has no children".to_string()),
            )),
            Node::Pair(pair) => Ok(pair.left.clone()),
            Node::Virtual(virt) => virt.left(),
        }
    }

    pub fn right(&self) -> Result<NodeRef, Error> {
        match self {
            Node::Leaf(_) => Err(Error::child(
                Side::Right,
                Error::NotFound("leaf node has no children".to_string()),
            )),
            Node::Pair(pair) => Ok(pair.right.clone()),
            Node::Virtual(virt) => virt.right(),
        }
    }

    pub fn rebind_left(&self, new_left: NodeRef) -> Result<NodeRef, Error> {
        let right = self.right()?;
        Ok(Node::pair(new_left, right))
    }

    pub fn rebind_right(&self, new_right: NodeRef) -> Result<NodeRef, Error> {
        let left = self.left()?;
        Ok(Node::pair(left, new_right))
    }

    /// Force-loads every child reachable from this node, recursively,
    /// dropping each virtual node's store reference along the way. A
    /// fully detached subtree resolves `left()`/`right()` without the
    /// backend, even after the backend is closed.
    pub fn detach(&self) -> Result<(), Error> {
        match self {
            Node::Leaf(_) => Ok(()),
            Node::Pair(pair) => {
                pair.left.detach()?;
                pair.right.detach()?;
                Ok(())
            }
            Node::Virtual(virt) => virt.detach(),
        }
    }
}

pub struct PairNode {
    left: NodeRef,
    right: NodeRef,
    cached_root: Cell<Option<Root>>,
}

impl PairNode {
    pub fn new(left: NodeRef, right: NodeRef) -> Self {
        PairNode {
            left,
            right,
            cached_root: Cell::new(None),
        }
    }

    fn merkle_root(&self, hasher: &dyn NodeHasher) -> Root {
        if let Some(root) = self.cached_root.get() {
            return root;
        }
        let left_root = self.left.merkle_root(hasher);
        let right_root = self.right.merkle_root(hasher);
        let root = hasher.hash_pair(&left_root, &right_root);
        self.cached_root.set(Some(root));
        root
    }
}

/// A pair node whose children are fetched from the store on first access
/// and cached thereafter. Not `Sync`: cache mutation is single-owner, per
/// this crate's synchronous, lock-free concurrency model.
pub struct VirtualNode {
    reader: RefCell<Option<Reader>>,
    gindex: Gindex,
    root: Root,
    left_root: Root,
    right_root: Root,
    left_cache: RefCell<Option<NodeRef>>,
    right_cache: RefCell<Option<NodeRef>>,
}

impl VirtualNode {
    pub(crate) fn new(
        reader: Reader,
        gindex: Gindex,
        root: Root,
        left_root: Root,
        right_root: Root,
    ) -> Self {
        VirtualNode {
            reader: RefCell::new(Some(reader)),
            gindex,
            root,
            left_root,
            right_root,
            left_cache: RefCell::new(None),
            right_cache: RefCell::new(None),
        }
    }

    pub fn merkle_root(&self) -> Root {
        self.root
    }

    pub fn left(&self) -> Result<NodeRef, Error> {
        if let Some(cached) = self.left_cache.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let reader = self.active_reader(Side::Left)?;
        let child_gindex = self
            .gindex
            .left_child()
            .map_err(|e| Error::child(Side::Left, e))?;
        let node = reader
            .fetch_node(&child_gindex, &self.left_root)
            .map_err(|e| Error::child(Side::Left, e))?;
        *self.left_cache.borrow_mut() = Some(node.clone());
        self.release_reader_if_fully_cached();
        Ok(node)
    }

    pub fn right(&self) -> Result<NodeRef, Error> {
        if let Some(cached) = self.right_cache.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let reader = self.active_reader(Side::Right)?;
        let child_gindex = self
            .gindex
            .right_child()
            .map_err(|e| Error::child(Side::Right, e))?;
        let node = reader
            .fetch_node(&child_gindex, &self.right_root)
            .map_err(|e| Error::child(Side::Right, e))?;
        *self.right_cache.borrow_mut() = Some(node.clone());
        self.release_reader_if_fully_cached();
        Ok(node)
    }

    fn active_reader(&self, side: Side) -> Result<Reader, Error> {
        self.reader.borrow().clone().ok_or_else(|| {
            Error::child(
                side,
                Error::NotFound("store reference released before both children were cached"
                    .to_string()),
            )
        })
    }

    fn release_reader_if_fully_cached(&self) {
        if self.left_cache.borrow().is_some() && self.right_cache.borrow().is_some() {
            *self.reader.borrow_mut() = None;
        }
    }

    pub fn detach(&self) -> Result<(), Error> {
        let left = self.left()?;
        let right = self.right()?;
        left.detach()?;
        right.detach()
    }
}

/// Resolves the subtree reachable from `node` by following `target`
/// (interpreted relative to `node` as gindex root), per the host's generic
/// getter contract.
pub fn getter(node: &NodeRef, target: &Gindex) -> Result<NodeRef, Error> {
    if target.is_root() {
        return Ok(node.clone());
    }
    let (right, rest) = target.descend()?;
    let child = if right { node.right()? } else { node.left()? };
    getter(&child, &rest)
}

/// A deferred rebind: given a replacement node for the position `target`
/// was resolved against, produces the resulting tree rooted at the
/// original node.
pub type Link = Box<dyn FnOnce(NodeRef) -> Result<NodeRef, Error>>;

/// Builds the link for replacing the subtree at `target` (relative to
/// `node`). `expand` is accepted for interface parity with hosts whose
/// trees can synthesize placeholder nodes; this crate's leaf/pair nodes
/// have no such placeholder, so it does not change behavior here.
pub fn setter(node: NodeRef, target: &Gindex, _expand: bool) -> Result<Link, Error> {
    if target.is_root() {
        return Ok(Box::new(Ok));
    }
    let (right, rest) = target.descend()?;
    if rest.is_root() {
        return Ok(Box::new(move |replacement| {
            if right {
                node.rebind_right(replacement)
            } else {
                node.rebind_left(replacement)
            }
        }));
    }
    let child = if right { node.right()? } else { node.left()? };
    let inner = setter(child, &rest, _expand)?;
    Ok(Box::new(move |replacement| {
        let new_child = inner(replacement)?;
        if right {
            node.rebind_right(new_child)
        } else {
            node.rebind_left(new_child)
        }
    }))
}

/// Computes the merkle root of the subtree at `target` (relative to
/// `node`), per the host's generic subtree-summarization contract.
pub fn summarize_into(
    node: &NodeRef,
    target: &Gindex,
    hasher: &dyn NodeHasher,
) -> Result<Root, Error> {
    let subtree = getter(node, target)?;
    Ok(subtree.merkle_root(hasher))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConcatHasher;

    impl NodeHasher for ConcatHasher {
        fn hash_pair(&self, left: &Root, right: &Root) -> Root {
            let mut out = [0u8; 32];
            for i in 0..32 {
                out[i] = left[i] ^ right[i];
            }
            out
        }
    }

    #[test]
    fn pair_root_is_cached() {
        let hasher = ConcatHasher;
        let left = Node::leaf([0xBB; 32]);
        let right = Node::leaf([0xCC; 32]);
        let pair = Node::pair(left, right);
        let first = pair.merkle_root(&hasher);
        let second = pair.merkle_root(&hasher);
        assert_eq!(first, second);
    }

    #[test]
    fn getter_at_root_returns_self() {
        let node = Node::pair(Node::leaf([1; 32]), Node::leaf([2; 32]));
        let resolved = getter(&node, &Gindex::root()).unwrap();
        assert!(matches!(*resolved, Node::Pair(_)));
    }

    #[test]
    fn getter_descends_to_leaf() {
        let node = Node::pair(Node::leaf([1; 32]), Node::leaf([2; 32]));
        let left_gindex = Gindex::root().left_child().unwrap();
        let resolved = getter(&node, &left_gindex).unwrap();
        assert_eq!(resolved.merkle_root(&ConcatHasher), [1; 32]);
    }

    #[test]
    fn setter_rebinds_direct_child() {
        let node = Node::pair(Node::leaf([1; 32]), Node::leaf([2; 32]));
        let left_gindex = Gindex::root().left_child().unwrap();
        let link = setter(node, &left_gindex, false).unwrap();
        let replaced = link(Node::leaf([9; 32])).unwrap();
        assert_eq!(replaced.left().unwrap().merkle_root(&ConcatHasher), [9; 32]);
        assert_eq!(
            replaced.right().unwrap().merkle_root(&ConcatHasher),
            [2; 32]
        );
    }

    #[test]
    fn leaf_has_no_children() {
        let node = Node::leaf([1; 32]);
        assert!(node.left().is_err());
        assert!(node.right().is_err());
    }
}
