// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! A persistent binary Merkle tree store: subtrees are written once as a
//! batch of namespaced records on an ordered key/value backend, and served
//! back as lazily materialized node handles indexed by generalized index
//! and root hash.
//!
//! [`Store`] is the facade most callers want. [`Writer`] and [`Reader`] are
//! exposed separately for callers who only need one side. [`MemoryBackend`]
//! is a dependency-free [`Backend`] suitable for tests.

mod backend;
mod error;
mod gindex;
mod key;
mod memory;
mod node;
mod reader;
mod store;
mod value;
mod writer;

pub use backend::{Backend, Batch};
pub use error::{Error, Side};
pub use gindex::Gindex;
pub use memory::MemoryBackend;
pub use node::{getter, setter, summarize_into, Link, Node, NodeHasher, NodeRef, Root};
pub use reader::{Reader, SlottedNode};
pub use store::{Config, Store};
pub use value::Record;
pub use writer::Writer;
