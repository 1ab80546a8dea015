// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use thiserror::Error;

/// Errors surfaced by this crate's key codec, writer, reader, and virtual-node
/// traversal. Every fallible public operation returns `Result<T, Error>`.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying key/value backend failed.
    #[error("backend error")]
    Backend(#[source] anyhow::Error),

    /// No record exists at the requested key.
    #[error("no record found for key 0x{0}")]
    NotFound(String),

    /// A stored value could not be decoded as a leaf or pair record.
    #[error("corrupt record at key 0x{key}: {detail} (value: 0x{value_hex})")]
    CorruptRecord {
        key: String,
        detail: String,
        value_hex: String,
    },

    /// A tree deeper than 256 levels was passed to the writer, or a gindex
    /// navigation step would exceed that bound.
    #[error("generalized index exceeds the maximum supported bit length of 256")]
    GindexTooLarge,

    /// A host tree node's `left()`/`right()` failed while walking the tree.
    #[error("failed to resolve {side} child")]
    ChildResolution {
        side: Side,
        #[source]
        source: Box<Error>,
    },

    /// The operation is not supported by this backend.
    #[error("operation not implemented")]
    NotImplemented,
}

/// Which side of a pair node a `ChildResolution` error occurred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

impl Error {
    pub(crate) fn child(side: Side, source: Error) -> Error {
        Error::ChildResolution {
            side,
            source: Box::new(source),
        }
    }

    pub(crate) fn corrupt(key: &[u8], detail: impl Into<String>, value: &[u8]) -> Error {
        Error::CorruptRecord {
            key: hex::encode(key),
            detail: detail.into(),
            value_hex: hex::encode(value),
        }
    }
}
