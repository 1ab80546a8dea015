// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use crate::error::Error;

#[cfg(any(test, feature = "fuzzing"))]
use proptest_derive::Arbitrary;

/// A generalized index: a path of left/right choices from some root.
///
/// Internally represented as the path bits alone (the sentinel bit implied
/// by the bit length is never stored), so `descend` is a slice drop rather
/// than integer bit arithmetic. The empty path is the root (bit length 1).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "fuzzing"), derive(Arbitrary))]
pub struct Gindex {
    #[cfg_attr(
        any(test, feature = "fuzzing"),
        proptest(strategy = "proptest::collection::vec(proptest::prelude::any::<bool>(), 0..=32)")
    )]
    path: Vec<bool>,
}

/// Bit length is capped at 256, i.e. a path of at most 255 direction bits.
const MAX_PATH_BITS: usize = 255;

impl Gindex {
    pub fn root() -> Self {
        Gindex { path: Vec::new() }
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn bit_length(&self) -> usize {
        self.path.len() + 1
    }

    pub fn left_child(&self) -> Result<Gindex, Error> {
        self.extend(false)
    }

    pub fn right_child(&self) -> Result<Gindex, Error> {
        self.extend(true)
    }

    fn extend(&self, bit: bool) -> Result<Gindex, Error> {
        if self.path.len() >= MAX_PATH_BITS {
            return Err(Error::GindexTooLarge);
        }
        let mut path = self.path.clone();
        path.push(bit);
        Ok(Gindex { path })
    }

    /// Splits off the first direction bit (relative to this gindex as root),
    /// returning `(direction, remainder)`. `direction == true` means right.
    pub fn descend(&self) -> Result<(bool, Gindex), Error> {
        if self.path.is_empty() {
            return Err(Error::GindexTooLarge);
        }
        let direction = self.path[0];
        Ok((
            direction,
            Gindex {
                path: self.path[1..].to_vec(),
            },
        ))
    }

    /// Left-aligned big-endian encoding: the sentinel bit followed by the
    /// path bits, packed into `ceil(bit_length / 8)` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let bit_length = self.bit_length();
        let mut bytes = vec![0u8; bit_length.div_ceil(8)];
        set_bit(&mut bytes, 0, true);
        for (i, &bit) in self.path.iter().enumerate() {
            set_bit(&mut bytes, i + 1, bit);
        }
        bytes
    }

    /// Reconstructs a gindex from its stored bit length and left-aligned
    /// big-endian bytes, as found in a persisted key.
    pub fn from_bytes(bit_length: usize, bytes: &[u8]) -> Result<Gindex, Error> {
        if bit_length == 0 || bit_length > 256 {
            return Err(Error::GindexTooLarge);
        }
        let expected_len = bit_length.div_ceil(8);
        if bytes.len() != expected_len {
            return Err(Error::GindexTooLarge);
        }
        let mut path = Vec::with_capacity(bit_length - 1);
        for i in 1..bit_length {
            path.push(get_bit(bytes, i));
        }
        Ok(Gindex { path })
    }
}

fn set_bit(bytes: &mut [u8], index: usize, value: bool) {
    if value {
        bytes[index / 8] |= 0x80 >> (index % 8);
    }
}

fn get_bit(bytes: &[u8], index: usize) -> bool {
    bytes[index / 8] & (0x80 >> (index % 8)) != 0
}
