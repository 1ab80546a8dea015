// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;
use crate::gindex::Gindex;

pub const NAMESPACE_LEN: usize = 3;
pub const ROOT_LEN: usize = 32;
const BIT_LENGTH_FIELD_LEN: usize = 2;

/// Builds a record key: `namespace ‖ bit_length(u16 LE) ‖ gindex_bytes ‖ root`.
pub fn encode(namespace: [u8; NAMESPACE_LEN], gindex: &Gindex, root: &[u8; ROOT_LEN]) -> Vec<u8> {
    let gindex_bytes = gindex.to_bytes();
    let mut key =
        Vec::with_capacity(NAMESPACE_LEN + BIT_LENGTH_FIELD_LEN + gindex_bytes.len() + ROOT_LEN);
    key.extend_from_slice(&namespace);
    let mut bit_length_buf = [0u8; BIT_LENGTH_FIELD_LEN];
    LittleEndian::write_u16(&mut bit_length_buf, gindex.bit_length() as u16);
    key.extend_from_slice(&bit_length_buf);
    key.extend_from_slice(&gindex_bytes);
    key.extend_from_slice(root);
    key
}

/// Builds the key prefix shared by every root stored at `gindex`, omitting
/// the trailing root hash. Used for range scans.
pub fn encode_prefix(namespace: [u8; NAMESPACE_LEN], gindex: &Gindex) -> Vec<u8> {
    let gindex_bytes = gindex.to_bytes();
    let mut key = Vec::with_capacity(NAMESPACE_LEN + BIT_LENGTH_FIELD_LEN + gindex_bytes.len());
    key.extend_from_slice(&namespace);
    let mut bit_length_buf = [0u8; BIT_LENGTH_FIELD_LEN];
    LittleEndian::write_u16(&mut bit_length_buf, gindex.bit_length() as u16);
    key.extend_from_slice(&bit_length_buf);
    key.extend_from_slice(&gindex_bytes);
    key
}

/// Recovers the 32-byte node root from a well-formed key's trailing bytes.
pub fn root_from_key(key: &[u8]) -> Result<[u8; ROOT_LEN], Error> {
    if key.len() < ROOT_LEN {
        return Err(Error::corrupt(key, "key shorter than a root hash", &[]));
    }
    let mut root = [0u8; ROOT_LEN];
    root.copy_from_slice(&key[key.len() - ROOT_LEN..]);
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leaf_key_matches_worked_example() {
        let namespace = [0x42, 0x30, 0x78];
        let root = [0xAA; 32];
        let key = encode(namespace, &Gindex::root(), &root);
        let mut expected = vec![0x42, 0x30, 0x78, 0x01, 0x00, 0x80];
        expected.extend_from_slice(&[0xAA; 32]);
        assert_eq!(key, expected);
    }

    #[test]
    fn leaf_child_keys_match_root_only_pair_example() {
        let namespace = [0x42, 0x30, 0x78];
        let left_gindex = Gindex::root().left_child().unwrap();
        let right_gindex = Gindex::root().right_child().unwrap();
        let left_key = encode(namespace, &left_gindex, &[0xBB; 32]);
        let right_key = encode(namespace, &right_gindex, &[0xCC; 32]);
        assert_eq!(&left_key[3..6], &[0x02, 0x00, 0x80]);
        assert_eq!(&right_key[3..6], &[0x02, 0x00, 0xC0]);
    }

    #[test]
    fn key_length_matches_formula() {
        let namespace = [0u8; 3];
        let mut g = Gindex::root();
        for _ in 0..9 {
            g = g.left_child().unwrap();
        }
        let key = encode(namespace, &g, &[0u8; 32]);
        let expected_len = 5 + g.bit_length().div_ceil(8) + 32;
        assert_eq!(key.len(), expected_len);
    }
}
