// Copyright (c) Kanari Network
// SPDX-License-Identifier: Apache-2.0

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;

const LEAF_TAG: u8 = 0x00;
const PAIR_TAG: u8 = 0x01;
const LEAF_LEN: usize = 9;
const PAIR_LEN: usize = 73;

/// A decoded persisted record: either a leaf (whose root lives in the key)
/// or a pair (whose children's roots are the payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Leaf {
        slot: u64,
    },
    Pair {
        slot: u64,
        left_root: [u8; 32],
        right_root: [u8; 32],
    },
}

impl Record {
    pub fn slot(&self) -> u64 {
        match self {
            Record::Leaf { slot } | Record::Pair { slot, .. } => *slot,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Record::Leaf { slot } => {
                let mut out = Vec::with_capacity(LEAF_LEN);
                out.push(LEAF_TAG);
                let mut slot_buf = [0u8; 8];
                LittleEndian::write_u64(&mut slot_buf, *slot);
                out.extend_from_slice(&slot_buf);
                out
            }
            Record::Pair {
                slot,
                left_root,
                right_root,
            } => {
                let mut out = Vec::with_capacity(PAIR_LEN);
                out.push(PAIR_TAG);
                let mut slot_buf = [0u8; 8];
                LittleEndian::write_u64(&mut slot_buf, *slot);
                out.extend_from_slice(&slot_buf);
                out.extend_from_slice(left_root);
                out.extend_from_slice(right_root);
                out
            }
        }
    }

    pub fn decode(key: &[u8], bytes: &[u8]) -> Result<Record, Error> {
        if bytes.len() < LEAF_LEN {
            return Err(Error::corrupt(
                key,
                "value shorter than the minimum leaf record",
                bytes,
            ));
        }
        let tag = bytes[0];
        let slot = LittleEndian::read_u64(&bytes[1..9]);
        match tag {
            LEAF_TAG => {
                if bytes.len() != LEAF_LEN {
                    return Err(Error::corrupt(
                        key,
                        format!(
                            "leaf record must be {LEAF_LEN} bytes, got {}",
                            bytes.len()
                        ),
                        bytes,
                    ));
                }
                Ok(Record::Leaf { slot })
            }
            PAIR_TAG => {
                if bytes.len() != PAIR_LEN {
                    return Err(Error::corrupt(
                        key,
                        format!(
                            "pair record must be {PAIR_LEN} bytes, got {}",
                            bytes.len()
                        ),
                        bytes,
                    ));
                }
                let mut left_root = [0u8; 32];
                left_root.copy_from_slice(&bytes[9..41]);
                let mut right_root = [0u8; 32];
                right_root.copy_from_slice(&bytes[41..73]);
                Ok(Record::Pair {
                    slot,
                    left_root,
                    right_root,
                })
            }
            other => Err(Error::corrupt(
                key,
                format!("unknown record tag 0x{other:02x}"),
                bytes,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_round_trips() {
        let record = Record::Leaf {
            slot: 0x0102030405060708,
        };
        let encoded = record.encode();
        assert_eq!(
            encoded,
            vec![0x00, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(Record::decode(&[], &encoded).unwrap(), record);
    }

    #[test]
    fn pair_round_trips() {
        let record = Record::Pair {
            slot: 1,
            left_root: [0xBB; 32],
            right_root: [0xCC; 32],
        };
        let encoded = record.encode();
        assert_eq!(encoded.len(), PAIR_LEN);
        assert_eq!(Record::decode(&[], &encoded).unwrap(), record);
    }

    #[test]
    fn rejects_unknown_tag() {
        let mut bytes = vec![0x02u8];
        bytes.extend_from_slice(&[0u8; 8]);
        let err = Record::decode(&[0xAB], &bytes).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));
    }

    #[test]
    fn rejects_truncated_value() {
        let err = Record::decode(&[], &[0x00, 0x01]).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));
    }

    #[test]
    fn rejects_pair_with_wrong_length() {
        let mut bytes = vec![0x01u8];
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&[0u8; 10]);
        let err = Record::decode(&[], &bytes).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));
    }
}
