// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTPS GUID used to identify readers and matched writers.

use std::fmt;

/// Entity kinds carried in the last byte of an entity id (RTPS v2.5 Sec.9.3.1.2).
const ENTITYKIND_WRITER_WITH_KEY: u8 = 0x02;
const ENTITYKIND_WRITER_NO_KEY: u8 = 0x03;
const ENTITYKIND_READER_NO_KEY: u8 = 0x04;
pub(crate) const ENTITYKIND_READER_WITH_KEY: u8 = 0x07;
/// Built-in entities set the two high bits of the kind byte.
const ENTITYKIND_BUILTIN_MASK: u8 = 0xC0;

/// 16-byte entity identifier: 12-byte participant prefix + 4-byte entity id.
///
/// Displayed as dotted hex: "01.0f.ac.10.00.00.00.00.00.00.00.01.00.00.01.c2"
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct GUID {
    pub prefix: [u8; 12],
    pub entity_id: [u8; 4],
}

impl GUID {
    pub const fn new(prefix: [u8; 12], entity_id: [u8; 4]) -> Self {
        Self { prefix, entity_id }
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut prefix = [0u8; 12];
        let mut entity_id = [0u8; 4];
        prefix.copy_from_slice(&bytes[0..12]);
        entity_id.copy_from_slice(&bytes[12..16]);
        Self { prefix, entity_id }
    }

    #[must_use]
    pub fn as_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..12].copy_from_slice(&self.prefix);
        bytes[12..16].copy_from_slice(&self.entity_id);
        bytes
    }

    /// Unknown/placeholder identity.
    pub const fn zero() -> Self {
        Self {
            prefix: [0; 12],
            entity_id: [0; 4],
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.prefix.iter().all(|&b| b == 0) && self.entity_id.iter().all(|&b| b == 0)
    }

    /// Entity kind octet, without the built-in marker bits.
    #[must_use]
    pub fn entity_kind(&self) -> u8 {
        self.entity_id[3] & !ENTITYKIND_BUILTIN_MASK
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.entity_id[3] & ENTITYKIND_BUILTIN_MASK == ENTITYKIND_BUILTIN_MASK
    }

    #[must_use]
    pub fn is_writer(&self) -> bool {
        matches!(
            self.entity_kind(),
            ENTITYKIND_WRITER_WITH_KEY | ENTITYKIND_WRITER_NO_KEY
        )
    }

    #[must_use]
    pub fn is_reader(&self) -> bool {
        matches!(
            self.entity_kind(),
            ENTITYKIND_READER_NO_KEY | ENTITYKIND_READER_WITH_KEY
        )
    }
}

impl fmt::Display for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.prefix.iter().chain(self.entity_id.iter()).enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GUID({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_display() {
        let guid = GUID::new([1, 15, 172, 16, 0, 0, 0, 0, 0, 0, 0, 1], [0, 0, 1, 0xc2]);
        assert_eq!(
            guid.to_string(),
            "01.0f.ac.10.00.00.00.00.00.00.00.01.00.00.01.c2"
        );
    }

    #[test]
    fn test_guid_bytes_layout() {
        let orig = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
        let guid = GUID::from_bytes(orig);
        assert_eq!(guid.prefix[11], 12);
        assert_eq!(guid.entity_id, [13, 14, 15, 16]);
        assert_eq!(guid.as_bytes(), orig);
    }

    #[test]
    fn test_guid_entity_kinds() {
        let user_writer = GUID::new([1; 12], [0, 0, 1, 0x02]);
        let user_reader = GUID::new([1; 12], [0, 0, 1, 0x07]);
        let builtin_writer = GUID::new([1; 12], [0, 0, 3, 0xc2]);

        assert!(user_writer.is_writer());
        assert!(!user_writer.is_reader());
        assert!(user_reader.is_reader());
        assert!(builtin_writer.is_writer());
        assert!(builtin_writer.is_builtin());
        assert!(!user_writer.is_builtin());
    }

    #[test]
    fn test_guid_zero() {
        assert!(GUID::zero().is_zero());
        assert!(!GUID::new([1; 12], [0; 4]).is_zero());
    }
}
