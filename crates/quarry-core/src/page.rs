// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A position-independent reference into the pak's segment space.
///
/// A `PagePtr` is the coordinate `(segment index, byte offset)` rather than
/// a memory address. Pointer-typed fields inside built chunks hold this
/// encoding until the runtime loader patches them to real addresses, guided
/// by the relocation table.
///
/// The null pointer is the distinguished sentinel with segment `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct PagePtr {
    /// The index of the segment this pointer targets, or `-1` for null.
    pub segment: i32,
    /// The byte offset within the target segment.
    pub offset: u32,
}

impl PagePtr {
    /// The byte size of the encoded form. String-typed table cells occupy
    /// exactly this many bytes in row data.
    pub const SIZE: usize = 8;

    /// The distinguished null pointer.
    pub const NULL: Self = Self {
        segment: -1,
        offset: 0,
    };

    /// Creates a pointer to `offset` bytes into segment `segment`.
    pub const fn new(segment: i32, offset: u32) -> Self {
        Self { segment, offset }
    }

    /// Returns `true` if this is the null sentinel.
    pub const fn is_null(&self) -> bool {
        self.segment < 0
    }

    /// Encodes the pointer into its 8-byte in-chunk form: segment as
    /// little-endian `i32`, then offset as little-endian `u32`.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..4].copy_from_slice(&self.segment.to_le_bytes());
        out[4..].copy_from_slice(&self.offset.to_le_bytes());
        out
    }

    /// Decodes a pointer from its 8-byte in-chunk form.
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self {
            segment: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            offset: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sentinel_round_trips() {
        let decoded = PagePtr::from_bytes(PagePtr::NULL.to_bytes());
        assert!(decoded.is_null());
        assert_eq!(decoded, PagePtr::NULL);
    }

    #[test]
    fn encoding_is_little_endian() {
        let ptr = PagePtr::new(2, 0x40);
        let bytes = ptr.to_bytes();
        assert_eq!(bytes, [2, 0, 0, 0, 0x40, 0, 0, 0]);
        assert_eq!(PagePtr::from_bytes(bytes), ptr);
    }
}
