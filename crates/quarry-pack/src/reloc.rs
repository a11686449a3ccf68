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

//! The pointer-relocation and GUID-descriptor registries.
//!
//! Every pointer-typed field written into a chunk holds a
//! position-independent [`PagePtr`](quarry_core::PagePtr) value until load
//! time. The relocation table records where those fields live so the
//! loader can walk it once, read each stored value, and rewrite the field
//! to a real address against the mapped segment bases.
//!
//! GUID descriptors are the same idea for cross-asset references: they mark
//! fields holding a 64-bit asset GUID that the loader resolves through its
//! asset directory instead of through segment bases.

/// The location of an 8-byte pointer field inside an allocated chunk.
///
/// Invariant: every field declared as a pointer in a packed header has
/// exactly one fixup; registering the same location twice is a caller
/// defect the table does not defend against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PtrRef {
    /// The segment holding the field.
    pub segment: u32,
    /// The byte offset of the field within the segment.
    pub offset: u32,
}

/// The location of an 8-byte GUID field inside an allocated chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuidRef {
    /// The segment holding the field.
    pub segment: u32,
    /// The byte offset of the field within the segment.
    pub offset: u32,
}

/// The ordered sequence of pointer fixups for one pak.
///
/// Fixups are kept in insertion order. The table makes no sortedness
/// guarantee and the loader must not rely on one.
#[derive(Default)]
pub struct RelocationTable {
    fixups: Vec<PtrRef>,
}

impl RelocationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one fixup. No lookup, no dedup.
    pub fn add(&mut self, location: PtrRef) {
        self.fixups.push(location);
    }

    /// The fixups registered so far, in insertion order.
    pub fn fixups(&self) -> &[PtrRef] {
        &self.fixups
    }

    /// The number of registered fixups.
    pub fn len(&self) -> usize {
        self.fixups.len()
    }

    /// Returns `true` if no fixup has been registered.
    pub fn is_empty(&self) -> bool {
        self.fixups.is_empty()
    }
}
