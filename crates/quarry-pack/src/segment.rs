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

use std::fmt;

/// Purpose flags for a pak segment.
///
/// The flags tell the runtime loader what the segment holds and therefore
/// where to map it. Converters tag header chunks with [`SegmentFlags::HEAD`]
/// and bulk payload with [`SegmentFlags::CPU`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SegmentFlags(u32);

impl SegmentFlags {
    /// The segment holds fixed asset header structures.
    pub const HEAD: Self = Self(1 << 0);
    /// The segment holds CPU-resident variable data.
    pub const CPU: Self = Self(1 << 1);

    /// Returns the raw flag bits, the form stored in the segment directory.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Reconstructs flags from raw bits. Unknown bits are kept.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns `true` if all flags in `other` are set in `self`.
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for SegmentFlags {
    type Output = Self;
    fn bitor(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl fmt::Debug for SegmentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SegmentFlags({:#x})", self.0)
    }
}

/// A typed, aligned memory region within the pak.
///
/// Segments are the unit the runtime loader maps into memory. They are
/// owned exclusively by the allocator for the duration of one build, grow
/// as chunks are carved from them, and become immutable once the pak is
/// finalized.
pub struct Segment {
    /// The segment's index, assigned at creation and monotonically
    /// increasing across the build.
    pub index: u32,
    /// The purpose flags the loader uses to place this segment.
    pub flags: SegmentFlags,
    /// The required alignment of the segment base and of every chunk
    /// offset within it. Always a power of two.
    pub align: u32,
    /// The segment contents. Grows at the end only; zero-filled on growth.
    pub data: Vec<u8>,
}

impl Segment {
    pub(crate) fn new(index: u32, flags: SegmentFlags, align: u32) -> Self {
        assert!(
            align != 0 && align.is_power_of_two(),
            "segment alignment must be a nonzero power of two (got {align})"
        );
        Self {
            index,
            flags,
            align,
            data: Vec::new(),
        }
    }

    /// The current byte size of the segment.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no chunk has been carved from this segment yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
