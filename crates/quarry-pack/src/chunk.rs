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

use crate::reloc::{GuidRef, PtrRef};
use quarry_core::math::Vec3;
use quarry_core::PagePtr;

/// A handle to a contiguous byte range carved from one segment.
///
/// The handle is a plain coordinate; it does not borrow the segment data.
/// Converters keep handles around freely and obtain a bounds-checked
/// [`ChunkWriter`] from the allocator whenever they need to fill content.
/// A chunk's offset is fixed at allocation time; chunks are never moved,
/// shrunk, or freed during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataChunk {
    /// The index of the owning segment.
    pub segment: u32,
    /// The byte offset of this chunk within its segment. Always a multiple
    /// of the segment's alignment.
    pub offset: u32,
    /// The chunk length in bytes, rounded up to a 4-byte boundary.
    pub len: u32,
}

impl DataChunk {
    /// A position-independent pointer to the start of this chunk.
    pub const fn ptr(&self) -> PagePtr {
        PagePtr::new(self.segment as i32, self.offset)
    }

    /// A position-independent pointer `extra` bytes into this chunk.
    pub fn ptr_at(&self, extra: u32) -> PagePtr {
        debug_assert!(extra <= self.len, "pointer target outside chunk");
        PagePtr::new(self.segment as i32, self.offset + extra)
    }

    /// The location of a pointer-typed field `field_offset` bytes into this
    /// chunk, for registration with the relocation table.
    pub fn ptr_ref(&self, field_offset: u32) -> PtrRef {
        debug_assert!(
            field_offset + PagePtr::SIZE as u32 <= self.len,
            "pointer field outside chunk"
        );
        PtrRef {
            segment: self.segment,
            offset: self.offset + field_offset,
        }
    }

    /// The location of a GUID-typed field `field_offset` bytes into this
    /// chunk, for registration as a cross-asset reference.
    pub fn guid_ref(&self, field_offset: u32) -> GuidRef {
        debug_assert!(field_offset + 8 <= self.len, "guid field outside chunk");
        GuidRef {
            segment: self.segment,
            offset: self.offset + field_offset,
        }
    }
}

/// A bounds-checked mutable view over one chunk's bytes.
///
/// All content written into the pak goes through these typed accessors;
/// raw writable pointers never cross component boundaries. Every write is
/// explicit little-endian, so the produced pak is identical regardless of
/// host endianness. Offsets are chunk-relative; writing past the chunk end
/// is a builder defect and panics.
pub struct ChunkWriter<'a> {
    buf: &'a mut [u8],
}

impl<'a> ChunkWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf }
    }

    fn slot(&mut self, offset: usize, size: usize) -> &mut [u8] {
        assert!(
            offset + size <= self.buf.len(),
            "write of {size} bytes at {offset} exceeds chunk of {} bytes",
            self.buf.len()
        );
        &mut self.buf[offset..offset + size]
    }

    /// Writes a little-endian `u32` at `offset`.
    pub fn put_u32(&mut self, offset: usize, value: u32) {
        self.slot(offset, 4).copy_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `i32` at `offset`.
    pub fn put_i32(&mut self, offset: usize, value: i32) {
        self.slot(offset, 4).copy_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `f32` at `offset`.
    pub fn put_f32(&mut self, offset: usize, value: f32) {
        self.slot(offset, 4).copy_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `u64` at `offset`.
    pub fn put_u64(&mut self, offset: usize, value: u64) {
        self.slot(offset, 8).copy_from_slice(&value.to_le_bytes());
    }

    /// Writes a [`Vec3`] at `offset` as three consecutive `f32`s.
    pub fn put_vec3(&mut self, offset: usize, value: Vec3) {
        self.put_f32(offset, value.x);
        self.put_f32(offset + 4, value.y);
        self.put_f32(offset + 8, value.z);
    }

    /// Writes the encoded form of a [`PagePtr`] at `offset`.
    ///
    /// The matching relocation must be registered separately; this method
    /// only stores the position-independent value.
    pub fn put_ptr(&mut self, offset: usize, value: PagePtr) {
        self.slot(offset, PagePtr::SIZE)
            .copy_from_slice(&value.to_bytes());
    }

    /// Copies raw bytes into the chunk at `offset`.
    pub fn put_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.slot(offset, bytes.len()).copy_from_slice(bytes);
    }

    /// Writes a NUL-terminated string at `offset` and returns the number of
    /// bytes written (string length + 1).
    pub fn put_cstr(&mut self, offset: usize, value: &str) -> usize {
        let bytes = value.as_bytes();
        self.put_bytes(offset, bytes);
        self.slot(offset + bytes.len(), 1)[0] = 0;
        bytes.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_little_endian() {
        let mut buf = [0u8; 16];
        let mut w = ChunkWriter::new(&mut buf);
        w.put_u32(0, 0x0403_0201);
        w.put_f32(4, 1.0);
        w.put_u64(8, 0x0807_0605_0403_0201);
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
        assert_eq!(&buf[4..8], &1.0f32.to_le_bytes());
        assert_eq!(&buf[8..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn cstr_is_nul_terminated() {
        let mut buf = [0xffu8; 8];
        let mut w = ChunkWriter::new(&mut buf);
        let written = w.put_cstr(0, "abc");
        assert_eq!(written, 4);
        assert_eq!(&buf[..4], b"abc\0");
    }

    #[test]
    #[should_panic(expected = "exceeds chunk")]
    fn out_of_bounds_write_panics() {
        let mut buf = [0u8; 4];
        let mut w = ChunkWriter::new(&mut buf);
        w.put_u64(0, 1);
    }
}
