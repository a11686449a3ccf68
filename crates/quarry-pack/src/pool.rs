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

//! The page/segment allocator.
//!
//! Segments are created on demand and chunks are bump-allocated from their
//! ends. The model is strictly append-only for the duration of one build:
//! no chunk is ever moved, shrunk, or freed, which is what makes the
//! `(segment, offset)` coordinates in pointers, relocations, and GUID
//! descriptors stable from allocation time until the pak is written out.

use crate::chunk::{ChunkWriter, DataChunk};
use crate::segment::{Segment, SegmentFlags};

fn align_up(value: usize, align: u32) -> usize {
    let align = align as usize;
    (value + align - 1) & !(align - 1)
}

/// Owns every segment of the pak being built and carves chunks from them.
#[derive(Default)]
pub struct PagePool {
    segments: Vec<Segment>,
}

impl PagePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new segment with the given purpose flags and alignment and
    /// returns its index.
    ///
    /// Alignment must be a nonzero power of two; anything else is a caller
    /// defect and panics.
    pub fn create_segment(&mut self, flags: SegmentFlags, align: u32) -> u32 {
        let index = self.segments.len() as u32;
        self.segments.push(Segment::new(index, flags, align));
        log::debug!("created segment {index} flags={flags:?} align={align}");
        index
    }

    /// Allocates a chunk of `size` bytes, reusing the most recent segment
    /// with identical flags and alignment or creating a new one.
    ///
    /// The chunk starts at the segment's current end, rounded up to the
    /// segment alignment; its length is `size` rounded up to a 4-byte
    /// boundary. The backing bytes are zero-initialized.
    pub fn create_chunk(&mut self, size: usize, flags: SegmentFlags, align: u32) -> DataChunk {
        let index = match self
            .segments
            .iter()
            .rev()
            .find(|s| s.flags == flags && s.align == align)
        {
            Some(segment) => segment.index,
            None => self.create_segment(flags, align),
        };

        let segment = &mut self.segments[index as usize];
        let offset = align_up(segment.data.len(), align);
        let len = align_up(size, 4);
        segment.data.resize(offset + len, 0);

        DataChunk {
            segment: index,
            offset: offset as u32,
            len: len as u32,
        }
    }

    /// Returns a bounds-checked writer over the chunk's bytes.
    pub fn writer(&mut self, chunk: DataChunk) -> ChunkWriter<'_> {
        let segment = &mut self.segments[chunk.segment as usize];
        let start = chunk.offset as usize;
        let end = start + chunk.len as usize;
        ChunkWriter::new(&mut segment.data[start..end])
    }

    /// Returns the chunk's bytes for reading.
    pub fn chunk_bytes(&self, chunk: DataChunk) -> &[u8] {
        let segment = &self.segments[chunk.segment as usize];
        let start = chunk.offset as usize;
        &segment.data[start..start + chunk.len as usize]
    }

    /// Returns the segment at `index`.
    pub fn segment(&self, index: u32) -> &Segment {
        &self.segments[index as usize]
    }

    /// The segments created so far, in index order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The number of segments created so far.
    pub fn segment_count(&self) -> u32 {
        self.segments.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_offsets_respect_alignment() {
        let mut pool = PagePool::new();
        let a = pool.create_chunk(5, SegmentFlags::CPU, 8);
        let b = pool.create_chunk(3, SegmentFlags::CPU, 8);
        assert_eq!(a.offset % 8, 0);
        assert_eq!(b.offset % 8, 0);
        assert_eq!(a.segment, b.segment);
    }

    #[test]
    fn chunks_never_overlap() {
        let mut pool = PagePool::new();
        let chunks: Vec<_> = (1..20)
            .map(|size| pool.create_chunk(size, SegmentFlags::CPU, 16))
            .collect();
        for (i, a) in chunks.iter().enumerate() {
            for b in &chunks[i + 1..] {
                assert_eq!(a.segment, b.segment);
                let a_end = a.offset + a.len;
                let b_end = b.offset + b.len;
                assert!(a_end <= b.offset || b_end <= a.offset, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn chunk_length_is_rounded_to_four_bytes() {
        let mut pool = PagePool::new();
        let chunk = pool.create_chunk(7, SegmentFlags::CPU, 4);
        assert_eq!(chunk.len, 8);
    }

    #[test]
    fn chunks_are_zero_initialized() {
        let mut pool = PagePool::new();
        let chunk = pool.create_chunk(64, SegmentFlags::CPU, 64);
        assert!(pool.chunk_bytes(chunk).iter().all(|&b| b == 0));
    }

    #[test]
    fn incompatible_flags_open_a_new_segment() {
        let mut pool = PagePool::new();
        let head = pool.create_chunk(16, SegmentFlags::HEAD, 16);
        let cpu = pool.create_chunk(16, SegmentFlags::CPU, 8);
        let head2 = pool.create_chunk(16, SegmentFlags::HEAD, 16);
        assert_ne!(head.segment, cpu.segment);
        // The most recent compatible segment is reused even when a different
        // segment was opened in between.
        assert_eq!(head.segment, head2.segment);
        assert_eq!(pool.segment_count(), 2);
    }

    #[test]
    fn different_alignment_opens_a_new_segment() {
        let mut pool = PagePool::new();
        let a = pool.create_chunk(16, SegmentFlags::CPU, 8);
        let b = pool.create_chunk(16, SegmentFlags::CPU, 64);
        assert_ne!(a.segment, b.segment);
    }

    #[test]
    fn writer_sees_only_its_chunk() {
        let mut pool = PagePool::new();
        let a = pool.create_chunk(8, SegmentFlags::CPU, 8);
        let b = pool.create_chunk(8, SegmentFlags::CPU, 8);
        pool.writer(b).put_u32(0, 0xdead_beef);
        assert!(pool.chunk_bytes(a).iter().all(|&x| x == 0));
        assert_eq!(&pool.chunk_bytes(b)[..4], &0xdead_beefu32.to_le_bytes());
    }
}
