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

//! Serializes a finished build into the pak binary.
//!
//! Quarry defines its own framing (byte compatibility with a foreign
//! loader is not a goal); this module's layout *is* the format contract,
//! all integers little-endian:
//!
//! ```text
//! magic                 b"QPAK"
//! format version        u16 (currently 1)
//! flags                 u16 (reserved, 0)
//! segment count         u32
//! relocation count      u32
//! guid descriptor count u32
//! asset entry count     u32
//! segment directory     per segment: flags u32, align u32, size u64
//! relocation table      per fixup: segment u32, offset u32
//! guid descriptor table per ref:   segment u32, offset u32
//! entry table           per entry: guid u64, header_ptr 8B,
//!                       header_size u32, data_ptr 8B, kind tag u32,
//!                       version u32, page_end u32,
//!                       remaining_dependency_count u32,
//!                       guid_ref_count u32, relation_count u32,
//!                       guid refs (8B each), relations (u32 each)
//! segment payloads      in index order, each padded to its alignment
//! ```
//!
//! The guid descriptor table is the per-entry lists flattened in entry
//! order, so `guid_ref_count` slices it back apart. Writing is fully
//! deterministic: identical build inputs produce byte-identical paks.

use crate::builder::PakBuilder;
use std::io::{self, Write};

/// The pak magic, `b"QPAK"` as a little-endian `u32`.
pub const PAK_MAGIC: u32 = u32::from_le_bytes(*b"QPAK");

/// The pak container format version this writer emits.
pub const PAK_FORMAT_VERSION: u16 = 1;

impl PakBuilder {
    /// Writes the finished pak to `w`.
    pub fn write_pak<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let guid_descriptor_count: usize = self
            .entries()
            .iter()
            .map(|entry| entry.guid_refs.len())
            .sum();

        w.write_all(&PAK_MAGIC.to_le_bytes())?;
        w.write_all(&PAK_FORMAT_VERSION.to_le_bytes())?;
        w.write_all(&0u16.to_le_bytes())?;
        w.write_all(&self.segment_count().to_le_bytes())?;
        w.write_all(&(self.relocations().len() as u32).to_le_bytes())?;
        w.write_all(&(guid_descriptor_count as u32).to_le_bytes())?;
        w.write_all(&(self.entries().len() as u32).to_le_bytes())?;

        for segment in self.pages().segments() {
            w.write_all(&segment.flags.bits().to_le_bytes())?;
            w.write_all(&segment.align.to_le_bytes())?;
            w.write_all(&(segment.len() as u64).to_le_bytes())?;
        }

        for fixup in self.relocations().fixups() {
            w.write_all(&fixup.segment.to_le_bytes())?;
            w.write_all(&fixup.offset.to_le_bytes())?;
        }

        for entry in self.entries() {
            for guid_ref in &entry.guid_refs {
                w.write_all(&guid_ref.segment.to_le_bytes())?;
                w.write_all(&guid_ref.offset.to_le_bytes())?;
            }
        }

        for entry in self.entries() {
            w.write_all(&entry.guid.0.to_le_bytes())?;
            w.write_all(&entry.header_ptr.to_bytes())?;
            w.write_all(&entry.header_size.to_le_bytes())?;
            w.write_all(&entry.data_ptr.to_bytes())?;
            w.write_all(&entry.kind.tag_u32().to_le_bytes())?;
            w.write_all(&entry.version.to_le_bytes())?;
            w.write_all(&entry.page_end.to_le_bytes())?;
            w.write_all(&entry.remaining_dependency_count.to_le_bytes())?;
            w.write_all(&(entry.guid_refs.len() as u32).to_le_bytes())?;
            w.write_all(&(entry.relations.len() as u32).to_le_bytes())?;
            for guid_ref in &entry.guid_refs {
                w.write_all(&guid_ref.segment.to_le_bytes())?;
                w.write_all(&guid_ref.offset.to_le_bytes())?;
            }
            for relation in &entry.relations {
                w.write_all(&relation.to_le_bytes())?;
            }
        }

        for segment in self.pages().segments() {
            w.write_all(&segment.data)?;
            let align = segment.align as usize;
            let padded = segment.len().div_ceil(align) * align;
            for _ in segment.len()..padded {
                w.write_all(&[0u8])?;
            }
        }

        Ok(())
    }

    /// Serializes the finished pak into an owned byte vector.
    pub fn to_pak_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        self.write_pak(&mut out)
            .unwrap_or_else(|e| unreachable!("in-memory pak write failed: {e}"));
        out
    }
}
