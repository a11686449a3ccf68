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

use crate::chunk::{ChunkWriter, DataChunk};
use crate::entry::AssetEntry;
use crate::pool::PagePool;
use crate::reloc::{GuidRef, PtrRef, RelocationTable};
use crate::segment::SegmentFlags;
use quarry_core::AssetGuid;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// All mutable state of one pak build.
///
/// The builder owns the segment pool, the relocation table, and the asset
/// entry table, and is threaded by `&mut` through every converter. That
/// single mutable borrow is the serialization point the build model
/// requires: converters may pre-read their source files however they like,
/// but allocation, chunk population, and registry updates happen here, in
/// a fixed deterministic order.
pub struct PakBuilder {
    asset_root: PathBuf,
    pages: PagePool,
    relocations: RelocationTable,
    entries: Vec<AssetEntry>,
    by_guid: HashMap<AssetGuid, u32>,
}

impl PakBuilder {
    /// Creates an empty builder whose converters resolve source files
    /// relative to `asset_root`.
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            pages: PagePool::new(),
            relocations: RelocationTable::new(),
            entries: Vec::new(),
            by_guid: HashMap::new(),
        }
    }

    /// The base directory external source assets are read from.
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    // --- Allocation ---

    /// Creates a new segment. See [`PagePool::create_segment`].
    pub fn create_segment(&mut self, flags: SegmentFlags, align: u32) -> u32 {
        self.pages.create_segment(flags, align)
    }

    /// Allocates a chunk. See [`PagePool::create_chunk`].
    pub fn create_chunk(&mut self, size: usize, flags: SegmentFlags, align: u32) -> DataChunk {
        self.pages.create_chunk(size, flags, align)
    }

    /// Returns a bounds-checked writer over a chunk's bytes.
    pub fn writer(&mut self, chunk: DataChunk) -> ChunkWriter<'_> {
        self.pages.writer(chunk)
    }

    /// Returns a chunk's bytes for reading.
    pub fn chunk_bytes(&self, chunk: DataChunk) -> &[u8] {
        self.pages.chunk_bytes(chunk)
    }

    /// The number of segments allocated so far. Converters record this as
    /// `page_end` once all of an asset's chunks are placed.
    pub fn segment_count(&self) -> u32 {
        self.pages.segment_count()
    }

    /// The underlying segment pool.
    pub fn pages(&self) -> &PagePool {
        &self.pages
    }

    // --- Registries ---

    /// Registers a pointer field for load-time relocation.
    ///
    /// Callers must register each pointer field exactly once, immediately
    /// after writing its [`PagePtr`](quarry_core::PagePtr) value.
    pub fn add_pointer(&mut self, location: PtrRef) {
        self.relocations.add(location);
    }

    /// Records `location` as a cross-asset GUID field in the asset's
    /// descriptor list.
    ///
    /// A nil `guid` means "no reference" and is skipped: embedded zero
    /// GUIDs in source data are unused slots, not dangling references.
    pub fn add_guid_descriptor(
        &mut self,
        list: &mut Vec<GuidRef>,
        guid: AssetGuid,
        location: GuidRef,
    ) {
        if guid.is_nil() {
            return;
        }
        list.push(location);
    }

    /// The pointer relocation table.
    pub fn relocations(&self) -> &RelocationTable {
        &self.relocations
    }

    // --- Entry table ---

    /// Looks up an already-built entry by GUID.
    ///
    /// Only entries built earlier in this pass are visible; forward
    /// references are not resolved here.
    pub fn asset_by_guid(&self, guid: AssetGuid) -> Option<(u32, &AssetEntry)> {
        self.by_guid
            .get(&guid)
            .map(|&index| (index, &self.entries[index as usize]))
    }

    /// If an entry with `target` GUID was already built, records that the
    /// asset at `dependent` depends on it. Returns whether a relation was
    /// added.
    pub fn add_relation_to(&mut self, target: AssetGuid, dependent: u32) -> bool {
        if target.is_nil() {
            return false;
        }
        match self.by_guid.get(&target) {
            Some(&index) => {
                self.entries[index as usize].add_relation(dependent);
                true
            }
            None => false,
        }
    }

    /// The index the next pushed entry will occupy. Converters use this to
    /// register back-relations for the asset they are still building.
    pub fn next_entry_index(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Appends a completed entry and returns its index.
    ///
    /// Build order is load-priority order; the table is append-only.
    pub fn push_entry(&mut self, entry: AssetEntry) -> u32 {
        let index = self.entries.len() as u32;
        if self.by_guid.insert(entry.guid, index).is_some() {
            log::warn!(
                "duplicate asset guid {} at entry {index}; later lookups resolve to this entry",
                entry.guid
            );
        }
        self.entries.push(entry);
        index
    }

    /// The entries built so far, in build order.
    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }
}
