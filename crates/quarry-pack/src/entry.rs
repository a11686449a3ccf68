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

use crate::reloc::GuidRef;
use quarry_core::{AssetGuid, AssetKind, PagePtr};

/// One built asset in the pak's entry table.
///
/// An entry binds a GUID to the chunks a converter produced for it, plus
/// the metadata the runtime loader needs to schedule it: the schema
/// version, the page range its data spans, and the dependency counters
/// that gate load ordering.
///
/// Lifecycle: constructed once by a converter, appended exactly once to
/// the entry table, and never mutated afterwards except to append relation
/// indices as later assets discover they depend on it.
#[derive(Debug)]
pub struct AssetEntry {
    /// The asset's stable identifier (hash of its canonical path input).
    pub guid: AssetGuid,
    /// Pointer to the asset's fixed header chunk.
    pub header_ptr: PagePtr,
    /// The byte size of the header structure.
    pub header_size: u32,
    /// Optional pointer to the asset's primary payload, or null when the
    /// header's own pointers are the only way in.
    pub data_ptr: PagePtr,
    /// The asset kind tag.
    pub kind: AssetKind,
    /// The schema version the converter emitted.
    pub version: u32,
    /// One past the highest segment index this asset's data spans. The
    /// loader must have segments `0..page_end` resident before the asset
    /// is usable.
    pub page_end: u32,
    /// The number of not-yet-resolved references this asset makes, used by
    /// the loader as a load-ordering gate. A per-kind contract value set by
    /// the converter.
    pub remaining_dependency_count: u32,
    /// The locations of cross-asset GUID fields this asset owns.
    pub guid_refs: Vec<GuidRef>,
    /// Entry-table indices of assets that depend on this one.
    pub relations: Vec<u32>,
}

impl AssetEntry {
    /// Constructs an entry for a freshly converted asset.
    ///
    /// `page_end` and `remaining_dependency_count` start at zero; the
    /// converter sets them afterwards according to its kind-specific
    /// contract.
    pub fn new(
        guid: AssetGuid,
        header_ptr: PagePtr,
        header_size: u32,
        data_ptr: PagePtr,
        kind: AssetKind,
        version: u32,
    ) -> Self {
        Self {
            guid,
            header_ptr,
            header_size,
            data_ptr,
            kind,
            version,
            page_end: 0,
            remaining_dependency_count: 0,
            guid_refs: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Attaches the cross-asset GUID field locations this asset owns.
    pub fn attach_guid_refs(&mut self, refs: Vec<GuidRef>) {
        self.guid_refs = refs;
    }

    /// Records that the asset at `entry_index` depends on this one.
    pub fn add_relation(&mut self, entry_index: u32) {
        self.relations.push(entry_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relations_append_in_discovery_order() {
        let mut entry = AssetEntry::new(
            AssetGuid::from_path("test/asset"),
            PagePtr::new(0, 0),
            16,
            PagePtr::NULL,
            AssetKind::AnimSequence,
            7,
        );
        entry.add_relation(3);
        entry.add_relation(1);
        assert_eq!(entry.relations, vec![3, 1]);
    }
}
