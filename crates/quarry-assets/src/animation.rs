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

//! The animation-sequence converter.
//!
//! An animation sequence arrives as a pre-compiled engine blob that the
//! converter treats as opaque, except for a small fixed header it decodes
//! to find the "auto-layer" records, each of which may embed the GUID of
//! another sequence asset. The blob is copied verbatim into the pak,
//! prefixed by its logical path; the only mutation the pak performs on it
//! is the loader's GUID resolution at the descriptor locations registered
//! here.

use crate::convert::ConvertOutcome;
use quarry_core::{AssetError, AssetGuid, AssetKind, PagePtr};
use quarry_pack::{AssetEntry, PakBuilder, SegmentFlags};
use std::io;
use std::path::Path;

/// The packed header the pak stores for a sequence asset: a pointer to the
/// asset's logical path string and a pointer to the raw blob, both inside
/// the same data chunk.
const HEADER_SIZE: usize = 16;
const NAME_PTR_OFFSET: u32 = 0;
const DATA_PTR_OFFSET: u32 = 8;

/// The load-ordering gate for sequence assets. The runtime always expects
/// two categorically-required external references for this kind; the value
/// is an opaque contract constant shared with the loader.
const REMAINING_DEPENDENCIES: u32 = 2;

/// The fields the converter decodes out of the compiled sequence blob.
///
/// Layout contract with the sequence compiler: the blob header is at least
/// [`SeqDesc::MIN_SIZE`] bytes, with the auto-layer count at byte 16 and
/// the byte offset of the auto-layer array (from blob start) at byte 20.
/// Each auto-layer record is [`SeqDesc::AUTOLAYER_RECORD_SIZE`] bytes and
/// begins with the 64-bit GUID of the referenced sequence (zero when the
/// slot is unused). Everything else in the blob is opaque.
#[derive(Debug, Clone, Copy)]
struct SeqDesc {
    autolayer_count: u32,
    autolayer_offset: u32,
}

impl SeqDesc {
    const MIN_SIZE: usize = 24;
    const AUTOLAYER_COUNT_OFFSET: usize = 16;
    const AUTOLAYER_INDEX_OFFSET: usize = 20;
    const AUTOLAYER_RECORD_SIZE: usize = 32;

    /// Decodes the sequence header, validating that the auto-layer array
    /// lies inside the blob. Returns a description of the defect on
    /// failure.
    fn read(blob: &[u8]) -> Result<Self, String> {
        if blob.len() < Self::MIN_SIZE {
            return Err(format!(
                "sequence blob is {} bytes, expected at least {}",
                blob.len(),
                Self::MIN_SIZE
            ));
        }
        let count = read_i32_le(blob, Self::AUTOLAYER_COUNT_OFFSET);
        let offset = read_i32_le(blob, Self::AUTOLAYER_INDEX_OFFSET);
        if count < 0 || offset < 0 {
            return Err(format!(
                "negative auto-layer count ({count}) or offset ({offset})"
            ));
        }
        let array_end =
            offset as usize + count as usize * Self::AUTOLAYER_RECORD_SIZE;
        if count > 0 && array_end > blob.len() {
            return Err(format!(
                "auto-layer array ends at {array_end}, past blob end {}",
                blob.len()
            ));
        }
        Ok(Self {
            autolayer_count: count as u32,
            autolayer_offset: offset as u32,
        })
    }
}

fn read_i32_le(bytes: &[u8], offset: usize) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_le_bytes(raw)
}

fn read_u64_le(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

fn read_source(full_path: &Path) -> Result<Vec<u8>, AssetError> {
    match std::fs::read(full_path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(AssetError::MissingSourceFile {
            path: full_path.to_path_buf(),
        }),
        Err(err) => Err(err.into()),
    }
}

/// Converts the compiled sequence at `path` (relative to the asset root)
/// into one pak entry.
///
/// The source file is read and validated before any chunk is allocated, so
/// a missing or malformed source leaves the build state untouched.
pub fn add_anim_sequence(
    pak: &mut PakBuilder,
    path: &str,
) -> Result<ConvertOutcome, AssetError> {
    log::debug!("adding aseq asset '{path}'");

    let full_path = pak.asset_root().join(path);
    let blob = read_source(&full_path)?;
    let seqdesc = SeqDesc::read(&blob).map_err(|reason| AssetError::MalformedSource {
        path: full_path,
        reason,
    })?;

    // Payload chunk: NUL-terminated logical path, then the blob verbatim.
    let name_len = path.len() + 1;
    let data = pak.create_chunk(name_len + blob.len(), SegmentFlags::CPU, 64);
    {
        let mut w = pak.writer(data);
        w.put_cstr(0, path);
        w.put_bytes(name_len, &blob);
    }

    let header = pak.create_chunk(HEADER_SIZE, SegmentFlags::HEAD, 16);
    {
        let mut w = pak.writer(header);
        w.put_ptr(NAME_PTR_OFFSET as usize, data.ptr());
        w.put_ptr(DATA_PTR_OFFSET as usize, data.ptr_at(name_len as u32));
    }
    pak.add_pointer(header.ptr_ref(NAME_PTR_OFFSET));
    pak.add_pointer(header.ptr_ref(DATA_PTR_OFFSET));

    // Register the auto-layer GUID references. The field locations are
    // relative to the data chunk, which holds the blob at `name_len`.
    let entry_index = pak.next_entry_index();
    let mut guid_refs = Vec::new();
    for i in 0..seqdesc.autolayer_count as usize {
        let record_offset =
            seqdesc.autolayer_offset as usize + i * SeqDesc::AUTOLAYER_RECORD_SIZE;
        let guid = AssetGuid(read_u64_le(&blob, record_offset));
        pak.add_guid_descriptor(
            &mut guid_refs,
            guid,
            data.guid_ref((name_len + record_offset) as u32),
        );
        pak.add_relation_to(guid, entry_index);
    }

    let guid = AssetGuid::from_path(path);
    let mut entry = AssetEntry::new(
        guid,
        header.ptr(),
        header.len,
        PagePtr::NULL,
        AssetKind::AnimSequence,
        AssetKind::AnimSequence.current_version(),
    );
    entry.page_end = pak.segment_count();
    entry.remaining_dependency_count = REMAINING_DEPENDENCIES;
    entry.attach_guid_refs(guid_refs);
    pak.push_entry(entry);

    Ok(ConvertOutcome::Added(guid))
}
