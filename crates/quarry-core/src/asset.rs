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

//! The registry of asset kinds the builder knows how to convert.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a packed asset, identifying which converter produced it and
/// which runtime handler consumes it.
///
/// Each kind carries a four-byte ASCII tag that is written verbatim into
/// the asset entry table, and a current schema version that the matching
/// converter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// A pre-compiled animation sequence wrapped as an opaque payload.
    AnimSequence,
    /// A typed columnar table built from a tabular source file.
    DataTable,
}

impl AssetKind {
    /// The four-byte ASCII tag identifying this kind in the entry table.
    pub const fn tag(&self) -> [u8; 4] {
        match self {
            AssetKind::AnimSequence => *b"aseq",
            AssetKind::DataTable => *b"dtbl",
        }
    }

    /// The tag as a little-endian `u32`, the form stored on disk.
    pub const fn tag_u32(&self) -> u32 {
        u32::from_le_bytes(self.tag())
    }

    /// The schema version the current converter for this kind produces.
    ///
    /// These are per-kind contract values shared with the runtime loader;
    /// a version bump means the header layout changed.
    pub const fn current_version(&self) -> u32 {
        match self {
            AssetKind::AnimSequence => 7,
            AssetKind::DataTable => 1,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag();
        // Tags are ASCII by construction.
        write!(f, "{}", std::str::from_utf8(&tag).unwrap_or("????"))
    }
}
