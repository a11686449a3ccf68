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

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable, content-addressed identifier for a built asset.
///
/// The GUID is the hash of the asset's canonical logical path. It is the
/// primary key of the cross-reference system: every embedded reference from
/// one asset to another is stored as the target's GUID, never as a path or
/// a table index, so assets can be rebuilt and reordered without breaking
/// references between paks.
///
/// A GUID of zero ([`AssetGuid::NIL`]) is the distinguished "no reference"
/// sentinel and never identifies a real asset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct AssetGuid(pub u64);

impl AssetGuid {
    /// The "no reference" sentinel. Embedded zero GUIDs in source data mean
    /// the slot is unused and must be skipped, not resolved.
    pub const NIL: Self = Self(0);

    /// Hashes a canonical asset path into its GUID.
    ///
    /// This is part of the pak format contract and must stay stable across
    /// builds: the GUID is the first 8 bytes, little-endian, of the BLAKE3
    /// hash of the UTF-8 path bytes. Any tool producing or consuming Quarry
    /// paks must use this exact mapping.
    pub fn from_path(path: &str) -> Self {
        let digest = blake3::hash(path.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.as_bytes()[..8]);
        Self(u64::from_le_bytes(bytes))
    }

    /// Returns `true` if this is the "no reference" sentinel.
    pub const fn is_nil(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AssetGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = AssetGuid::from_path("animation/pilot/run.rseq");
        let b = AssetGuid::from_path("animation/pilot/run.rseq");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_paths_produce_distinct_guids() {
        let a = AssetGuid::from_path("datatable/weapons.qtbl");
        let b = AssetGuid::from_path("datatable/loadouts.qtbl");
        assert_ne!(a, b);
    }

    #[test]
    fn hashed_guids_are_not_nil() {
        assert!(!AssetGuid::from_path("").is_nil());
        assert!(!AssetGuid::from_path("a").is_nil());
        assert!(AssetGuid::NIL.is_nil());
    }
}
