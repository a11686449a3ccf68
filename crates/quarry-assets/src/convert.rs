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

//! Converter dispatch and the per-asset error policy.

use crate::{animation, datatable};
use quarry_core::{AssetError, AssetGuid, AssetKind};
use quarry_pack::PakBuilder;

/// The result of successfully running one converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// An entry was appended; its GUID is returned.
    Added(AssetGuid),
    /// The asset was skipped non-fatally (warning already logged); no
    /// chunks were allocated and the entry table is unchanged.
    Skipped,
}

/// Converts a single asset of the given kind and schema version.
///
/// `path` is the asset's logical path, resolved against the builder's
/// asset root. A version with no converter implementation yields
/// [`AssetError::UnsupportedAssetVersion`].
pub fn convert_asset(
    pak: &mut PakBuilder,
    kind: AssetKind,
    version: u32,
    path: &str,
) -> Result<ConvertOutcome, AssetError> {
    match (kind, version) {
        (AssetKind::AnimSequence, 7) => animation::add_anim_sequence(pak, path),
        (AssetKind::DataTable, 1) => datatable::add_data_table(pak, path),
        _ => Err(AssetError::UnsupportedAssetVersion { kind, version }),
    }
}

/// Counters summarizing one driver pass over a build list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Assets that produced an entry.
    pub added: usize,
    /// Assets skipped non-fatally with a warning.
    pub skipped: usize,
    /// Assets that failed; their error was reported and the build moved on.
    pub failed: usize,
}

/// Converts every asset in `list` in order, applying the per-asset error
/// policy: a failed conversion is reported with its path context and the
/// build continues. Chunks a failed asset had already allocated remain as
/// unreferenced space; entries appended earlier are never touched.
pub fn build_assets(pak: &mut PakBuilder, list: &[(AssetKind, String)]) -> BuildSummary {
    let mut summary = BuildSummary::default();
    for (kind, path) in list {
        match convert_asset(pak, *kind, kind.current_version(), path) {
            Ok(ConvertOutcome::Added(guid)) => {
                log::debug!("added {kind} asset '{path}' as {guid}");
                summary.added += 1;
            }
            Ok(ConvertOutcome::Skipped) => summary.skipped += 1,
            Err(err) => {
                log::error!("failed to convert {kind} asset '{path}': {err}");
                summary.failed += 1;
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_version_is_rejected() {
        let mut pak = PakBuilder::new(".");
        let err = convert_asset(&mut pak, AssetKind::AnimSequence, 6, "x").unwrap_err();
        assert!(matches!(
            err,
            AssetError::UnsupportedAssetVersion { version: 6, .. }
        ));
    }

    #[test]
    fn driver_counts_failures_without_aborting() {
        let mut pak = PakBuilder::new("/nonexistent-root");
        let list = vec![
            (AssetKind::AnimSequence, "missing/a.rseq".to_string()),
            (AssetKind::AnimSequence, "missing/b.rseq".to_string()),
        ];
        let summary = build_assets(&mut pak, &list);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.added, 0);
        assert!(pak.entries().is_empty());
    }
}
