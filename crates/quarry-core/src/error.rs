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

//! Defines the error hierarchy for asset conversion.
//!
//! Errors are scoped to a single asset: a converter that fails reports one
//! of these and leaves the rest of the build intact. Chunks already
//! allocated for the failed asset remain as unreferenced space in the pak,
//! which is acceptable for a build tool.

use crate::asset::AssetKind;
use std::path::PathBuf;
use thiserror::Error;

/// An error produced while converting a single source asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The external source file for the asset does not exist. Fatal for
    /// the asset being converted; the build continues with the rest.
    #[error("source file not found: '{path}'")]
    MissingSourceFile {
        /// The resolved on-disk path that was required.
        path: PathBuf,
    },

    /// The source file exists but its structure is unusable (truncated
    /// header, out-of-bounds sub-structure, unreadable table shape).
    #[error("malformed source '{path}': {reason}")]
    MalformedSource {
        /// The resolved on-disk path of the offending file.
        path: PathBuf,
        /// A human-readable description of what was wrong.
        reason: String,
    },

    /// The requested schema version has no converter implementation.
    #[error("no converter for {kind} version {version}")]
    UnsupportedAssetVersion {
        /// The asset kind that was requested.
        kind: AssetKind,
        /// The unsupported schema version.
        version: u32,
    },

    /// An underlying I/O failure while reading a source file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
