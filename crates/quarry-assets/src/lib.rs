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

//! # Quarry Assets
//!
//! The per-type asset converters. Each converter reads one external source
//! file, carves header and data chunks from the
//! [`PakBuilder`](quarry_pack::PakBuilder), registers pointer relocations
//! and cross-asset GUID references as side effects, and appends one
//! completed entry to the asset table.
//!
//! Two converters are implemented: the animation-sequence converter (wraps
//! an opaque pre-compiled engine blob) and the data-table converter (turns
//! a tabular source into a typed columnar layout). The
//! [`convert`] module dispatches on asset kind and schema version and
//! applies the per-asset error policy.

#![warn(missing_docs)]

pub mod animation;
pub mod convert;
pub mod datatable;

pub use convert::{build_assets, convert_asset, BuildSummary, ConvertOutcome};
