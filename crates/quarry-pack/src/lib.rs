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

//! # Quarry Pack
//!
//! The pak construction engine. This crate is effectively a miniature
//! linker: it lays out position-independent binary segments, carves chunks
//! out of them for asset converters to fill, records every pointer field
//! that the runtime loader must patch, tracks cross-asset GUID references,
//! and serializes the result into a single pak file.
//!
//! The central type is [`PakBuilder`], which owns all mutable build state
//! for one pak and is threaded by `&mut` through the converters, making it
//! the single serialization point the build model requires.

#![warn(missing_docs)]

pub mod builder;
pub mod chunk;
pub mod entry;
pub mod pool;
pub mod reloc;
pub mod segment;
pub mod write;

pub use builder::PakBuilder;
pub use chunk::{ChunkWriter, DataChunk};
pub use entry::AssetEntry;
pub use pool::PagePool;
pub use reloc::{GuidRef, PtrRef, RelocationTable};
pub use segment::{Segment, SegmentFlags};
