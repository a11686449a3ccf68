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

//! The minimal math vocabulary the pak format needs.
//!
//! This is deliberately not a general math library: the only value type
//! the binary layout knows is the 12-byte [`Vec3`] stored by vector-typed
//! table columns.

mod vector;

pub use vector::Vec3;
