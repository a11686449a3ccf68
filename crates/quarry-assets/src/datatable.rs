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

//! The data-table converter.
//!
//! A data table arrives as a tabular source file: the first record names
//! the columns, the last record names each column's type, and everything
//! in between is data. The converter lays the data out as fixed-stride
//! binary rows with an out-of-line string table, producing the columnar
//! structure the runtime queries by column name and row index.

use crate::convert::ConvertOutcome;
use quarry_core::math::Vec3;
use quarry_core::{AssetError, AssetGuid, AssetKind, PagePtr};
use quarry_pack::{AssetEntry, DataChunk, PakBuilder, SegmentFlags};
use std::io;
use std::path::Path;

/// The fixed suffix appended to a table's logical path before hashing its
/// GUID, distinguishing table references from other kinds at the same
/// path.
const GUID_SUFFIX: &str = ".qtbl";

/// The load-ordering gate for table assets: a table's only dependency is
/// itself being fully loaded.
const REMAINING_DEPENDENCIES: u32 = 1;

// Packed table header, 32 bytes: pointers to the column descriptors and
// the row data, then the table shape.
const HEADER_SIZE: usize = 32;
const COLUMNS_PTR_OFFSET: u32 = 0;
const ROWS_PTR_OFFSET: u32 = 8;
const COLUMN_COUNT_OFFSET: usize = 16;
const ROW_COUNT_OFFSET: usize = 20;
const ROW_STRIDE_OFFSET: usize = 24;

// Packed column descriptor, 16 bytes: name pointer, row offset, type tag.
const COLUMN_DESC_SIZE: usize = 16;
const COLUMN_NAME_PTR_OFFSET: usize = 0;
const COLUMN_ROW_OFFSET_OFFSET: usize = 8;
const COLUMN_TYPE_OFFSET: usize = 12;

/// The storage type of one table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Stored as 0 or 1 in a 4-byte slot.
    Bool,
    /// A little-endian `i32`.
    Int,
    /// A little-endian `f32`.
    Float,
    /// Three consecutive `f32`s, 12 bytes.
    Vector,
    /// A pointer into the out-of-line string table.
    String,
    /// Same storage as [`ColumnType::String`]; the runtime precaches the
    /// referenced asset.
    Asset,
    /// Same storage as [`ColumnType::String`]; the runtime resolves but
    /// does not precache the referenced asset.
    AssetNoPrecache,
}

impl ColumnType {
    /// Maps a type-row name to its column type, case-insensitively.
    ///
    /// Unknown names fall back to [`ColumnType::String`], a deliberate
    /// lenient default rather than a failure.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bool" => ColumnType::Bool,
            "int" => ColumnType::Int,
            "float" => ColumnType::Float,
            "vector" => ColumnType::Vector,
            "string" => ColumnType::String,
            "asset" => ColumnType::Asset,
            "assetnoprecache" => ColumnType::AssetNoPrecache,
            other => {
                log::warn!("unknown column type '{other}', defaulting to string");
                ColumnType::String
            }
        }
    }

    /// The number of bytes one cell of this type occupies in row data.
    pub const fn storage_size(&self) -> u32 {
        match self {
            ColumnType::Bool | ColumnType::Int | ColumnType::Float => 4,
            ColumnType::Vector => Vec3::SIZE as u32,
            ColumnType::String | ColumnType::Asset | ColumnType::AssetNoPrecache => {
                PagePtr::SIZE as u32
            }
        }
    }

    /// Returns `true` for the three types stored out-of-line in the string
    /// table. They differ only in runtime precache behavior, not layout.
    pub const fn is_string(&self) -> bool {
        matches!(
            self,
            ColumnType::String | ColumnType::Asset | ColumnType::AssetNoPrecache
        )
    }

    /// The tag written into the column descriptor.
    pub const fn tag(&self) -> u32 {
        match self {
            ColumnType::Bool => 0,
            ColumnType::Int => 1,
            ColumnType::Float => 2,
            ColumnType::Vector => 3,
            ColumnType::String => 4,
            ColumnType::Asset => 5,
            ColumnType::AssetNoPrecache => 6,
        }
    }
}

/// Parses the textual `<x,y,z>` vector form, tolerating whitespace around
/// the brackets and components.
///
/// Returns `None` for anything that is not exactly three parseable float
/// components between one `<` and one `>`. Callers leave the destination
/// slot untouched in that case, so a malformed cell reads back as the
/// zero vector.
pub fn parse_vector(text: &str) -> Option<Vec3> {
    let inner = text.trim().strip_prefix('<')?.strip_suffix('>')?;
    let mut parts = inner.split(',');
    let x = parts.next()?.trim().parse().ok()?;
    let y = parts.next()?.trim().parse().ok()?;
    let z = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Vec3::new(x, y, z))
}

fn read_records(full_path: &Path) -> Result<Vec<Vec<String>>, AssetError> {
    let raw = match std::fs::read(full_path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(AssetError::MissingSourceFile {
                path: full_path.to_path_buf(),
            })
        }
        Err(err) => return Err(err.into()),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(raw.as_slice());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| AssetError::MalformedSource {
            path: full_path.to_path_buf(),
            reason: err.to_string(),
        })?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

/// Writes one string cell: appends the NUL-terminated text to the string
/// chunk at `cursor`, stores a pointer to it in the row-data slot, and
/// registers the slot's relocation. The cursor is caller-owned state so
/// the traversal order (row-major, then column order) is explicit at the
/// call site.
fn write_string_cell(
    pak: &mut PakBuilder,
    rows: DataChunk,
    strings: DataChunk,
    slot: u32,
    cursor: &mut u32,
    text: &str,
) {
    let written = pak.writer(strings).put_cstr(*cursor as usize, text);
    pak.writer(rows).put_ptr(slot as usize, strings.ptr_at(*cursor));
    pak.add_pointer(rows.ptr_ref(slot));
    *cursor += written as u32;
}

/// Converts the tabular source at `<asset root>/<path>.csv` into one pak
/// entry.
///
/// A source with no columns, or with fewer than two records beyond the
/// name row (at least one data row plus the trailing type row), is skipped
/// with a warning rather than failing the asset.
pub fn add_data_table(pak: &mut PakBuilder, path: &str) -> Result<ConvertOutcome, AssetError> {
    log::debug!("adding dtbl asset '{path}'");

    let full_path = pak.asset_root().join(format!("{path}.csv"));
    let records = read_records(&full_path)?;

    // First record: column names. Last record: column types. In between:
    // data rows, of which there must be at least one.
    if records.len() < 3 {
        log::warn!(
            "dtbl asset '{path}' has no data rows (the last row must hold column types); skipping"
        );
        return Ok(ConvertOutcome::Skipped);
    }
    let names = &records[0];
    let column_count = names.len();
    if column_count == 0 || (column_count == 1 && names[0].is_empty()) {
        log::warn!("dtbl asset '{path}' has no columns; skipping");
        return Ok(ConvertOutcome::Skipped);
    }

    let type_row = &records[records.len() - 1];
    let data_rows = &records[1..records.len() - 1];
    let row_count = data_rows.len();

    let types: Vec<ColumnType> = type_row.iter().map(|name| ColumnType::from_name(name)).collect();

    // Each column's byte offset within a row is the running sum of the
    // storage sizes before it; the final sum is the row stride.
    let mut row_offsets = Vec::with_capacity(column_count);
    let mut row_stride = 0u32;
    for ty in &types {
        row_offsets.push(row_stride);
        row_stride += ty.storage_size();
    }

    let name_buf_size: usize = names.iter().map(|n| n.len() + 1).sum();
    let string_buf_size: usize = data_rows
        .iter()
        .flat_map(|row| {
            row.iter()
                .zip(&types)
                .filter(|(_, ty)| ty.is_string())
                .map(|(cell, _)| cell.len() + 1)
        })
        .sum();

    let header = pak.create_chunk(HEADER_SIZE, SegmentFlags::HEAD, 16);
    let columns = pak.create_chunk(COLUMN_DESC_SIZE * column_count, SegmentFlags::CPU, 8);
    let names_chunk = pak.create_chunk(name_buf_size, SegmentFlags::CPU, 8);
    let rows = pak.create_chunk((row_stride as usize) * row_count, SegmentFlags::CPU, 8);
    let strings = pak.create_chunk(string_buf_size, SegmentFlags::CPU, 8);

    {
        let mut w = pak.writer(header);
        w.put_ptr(COLUMNS_PTR_OFFSET as usize, columns.ptr());
        w.put_ptr(ROWS_PTR_OFFSET as usize, rows.ptr());
        w.put_u32(COLUMN_COUNT_OFFSET, column_count as u32);
        w.put_u32(ROW_COUNT_OFFSET, row_count as u32);
        w.put_u32(ROW_STRIDE_OFFSET, row_stride);
    }
    pak.add_pointer(header.ptr_ref(COLUMNS_PTR_OFFSET));
    pak.add_pointer(header.ptr_ref(ROWS_PTR_OFFSET));

    // Column descriptors and the packed name strings.
    let mut name_cursor = 0u32;
    for (col_idx, name) in names.iter().enumerate() {
        let desc = col_idx * COLUMN_DESC_SIZE;
        {
            let mut w = pak.writer(columns);
            w.put_ptr(desc + COLUMN_NAME_PTR_OFFSET, names_chunk.ptr_at(name_cursor));
            w.put_u32(desc + COLUMN_ROW_OFFSET_OFFSET, row_offsets[col_idx]);
            w.put_u32(desc + COLUMN_TYPE_OFFSET, types[col_idx].tag());
        }
        pak.add_pointer(columns.ptr_ref((desc + COLUMN_NAME_PTR_OFFSET) as u32));
        let written = pak.writer(names_chunk).put_cstr(name_cursor as usize, name);
        name_cursor += written as u32;
    }

    // Row data, row-major then column order. String-typed cells share that
    // traversal order for their placement in the string chunk.
    let mut string_cursor = 0u32;
    for (row_idx, row) in data_rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let slot = row_idx as u32 * row_stride + row_offsets[col_idx];
            match types[col_idx] {
                ColumnType::Bool => {
                    let value = cell.trim().eq_ignore_ascii_case("true");
                    pak.writer(rows).put_u32(slot as usize, value as u32);
                }
                ColumnType::Int => {
                    let value = cell.trim().parse::<i32>().unwrap_or_else(|_| {
                        log::warn!("dtbl '{path}': unparseable int cell '{cell}', storing 0");
                        0
                    });
                    pak.writer(rows).put_i32(slot as usize, value);
                }
                ColumnType::Float => {
                    let value = cell.trim().parse::<f32>().unwrap_or_else(|_| {
                        log::warn!("dtbl '{path}': unparseable float cell '{cell}', storing 0");
                        0.0
                    });
                    pak.writer(rows).put_f32(slot as usize, value);
                }
                ColumnType::Vector => {
                    // A malformed vector leaves the zero-initialized slot
                    // as-is; see `parse_vector`.
                    if let Some(vec) = parse_vector(cell) {
                        pak.writer(rows).put_vec3(slot as usize, vec);
                    }
                }
                ColumnType::String | ColumnType::Asset | ColumnType::AssetNoPrecache => {
                    write_string_cell(pak, rows, strings, slot, &mut string_cursor, cell);
                }
            }
        }
    }

    let guid = AssetGuid::from_path(&format!("{path}{GUID_SUFFIX}"));
    let mut entry = AssetEntry::new(
        guid,
        header.ptr(),
        header.len,
        rows.ptr(),
        AssetKind::DataTable,
        AssetKind::DataTable.current_version(),
    );
    entry.page_end = pak.segment_count();
    entry.remaining_dependency_count = REMAINING_DEPENDENCIES;
    pak.push_entry(entry);

    Ok(ConvertOutcome::Added(guid))
}
