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

use anyhow::Result;
use quarry_assets::{convert_asset, ConvertOutcome};
use quarry_core::{AssetKind, PagePtr};
use quarry_pack::PakBuilder;
use tempfile::tempdir;

// --- Helpers to read built segment data back, simulating the loader ---

fn read_bytes(pak: &PakBuilder, ptr: PagePtr, extra: u32, len: usize) -> Vec<u8> {
    assert!(!ptr.is_null());
    let segment = pak.pages().segment(ptr.segment as u32);
    let start = (ptr.offset + extra) as usize;
    segment.data[start..start + len].to_vec()
}

fn read_u32(pak: &PakBuilder, ptr: PagePtr, extra: u32) -> u32 {
    u32::from_le_bytes(read_bytes(pak, ptr, extra, 4).try_into().unwrap())
}

fn read_i32(pak: &PakBuilder, ptr: PagePtr, extra: u32) -> i32 {
    i32::from_le_bytes(read_bytes(pak, ptr, extra, 4).try_into().unwrap())
}

fn read_f32(pak: &PakBuilder, ptr: PagePtr, extra: u32) -> f32 {
    f32::from_le_bytes(read_bytes(pak, ptr, extra, 4).try_into().unwrap())
}

fn read_ptr(pak: &PakBuilder, ptr: PagePtr, extra: u32) -> PagePtr {
    PagePtr::from_bytes(read_bytes(pak, ptr, extra, 8).try_into().unwrap())
}

fn read_cstr(pak: &PakBuilder, ptr: PagePtr) -> String {
    assert!(!ptr.is_null());
    let segment = pak.pages().segment(ptr.segment as u32);
    let bytes = &segment.data[ptr.offset as usize..];
    let end = bytes.iter().position(|&b| b == 0).expect("unterminated string");
    String::from_utf8(bytes[..end].to_vec()).unwrap()
}

/// Every registered fixup must lie inside an allocated segment and hold a
/// PagePtr that resolves into an allocated segment.
fn assert_fixups_resolve(pak: &PakBuilder) {
    for fixup in pak.relocations().fixups() {
        let segment = pak.pages().segment(fixup.segment);
        assert!(
            (fixup.offset as usize + PagePtr::SIZE) <= segment.len(),
            "fixup {fixup:?} out of segment bounds"
        );
        let target = read_ptr(pak, PagePtr::new(fixup.segment as i32, fixup.offset), 0);
        assert!(!target.is_null(), "fixup {fixup:?} holds a null pointer");
        let target_segment = pak.pages().segment(target.segment as u32);
        assert!(
            (target.offset as usize) <= target_segment.len(),
            "fixup {fixup:?} resolves past segment end"
        );
    }
}

fn write_table(root: &std::path::Path, name: &str, contents: &str) -> Result<()> {
    let path = root.join(format!("{name}.csv"));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

// --- Scenario A: string/int/vector table with two data rows ---

#[test]
fn table_with_mixed_columns_lays_out_rows_and_strings() -> Result<()> {
    let dir = tempdir()?;
    write_table(
        dir.path(),
        "tables/units",
        "name,hp,pos\n\
         bob,100,\"<1,2,3>\"\n\
         alice,90,\"<4,5,6>\"\n\
         string,int,vector\n",
    )?;

    let mut pak = PakBuilder::new(dir.path());
    let outcome = convert_asset(&mut pak, AssetKind::DataTable, 1, "tables/units")?;
    assert!(matches!(outcome, ConvertOutcome::Added(_)));

    let entry = &pak.entries()[0];
    assert_eq!(entry.kind, AssetKind::DataTable);
    assert_eq!(entry.version, 1);
    assert_eq!(entry.remaining_dependency_count, 1);
    assert_eq!(entry.page_end, pak.segment_count());

    let header = entry.header_ptr;
    let column_count = read_u32(&pak, header, 16);
    let row_count = read_u32(&pak, header, 20);
    let row_stride = read_u32(&pak, header, 24);
    assert_eq!(column_count, 3);
    assert_eq!(row_count, 2);
    // string pointer (8) + int (4) + vector (12)
    assert_eq!(row_stride, 8 + 4 + 12);

    // Two header pointers, three column-name pointers, one fixup per
    // string cell (2 rows x 1 string column).
    assert_eq!(pak.relocations().len(), 2 + 3 + 2);
    assert_fixups_resolve(&pak);

    // Decode row 0 the way the loader would.
    let rows = read_ptr(&pak, header, 8);
    assert_eq!(rows, entry.data_ptr);
    assert_eq!(read_cstr(&pak, read_ptr(&pak, rows, 0)), "bob");
    assert_eq!(read_i32(&pak, rows, 8), 100);
    assert_eq!(read_f32(&pak, rows, 12), 1.0);
    assert_eq!(read_f32(&pak, rows, 16), 2.0);
    assert_eq!(read_f32(&pak, rows, 20), 3.0);

    // Row 1 starts one stride later; its string is the second entry in the
    // string chunk.
    assert_eq!(read_cstr(&pak, read_ptr(&pak, rows, row_stride)), "alice");
    assert_eq!(read_i32(&pak, rows, row_stride + 8), 90);
    assert_eq!(read_f32(&pak, rows, row_stride + 12), 4.0);

    // Column descriptors carry the running row offsets and type tags.
    let columns = read_ptr(&pak, header, 0);
    assert_eq!(read_cstr(&pak, read_ptr(&pak, columns, 0)), "name");
    assert_eq!(read_u32(&pak, columns, 8), 0);
    assert_eq!(read_u32(&pak, columns, 16 + 8), 8);
    assert_eq!(read_u32(&pak, columns, 32 + 8), 12);
    assert_eq!(read_u32(&pak, columns, 32 + 12), 3); // vector tag
    Ok(())
}

// --- Scenario B: no data rows ---

#[test]
fn table_without_data_rows_is_skipped() -> Result<()> {
    let dir = tempdir()?;
    write_table(dir.path(), "tables/empty", "name,hp\nstring,int\n")?;

    let mut pak = PakBuilder::new(dir.path());
    let outcome = convert_asset(&mut pak, AssetKind::DataTable, 1, "tables/empty")?;
    assert_eq!(outcome, ConvertOutcome::Skipped);
    assert_eq!(pak.segment_count(), 0, "no chunks may be allocated");
    assert!(pak.entries().is_empty());
    Ok(())
}

// --- Scenario E: malformed vector cell ---

#[test]
fn malformed_vector_cell_stays_zeroed() -> Result<()> {
    let dir = tempdir()?;
    write_table(
        dir.path(),
        "tables/badvec",
        "pos\n\
         \"<1,2,3\"\n\
         vector\n",
    )?;

    let mut pak = PakBuilder::new(dir.path());
    convert_asset(&mut pak, AssetKind::DataTable, 1, "tables/badvec")?;

    let header = pak.entries()[0].header_ptr;
    let rows = read_ptr(&pak, header, 8);
    assert_eq!(read_f32(&pak, rows, 0), 0.0);
    assert_eq!(read_f32(&pak, rows, 4), 0.0);
    assert_eq!(read_f32(&pak, rows, 8), 0.0);
    Ok(())
}

// --- Round-trip of every cell type ---

#[test]
fn every_column_type_round_trips() -> Result<()> {
    let dir = tempdir()?;
    write_table(
        dir.path(),
        "tables/alltypes",
        "flag,count,ratio,dir,label,icon,sound\n\
         true,-5,3.5,\"<0.5,1.5,-2>\",hello,ui/icon,sfx/beep\n\
         FALSE,42,0.25,\"<1,0,0>\",world,ui/icon2,sfx/boop\n\
         bool,int,float,vector,string,asset,assetnoprecache\n",
    )?;

    let mut pak = PakBuilder::new(dir.path());
    convert_asset(&mut pak, AssetKind::DataTable, 1, "tables/alltypes")?;
    assert_fixups_resolve(&pak);

    let header = pak.entries()[0].header_ptr;
    let rows = read_ptr(&pak, header, 8);
    let stride = read_u32(&pak, header, 24);
    assert_eq!(stride, 4 + 4 + 4 + 12 + 8 + 8 + 8);

    // Row 0.
    assert_eq!(read_u32(&pak, rows, 0), 1);
    assert_eq!(read_i32(&pak, rows, 4), -5);
    assert_eq!(read_f32(&pak, rows, 8), 3.5);
    assert_eq!(read_f32(&pak, rows, 12), 0.5);
    assert_eq!(read_f32(&pak, rows, 16), 1.5);
    assert_eq!(read_f32(&pak, rows, 20), -2.0);
    assert_eq!(read_cstr(&pak, read_ptr(&pak, rows, 24)), "hello");
    assert_eq!(read_cstr(&pak, read_ptr(&pak, rows, 32)), "ui/icon");
    assert_eq!(read_cstr(&pak, read_ptr(&pak, rows, 40)), "sfx/beep");

    // Row 1. "FALSE" is not "true", so the bool slot holds 0.
    assert_eq!(read_u32(&pak, rows, stride), 0);
    assert_eq!(read_i32(&pak, rows, stride + 4), 42);
    assert_eq!(read_cstr(&pak, read_ptr(&pak, rows, stride + 24)), "world");
    Ok(())
}

// --- Build determinism ---

#[test]
fn converting_the_same_source_twice_is_byte_identical() -> Result<()> {
    let dir = tempdir()?;
    write_table(
        dir.path(),
        "tables/det",
        "a,b\nx,1\ny,2\nstring,int\n",
    )?;

    let build = || -> Result<Vec<u8>> {
        let mut pak = PakBuilder::new(dir.path());
        convert_asset(&mut pak, AssetKind::DataTable, 1, "tables/det")?;
        Ok(pak.to_pak_bytes())
    };
    assert_eq!(build()?, build()?);
    Ok(())
}

// --- Missing source file ---

#[test]
fn missing_table_source_is_a_per_asset_error() {
    let dir = tempdir().unwrap();
    let mut pak = PakBuilder::new(dir.path());
    let err = convert_asset(&mut pak, AssetKind::DataTable, 1, "tables/nope").unwrap_err();
    assert!(matches!(
        err,
        quarry_core::AssetError::MissingSourceFile { .. }
    ));
    assert_eq!(pak.segment_count(), 0);
}
