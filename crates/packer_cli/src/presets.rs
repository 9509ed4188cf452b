//! Input collaborators (component C7): a literal preset for demos/tests and
//! a spreadsheet reader. Neither carries packing logic; they only build
//! `Vec<PointOrGroup>` for `Packer::new`.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use packer_core::object::GroupBuilder;
use packer_core::{PointObject, PointOrGroup};

/// A curated, hand-written object list exercising every placement mode
/// (free, pinned start_frame, pinned offset, both, and groups). Mirrors
/// `Inputs/manual_objects.py` from the original tool, trimmed to the
/// combinations that actually stress the solver differently.
pub fn manual_preset() -> Vec<PointOrGroup> {
    let points: Vec<PointOrGroup> = vec![
        PointObject::new("D", 8, 16).with_start_frame(1).into(),
        PointObject::new("E", 32, 32).with_start_frame(31).into(),
        PointObject::new("F", 16, 32).with_start_frame(4).with_offset_bytes(16).into(),
        PointObject::new("G", 8, 1).into(),
        PointObject::new("H", 64, 1).with_start_frame(1).into(),
        PointObject::new("I", 64, 32).with_start_frame(1).into(),
        PointObject::new("J", 16, 8).with_start_frame(1).into(),
        PointObject::new("K", 64, 16).with_start_frame(5).into(),
        PointObject::new("L", 64, 32).into(),
        PointObject::new("M", 32, 32).with_start_frame(1).into(),
        PointObject::new("N", 64, 2).into(),
        PointObject::new("O", 16, 2).with_start_frame(1).into(),
        PointObject::new("P", 64, 32).into(),
        PointObject::new("Q", 32, 1).with_start_frame(1).into(),
        PointObject::new("R", 64, 4).into(),
        PointObject::new("S", 64, 32).into(),
        PointObject::new("U", 8, 16).into(),
        PointObject::new("V", 8, 1).into(),
        PointObject::new("Y", 8, 2).with_start_frame(1).into(),
        PointObject::new("Z", 8, 4).into(),
        PointObject::new("EE", 8, 8).into(),
        PointObject::new("FF", 8, 4).into(),
        PointObject::new("NNN", 8, 8).into(),
        PointObject::new("QQQ", 8, 16).with_offset_bytes(32).into(),
    ];

    let group_abc = GroupBuilder::new(
        16,
        vec![
            PointObject::new("A", 32, 1),
            PointObject::new("B", 16, 1),
            PointObject::new("C", 16, 1),
        ],
    )
    .name("group_ABC")
    .start_frame(1)
    .offset_bytes(8)
    .build();

    let group_bbb_ccc = GroupBuilder::new(
        32,
        vec![PointObject::new("BBB", 64, 1), PointObject::new("CCC", 8, 1)],
    )
    .name("group_BBB_CCC")
    .start_frame(2)
    .offset_bytes(4)
    .build();

    let group_xy = GroupBuilder::new(32, vec![PointObject::new("X", 16, 1), PointObject::new("Y2", 8, 1)])
        .name("group_XY")
        .offset_bytes(256)
        .build();

    let mut objects = points;
    objects.push(group_abc.into());
    objects.push(group_bbb_ccc.into());
    objects.push(group_xy.into());
    objects
}

/// Reads `Name`, `Size`, `Period`, `Start_Frame`, `Offset` columns (header
/// on row 3, i.e. the same `usecols="A:F", header=2` layout the original
/// pandas reader used) from the first worksheet of `path`. Rows with a
/// blank name are skipped; blank `Start_Frame`/`Offset` become `None`.
pub fn excel_preset(path: impl AsRef<Path>) -> Result<Vec<PointOrGroup>> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> =
        open_workbook(path).with_context(|| format!("opening workbook {}", path.display()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook has no worksheets")?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading worksheet '{sheet_name}'"))?;

    let mut objects = Vec::new();
    // Header occupies the first 3 rows (two title rows + column headers),
    // matching the original `header=2` pandas read.
    for row in range.rows().skip(3) {
        let name = match row.first() {
            Some(Data::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => continue,
        };
        let size = cell_as_u32(row.get(1)).with_context(|| format!("row for '{name}': missing Size"))?;
        let period =
            cell_as_u32(row.get(2)).with_context(|| format!("row for '{name}': missing Period"))?;
        let start_frame = row.get(3).and_then(cell_as_u32);
        let offset_bytes = row.get(4).and_then(cell_as_u32);

        let mut point = PointObject::new(name, size, period);
        if let Some(sf) = start_frame {
            point = point.with_start_frame(sf);
        }
        if let Some(ob) = offset_bytes {
            point = point.with_offset_bytes(ob);
        }
        objects.push(point.into());
    }
    Ok(objects)
}

fn cell_as_u32(cell: Option<&Data>) -> Option<u32> {
    match cell {
        Some(Data::Int(i)) => u32::try_from(*i).ok(),
        Some(Data::Float(f)) => Some(*f as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_preset_is_non_empty_and_includes_known_groups() {
        let objects = manual_preset();
        assert!(objects.len() > 20);
        let group_count = objects
            .iter()
            .filter(|o| matches!(o, PointOrGroup::Group(_)))
            .count();
        assert_eq!(group_count, 3);
    }
}
