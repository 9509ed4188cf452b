//! Workbook writer (component C8): renders the five result tables into an
//! `.xlsx` workbook across four sheets, per §6.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use packer_core::tables::Tables;
use rust_xlsxwriter::Workbook;

/// Writes `tables` to a workbook near `output_path`, applying the
/// collision policy (append `_0`, `_1`, … to the stem until free) unless
/// `strict` is set, in which case an existing file is a hard error.
pub fn write_workbook(tables: &Tables, output_path: &Path, strict: bool) -> Result<PathBuf> {
    let resolved = if strict {
        if output_path.exists() {
            anyhow::bail!("output path {} already exists", output_path.display());
        }
        output_path.to_path_buf()
    } else {
        resolve_collision(output_path)
    };

    let mut workbook = Workbook::new();

    write_schedule_sheet(&mut workbook, tables)?;
    write_memory_map_sheet(&mut workbook, tables)?;
    write_frame_order_sheet(&mut workbook, tables)?;
    write_frame_summary_sheet(&mut workbook, tables)?;

    workbook
        .save(&resolved)
        .with_context(|| format!("writing workbook to {}", resolved.display()))?;
    Ok(resolved)
}

/// If `path` exists, appends `_0`, `_1`, … to the stem until a free path is
/// found (§6's debug-time collision policy).
fn resolve_collision(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().to_string());
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut i = 0u32;
    loop {
        let candidate_name = match &ext {
            Some(ext) => format!("{stem}_{i}.{ext}"),
            None => format!("{stem}_{i}"),
        };
        let candidate = parent.join(candidate_name);
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

fn write_schedule_sheet(workbook: &mut Workbook, tables: &Tables) -> Result<()> {
    let sheet = workbook.add_worksheet().set_name("Schedule")?;

    let headers = ["Name", "Size", "Period", "Start_Frame", "Offset"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write(0, col as u16, *header)?;
    }
    for (row, obj) in tables.objects.iter().enumerate() {
        let r = row as u32 + 1;
        sheet.write(r, 0, obj.name.as_str())?;
        sheet.write(r, 1, obj.size_bits)?;
        sheet.write(r, 2, obj.period)?;
        match obj.start_frame {
            Some(v) => sheet.write(r, 3, v)?,
            None => sheet.write_blank(r, 3, &Default::default())?,
        };
        match obj.offset_bits {
            Some(v) => sheet.write(r, 4, v)?,
            None => sheet.write_blank(r, 4, &Default::default())?,
        };
    }

    // Two blank columns, then the Schedule table (§6).
    let schedule_start_col = headers.len() as u16 + 2;
    let num_frames = tables.schedule.first().map(|r| r.occurrence.len()).unwrap_or(0);
    for frame in 0..num_frames {
        sheet.write(0, schedule_start_col + frame as u16, frame as u32)?;
    }
    for (row, schedule_row) in tables.schedule.iter().enumerate() {
        let r = row as u32 + 1;
        for (frame, &present) in schedule_row.occurrence.iter().enumerate() {
            let value = if present { schedule_row.name.as_str() } else { "" };
            sheet.write(r, schedule_start_col + frame as u16, value)?;
        }
    }
    Ok(())
}

fn write_memory_map_sheet(workbook: &mut Workbook, tables: &Tables) -> Result<()> {
    let sheet = workbook.add_worksheet().set_name("Memory_Map")?;
    sheet.write(0, 0, "Bits")?;
    let num_frames = tables.memory_map.first().map(|row| row.len()).unwrap_or(0);
    for frame in 0..num_frames {
        sheet.write(0, frame as u16 + 1, frame as u32)?;
    }
    for (bit, row) in tables.memory_map.iter().enumerate() {
        let r = bit as u32 + 1;
        sheet.write(r, 0, bit as u32)?;
        for (frame, cell) in row.iter().enumerate() {
            sheet.write(r, frame as u16 + 1, cell.as_str())?;
        }
    }
    Ok(())
}

/// Frame Order is stored per frame; the sheet lays frames across columns
/// with one row per position within the frame (§6: "transposed").
fn write_frame_order_sheet(workbook: &mut Workbook, tables: &Tables) -> Result<()> {
    let sheet = workbook.add_worksheet().set_name("Frame Order")?;
    let num_frames = tables.frame_order.len();
    let max_entries = tables.frame_order.iter().map(Vec::len).max().unwrap_or(0);

    for frame in 0..num_frames {
        sheet.write(0, frame as u16, frame as u32)?;
    }
    for position in 0..max_entries {
        let r = position as u32 + 1;
        for (frame, entries) in tables.frame_order.iter().enumerate() {
            if let Some(name) = entries.get(position) {
                sheet.write(r, frame as u16, name.as_str())?;
            }
        }
    }
    Ok(())
}

fn write_frame_summary_sheet(workbook: &mut Workbook, tables: &Tables) -> Result<()> {
    let sheet = workbook.add_worksheet().set_name("Frame_Summary")?;
    sheet.write(0, 0, "Objects")?;
    let summary = &tables.frame_summary;
    let num_frames = summary.cells.first().map(Vec::len).unwrap_or(0);
    for frame in 0..num_frames {
        sheet.write(0, frame as u16 + 1, frame as u32)?;
    }
    for (row, name) in summary.object_order.iter().enumerate() {
        let r = row as u32 + 1;
        sheet.write(r, 0, name.as_str())?;
        for (frame, cell) in summary.cells[row].iter().enumerate() {
            if let Some(start_bit) = cell {
                sheet.write(r, frame as u16 + 1, *start_bit)?;
            }
        }
    }
    Ok(())
}
