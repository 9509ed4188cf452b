//! Result materializer (component C5): turns a solved assignment into the
//! five output tables described in §4.5 and §6.

use crate::backend::ConstraintBackend;
use crate::build::BuiltModel;
use crate::normalize::NormalizedModel;
use crate::object::ObjectRecord;

/// The solver's final answer for one point, read back from the backend
/// once and reused by every table below.
#[derive(Debug, Clone, Copy)]
struct Placement {
    start_bit: u32,
    chosen_phase: u32,
}

/// Whether `point` (with the given period/start_frame/chosen phase)
/// occurs in `frame` (§4.5).
fn occurs_in(start_frame: Option<u32>, chosen_phase: u32, period: u32, frame: u32) -> bool {
    match start_frame {
        Some(sf) => frame >= sf && (frame - sf) % period == 0,
        None => frame % period == chosen_phase,
    }
}

fn read_placements<B: ConstraintBackend>(
    backend: &B,
    normalized: &NormalizedModel,
    built: &BuiltModel,
) -> Vec<Placement> {
    normalized
        .points
        .iter()
        .zip(built.decisions.iter())
        .map(|(point, decision)| {
            let chosen_phase = if decision.phase_vars.is_empty() {
                point.start_frame.unwrap_or(0)
            } else {
                decision
                    .phase_vars
                    .iter()
                    .position(|&pv| backend.bool_value(pv))
                    .expect("exactly-one phase constraint guarantees a chosen phase") as u32
            };
            let start_bit = backend.int_value(decision.start_unit) as u32 * normalized.unit;
            Placement {
                start_bit,
                chosen_phase,
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ScheduleRow {
    pub name: String,
    /// One entry per frame; `true` iff the point occurs in that frame.
    pub occurrence: Vec<bool>,
}

#[derive(Debug, Clone)]
pub struct FrameEntry {
    pub name: String,
    pub start_bit: u32,
}

/// Rows indexed by point (ordered by first appearing frame, then start
/// bit), columns per frame, cell = start bit when the point occurs there.
#[derive(Debug, Clone)]
pub struct FrameSummaryTable {
    pub object_order: Vec<String>,
    /// `cells[row][frame]`, `None` when the point does not occur there.
    pub cells: Vec<Vec<Option<u32>>>,
}

#[derive(Debug, Clone)]
pub struct Tables {
    pub objects: Vec<ObjectRecord>,
    pub schedule: Vec<ScheduleRow>,
    /// `memory_map[bit][frame]`, empty string when unoccupied.
    pub memory_map: Vec<Vec<String>>,
    /// `frame_order[frame]`, names sorted by ascending start bit.
    pub frame_order: Vec<Vec<String>>,
    pub frame_summary: FrameSummaryTable,
}

/// Builds all five result tables from a solved model (§4.5).
#[tracing::instrument(skip(backend, normalized, built))]
pub fn materialize<B: ConstraintBackend>(
    backend: &B,
    normalized: &NormalizedModel,
    built: &BuiltModel,
) -> Tables {
    let placements = read_placements(backend, normalized, built);
    let num_frames = normalized.config.num_frames;
    let frame_size_bits = normalized.config.frame_size_bits();

    let objects = normalized.points.iter().map(|p| p.to_record()).collect();

    let schedule: Vec<ScheduleRow> = normalized
        .points
        .iter()
        .zip(placements.iter())
        .map(|(point, placement)| {
            let occurrence = (0..num_frames)
                .map(|f| occurs_in(point.start_frame, placement.chosen_phase, point.period, f))
                .collect();
            ScheduleRow {
                name: point.name.clone(),
                occurrence,
            }
        })
        .collect();

    let mut memory_map = vec![vec![String::new(); num_frames as usize]; frame_size_bits as usize];
    let mut frame_entries: Vec<Vec<FrameEntry>> = vec![Vec::new(); num_frames as usize];

    for (point, placement) in normalized.points.iter().zip(placements.iter()) {
        for frame in 0..num_frames {
            if occurs_in(point.start_frame, placement.chosen_phase, point.period, frame) {
                for bit in placement.start_bit..placement.start_bit + point.size_bits {
                    memory_map[bit as usize][frame as usize] = point.name.clone();
                }
                frame_entries[frame as usize].push(FrameEntry {
                    name: point.name.clone(),
                    start_bit: placement.start_bit,
                });
            }
        }
    }

    let mut frame_order = Vec::with_capacity(num_frames as usize);
    for entries in &mut frame_entries {
        entries.sort_by_key(|e| e.start_bit);
        frame_order.push(entries.iter().map(|e| e.name.clone()).collect());
    }

    let frame_summary = build_frame_summary(num_frames, &frame_entries);

    Tables {
        objects,
        schedule,
        memory_map,
        frame_order,
        frame_summary,
    }
}

fn build_frame_summary(num_frames: u32, frame_entries: &[Vec<FrameEntry>]) -> FrameSummaryTable {
    let mut first_bit: std::collections::BTreeMap<String, u32> = std::collections::BTreeMap::new();
    for entries in frame_entries {
        for entry in entries {
            first_bit
                .entry(entry.name.clone())
                .and_modify(|b| *b = (*b).min(entry.start_bit))
                .or_insert(entry.start_bit);
        }
    }

    // Sort by (start_bit, name) so ties resolve deterministically rather
    // than by map iteration order (§8 P8: identical inputs, identical
    // output tables).
    let mut object_order: Vec<String> = first_bit.keys().cloned().collect();
    object_order.sort_by_key(|name| (first_bit[name], name.clone()));

    let row_index: std::collections::HashMap<&str, usize> = object_order
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut cells = vec![vec![None; num_frames as usize]; object_order.len()];
    for (frame, entries) in frame_entries.iter().enumerate() {
        for entry in entries {
            let row = row_index[entry.name.as_str()];
            cells[row][frame] = Some(entry.start_bit);
        }
    }

    FrameSummaryTable {
        object_order,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurs_in_respects_pinned_start_frame() {
        assert!(!occurs_in(Some(4), 0, 32, 3));
        assert!(occurs_in(Some(4), 0, 32, 4));
        assert!(!occurs_in(Some(4), 0, 32, 5));
        assert!(occurs_in(Some(4), 0, 32, 36));
    }

    #[test]
    fn occurs_in_respects_chosen_phase_without_start_frame() {
        assert!(occurs_in(None, 1, 4, 1));
        assert!(occurs_in(None, 1, 4, 5));
        assert!(!occurs_in(None, 1, 4, 2));
    }
}
