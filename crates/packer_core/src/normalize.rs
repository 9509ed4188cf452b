//! Input normalization (component C2): flatten groups, propagate group
//! attributes, validate invariants, and derive the solver's unit scale.

use std::path::PathBuf;

use crate::error::{PackerError, Result, ValidationRule};
use crate::object::{PointObject, PointOrGroup};

/// Scalar configuration accompanying a packing run.
#[derive(Debug, Clone)]
pub struct PackerConfig {
    pub frame_size_bytes: u32,
    pub num_frames: u32,
    pub output_path: PathBuf,
}

impl PackerConfig {
    pub fn new(frame_size_bytes: u32, output_path: impl Into<PathBuf>) -> Self {
        Self {
            frame_size_bytes,
            num_frames: 32,
            output_path: output_path.into(),
        }
    }

    pub fn with_num_frames(mut self, num_frames: u32) -> Self {
        self.num_frames = num_frames;
        self
    }

    pub fn frame_size_bits(&self) -> u32 {
        self.frame_size_bytes * 8
    }
}

/// The contiguous run of flattened points belonging to one group, used by
/// the model builder to emit adjacency constraints (§4.3).
#[derive(Debug, Clone, Copy)]
pub struct GroupSpan {
    pub first_index: usize,
    pub len: usize,
}

/// The validated, flattened input to the model builder.
#[derive(Debug, Clone)]
pub struct NormalizedModel {
    pub points: Vec<PointObject>,
    pub groups: Vec<GroupSpan>,
    pub config: PackerConfig,
    pub unit: u32,
    pub cap: u32,
}

/// Flattens, propagates, validates, and derives `UNIT`/`CAP` for a mixed
/// list of points and groups.
#[tracing::instrument(skip(objects, config))]
pub fn normalize(objects: Vec<PointOrGroup>, config: PackerConfig) -> Result<NormalizedModel> {
    let mut points = Vec::with_capacity(objects.len());
    let mut groups = Vec::new();

    for obj in objects {
        match obj {
            PointOrGroup::Point(p) => points.push(p),
            PointOrGroup::Group(g) => {
                if g.members.is_empty() {
                    return Err(PackerError::Validation {
                        object: g.name,
                        rule: ValidationRule::GroupNonEmpty,
                    });
                }
                let first_index = points.len();
                let len = g.members.len();
                points.extend(g.members);
                groups.push(GroupSpan { first_index, len });
            }
        }
    }

    let frame_size_bits = config.frame_size_bits();
    for point in &points {
        validate_point(point, frame_size_bits, config.num_frames)?;
    }

    let unit = derive_unit(&points, frame_size_bits);
    let cap = frame_size_bits / unit;

    Ok(NormalizedModel {
        points,
        groups,
        config,
        unit,
        cap,
    })
}

fn validate_point(point: &PointObject, frame_size_bits: u32, num_frames: u32) -> Result<()> {
    let fail = |rule| {
        Err(PackerError::Validation {
            object: point.name.clone(),
            rule,
        })
    };

    if point.size_bits == 0 {
        return fail(ValidationRule::SizePositive);
    }
    if point.size_bits > frame_size_bits {
        return fail(ValidationRule::SizeWithinFrame);
    }
    if point.period == 0 {
        return fail(ValidationRule::PeriodPositive);
    }
    if let Some(start_frame) = point.start_frame {
        if start_frame >= num_frames {
            return fail(ValidationRule::StartFrameInRange);
        }
    }
    if let Some(offset_bits) = point.offset_bits {
        if offset_bits + point.size_bits > frame_size_bits {
            return fail(ValidationRule::OffsetWithinFrame);
        }
    }
    if num_frames % point.period != 0 {
        return fail(ValidationRule::PeriodDividesNumFrames);
    }
    Ok(())
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// `UNIT = gcd(all sizes, all pinned offsets, frame_size_bits)`. Defaults to
/// `frame_size_bits` when there are no points (§4.2, point 4).
fn derive_unit(points: &[PointObject], frame_size_bits: u32) -> u32 {
    if points.is_empty() {
        return frame_size_bits;
    }
    let mut unit = frame_size_bits;
    for point in points {
        unit = gcd(unit, point.size_bits);
        if let Some(offset_bits) = point.offset_bits {
            unit = gcd(unit, offset_bits);
        }
    }
    unit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::GroupBuilder;

    fn config(frame_size_bytes: u32, num_frames: u32) -> PackerConfig {
        PackerConfig::new(frame_size_bytes, "out.xlsx").with_num_frames(num_frames)
    }

    #[test]
    fn rejects_size_over_frame() {
        let objs = vec![PointObject::new("A", 9999, 1).into()];
        let err = normalize(objs, config(1, 4)).unwrap_err();
        assert!(matches!(
            err,
            PackerError::Validation {
                rule: ValidationRule::SizeWithinFrame,
                ..
            }
        ));
    }

    #[test]
    fn rejects_start_frame_out_of_range() {
        let objs = vec![PointObject::new("A", 8, 1).with_start_frame(4).into()];
        let err = normalize(objs, config(1, 4)).unwrap_err();
        assert!(matches!(
            err,
            PackerError::Validation {
                rule: ValidationRule::StartFrameInRange,
                ..
            }
        ));
    }

    #[test]
    fn rejects_offset_overflow() {
        let objs = vec![PointObject::new("A", 8, 1).with_offset_bytes(100).into()];
        let err = normalize(objs, config(1, 4)).unwrap_err();
        assert!(matches!(
            err,
            PackerError::Validation {
                rule: ValidationRule::OffsetWithinFrame,
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_divisor_period() {
        let objs = vec![PointObject::new("A", 8, 5).into()];
        let err = normalize(objs, config(1000, 32)).unwrap_err();
        assert!(matches!(
            err,
            PackerError::Validation {
                rule: ValidationRule::PeriodDividesNumFrames,
                ..
            }
        ));
    }

    #[test]
    fn flattens_groups_and_records_spans() {
        let group = GroupBuilder::new(16, vec![PointObject::new("A", 16, 1), PointObject::new("B", 32, 1)])
            .start_frame(1)
            .offset_bytes(8)
            .build();
        let objs = vec![PointObject::new("Z", 8, 1).into(), group.into()];
        let model = normalize(objs, config(1000, 32)).unwrap();
        assert_eq!(model.points.len(), 3);
        assert_eq!(model.groups.len(), 1);
        assert_eq!(model.groups[0].first_index, 1);
        assert_eq!(model.groups[0].len, 2);
    }

    #[test]
    fn empty_point_set_defaults_unit_to_frame_size() {
        let model = normalize(vec![], config(1000, 32)).unwrap();
        assert_eq!(model.unit, 8000);
        assert_eq!(model.cap, 1);
    }

    #[test]
    fn unit_is_gcd_of_sizes_offsets_and_frame_size() {
        let objs = vec![
            PointObject::new("A", 32, 32).with_offset_bytes(8).into(),
            PointObject::new("B", 16, 32).into(),
        ];
        let model = normalize(objs, config(1000, 32)).unwrap();
        // gcd(32, 64, 16, 8000) = 16
        assert_eq!(model.unit, 16);
        assert_eq!(model.cap, 500);
    }
}
