//! Model builder (component C3): emits decision variables, pinning,
//! phase-selection booleans, per-frame no-overlap, and the two objective
//! auxiliaries onto a [`ConstraintBackend`].

use crate::backend::{BoolVarId, ConstraintBackend, IntVarId};
use crate::normalize::NormalizedModel;

/// Per-point solver handles. Lives alongside, never inside, [`crate::object::PointObject`].
#[derive(Debug, Clone)]
pub struct Decision {
    pub start_unit: IntVarId,
    pub end_unit: IntVarId,
    /// Empty when the point has a pinned `start_frame` or `period == 1`;
    /// otherwise one boolean per phase, exactly one of which is true.
    pub phase_vars: Vec<BoolVarId>,
}

/// Everything the solver driver (§4.4) needs after the model is built.
pub struct BuiltModel {
    pub decisions: Vec<Decision>,
    pub total_util: IntVarId,
    pub max_end: IntVarId,
}

/// Builds the full constraint model for `normalized` onto `backend`.
#[tracing::instrument(skip(backend, normalized))]
pub fn build_model<B: ConstraintBackend>(backend: &mut B, normalized: &NormalizedModel) -> BuiltModel {
    let unit = normalized.unit as i64;
    let cap = normalized.cap as i64;

    let decisions: Vec<Decision> = normalized
        .points
        .iter()
        .map(|point| {
            let size_units = point.size_bits as i64 / unit;
            let start_unit =
                backend.new_int_var(0, cap - size_units, &format!("sb_{}", point.name));

            if let Some(offset_bits) = point.offset_bits {
                backend.add_equal_const(start_unit, offset_bits as i64 / unit);
            }

            let phase_vars = if point.start_frame.is_none() && point.period > 1 {
                let vars: Vec<BoolVarId> = (0..point.period)
                    .map(|s| backend.new_bool_var(&format!("phase_{}_{s}", point.name)))
                    .collect();
                backend.add_exactly_one(&vars);
                vars
            } else {
                Vec::new()
            };

            let end_unit = backend.new_int_var(0, cap, &format!("end_{}", point.name));
            backend.add_equal_offset(start_unit, size_units, end_unit);

            Decision {
                start_unit,
                end_unit,
                phase_vars,
            }
        })
        .collect();

    add_group_constraints(backend, normalized, &decisions);
    add_frame_no_overlap(backend, normalized, &decisions);

    let total_util_value: i64 = normalized
        .points
        .iter()
        .map(|p| p.size_bits as i64 * (normalized.config.num_frames as i64 / p.period as i64))
        .sum();
    let total_util = backend.new_constant(total_util_value);

    let end_units: Vec<IntVarId> = decisions.iter().map(|d| d.end_unit).collect();
    let max_end = backend.new_int_var(0, cap, "max_end");
    backend.add_max_equality(max_end, &end_units);

    BuiltModel {
        decisions,
        total_util,
        max_end,
    }
}

fn add_group_constraints<B: ConstraintBackend>(
    backend: &mut B,
    normalized: &NormalizedModel,
    decisions: &[Decision],
) {
    let unit = normalized.unit as i64;
    for span in &normalized.groups {
        for i in span.first_index..span.first_index + span.len - 1 {
            let p1 = &normalized.points[i];
            let p2 = &normalized.points[i + 1];
            let d1 = &decisions[i];
            let d2 = &decisions[i + 1];

            if !d1.phase_vars.is_empty() && !d2.phase_vars.is_empty() {
                for (s, (&a, &b)) in d1.phase_vars.iter().zip(d2.phase_vars.iter()).enumerate() {
                    let _ = s;
                    backend.add_bool_equal(a, b);
                }
            }

            let size_units = p1.size_bits as i64 / unit;
            backend.add_equal_offset(d1.start_unit, size_units, d2.start_unit);
        }
    }
}

fn add_frame_no_overlap<B: ConstraintBackend>(
    backend: &mut B,
    normalized: &NormalizedModel,
    decisions: &[Decision],
) {
    let unit = normalized.unit as i64;
    let num_frames = normalized.config.num_frames;

    for frame in 0..num_frames {
        let mut intervals = Vec::new();
        for (i, point) in normalized.points.iter().enumerate() {
            let decision = &decisions[i];
            let size_units = point.size_bits as i64 / unit;
            let period = point.period;

            if point.start_frame.is_some() || period == 1 {
                let start_frame = point.start_frame.unwrap_or(0);
                if frame >= start_frame && (frame - start_frame) % period == 0 {
                    let name = format!("intv_{}_{frame}", point.name);
                    let interval = backend.new_interval(
                        decision.start_unit,
                        size_units,
                        decision.end_unit,
                        &name,
                    );
                    intervals.push(interval);
                }
            } else {
                for (s, &phase_var) in decision.phase_vars.iter().enumerate() {
                    if frame % period == s as u32 {
                        let name = format!("intv_{}_{frame}_{s}", point.name);
                        let interval = backend.new_optional_interval(
                            decision.start_unit,
                            size_units,
                            decision.end_unit,
                            phase_var,
                            &name,
                        );
                        intervals.push(interval);
                    }
                }
            }
        }
        backend.add_no_overlap(&intervals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BoolVarId, IntVarId, IntervalId, Objective, SolveParams, SolveStatus};
    use crate::normalize::{normalize, PackerConfig};
    use crate::object::PointObject;
    use std::collections::HashMap;

    /// A backend that records every call instead of solving anything. Used
    /// to test the shape of the emitted model without a real CP-SAT solve.
    #[derive(Default)]
    struct RecordingBackend {
        next_int: u32,
        next_bool: u32,
        next_interval: u32,
        pub int_bounds: HashMap<u32, (i64, i64)>,
        pub const_eqs: Vec<(IntVarId, i64)>,
        pub offset_eqs: Vec<(IntVarId, i64, IntVarId)>,
        pub exactly_one_calls: Vec<Vec<BoolVarId>>,
        pub no_overlap_calls: Vec<Vec<IntervalId>>,
        pub max_equality: Option<(IntVarId, Vec<IntVarId>)>,
    }

    impl ConstraintBackend for RecordingBackend {
        fn new_int_var(&mut self, lo: i64, hi: i64, _name: &str) -> IntVarId {
            let id = self.next_int;
            self.next_int += 1;
            self.int_bounds.insert(id, (lo, hi));
            IntVarId(id)
        }
        fn new_bool_var(&mut self, _name: &str) -> BoolVarId {
            let id = self.next_bool;
            self.next_bool += 1;
            BoolVarId(id)
        }
        fn new_constant(&mut self, _value: i64) -> IntVarId {
            let id = self.next_int;
            self.next_int += 1;
            IntVarId(id)
        }
        fn add_equal(&mut self, _a: IntVarId, _b: IntVarId) {}
        fn add_equal_const(&mut self, a: IntVarId, value: i64) {
            self.const_eqs.push((a, value));
        }
        fn add_equal_offset(&mut self, base: IntVarId, offset: i64, target: IntVarId) {
            self.offset_eqs.push((base, offset, target));
        }
        fn add_bool_equal(&mut self, _a: BoolVarId, _b: BoolVarId) {}
        fn add_exactly_one(&mut self, vars: &[BoolVarId]) {
            self.exactly_one_calls.push(vars.to_vec());
        }
        fn new_interval(&mut self, _start: IntVarId, _size: i64, _end: IntVarId, _name: &str) -> IntervalId {
            let id = self.next_interval;
            self.next_interval += 1;
            IntervalId(id)
        }
        fn new_optional_interval(
            &mut self,
            _start: IntVarId,
            _size: i64,
            _end: IntVarId,
            _presence: BoolVarId,
            _name: &str,
        ) -> IntervalId {
            let id = self.next_interval;
            self.next_interval += 1;
            IntervalId(id)
        }
        fn add_no_overlap(&mut self, intervals: &[IntervalId]) {
            self.no_overlap_calls.push(intervals.to_vec());
        }
        fn add_max_equality(&mut self, target: IntVarId, terms: &[IntVarId]) {
            self.max_equality = Some((target, terms.to_vec()));
        }
        fn add_hint_int(&mut self, _var: IntVarId, _value: i64) {}
        fn add_hint_bool(&mut self, _var: BoolVarId, _value: bool) {}
        fn solve(&mut self, _objective: Objective, _params: &SolveParams) -> SolveStatus {
            SolveStatus::Optimal
        }
        fn int_value(&self, _var: IntVarId) -> i64 {
            0
        }
        fn bool_value(&self, _var: BoolVarId) -> bool {
            false
        }
    }

    #[test]
    fn pinned_offset_point_has_no_phase_vars_and_one_const_eq() {
        let objs = vec![PointObject::new("A", 32, 32).with_offset_bytes(8).into()];
        let model = normalize(objs, PackerConfig::new(1000, "x.xlsx")).unwrap();
        let mut backend = RecordingBackend::default();
        let built = build_model(&mut backend, &model);

        assert!(built.decisions[0].phase_vars.is_empty());
        assert_eq!(backend.const_eqs.len(), 1);
        // offset_bits=64, unit=16 => 4
        assert_eq!(backend.const_eqs[0].1, 4);
    }

    #[test]
    fn unpinned_periodic_point_gets_exactly_one_phase() {
        let objs = vec![PointObject::new("A", 16, 4).into()];
        let model = normalize(objs, PackerConfig::new(2, "x.xlsx").with_num_frames(4)).unwrap();
        let mut backend = RecordingBackend::default();
        let built = build_model(&mut backend, &model);

        assert_eq!(built.decisions[0].phase_vars.len(), 4);
        assert_eq!(backend.exactly_one_calls.len(), 1);
        assert_eq!(backend.exactly_one_calls[0].len(), 4);
    }

    #[test]
    fn group_emits_one_contiguity_constraint_per_adjacent_pair() {
        use crate::object::GroupBuilder;
        let group = GroupBuilder::new(
            16,
            vec![
                PointObject::new("A", 16, 1),
                PointObject::new("B", 32, 1),
                PointObject::new("C", 8, 1),
            ],
        )
        .start_frame(1)
        .offset_bytes(8)
        .build();
        let model = normalize(vec![group.into()], PackerConfig::new(1000, "x.xlsx")).unwrap();
        let mut backend = RecordingBackend::default();
        build_model(&mut backend, &model);

        // 3 end_unit derivations + 2 group-contiguity = 5 offset equalities.
        assert_eq!(backend.offset_eqs.len(), 5);
    }

    #[test]
    fn emits_one_no_overlap_per_frame() {
        let objs = vec![PointObject::new("A", 8, 1).into()];
        let model = normalize(objs, PackerConfig::new(1, "x.xlsx").with_num_frames(4)).unwrap();
        let mut backend = RecordingBackend::default();
        build_model(&mut backend, &model);
        assert_eq!(backend.no_overlap_calls.len(), 4);
    }
}
