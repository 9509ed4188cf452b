//! The CP backend boundary (component C6).
//!
//! [`ConstraintBackend`] is the only thing the model builder (§4.3) and the
//! solver driver (§4.4) know about the underlying solver. It exposes
//! exactly the primitives the spec requires — bounded integers, booleans,
//! linear equalities, exactly-one, mandatory/optional intervals, no-overlap,
//! max-equality, a two-valued objective, hints, and a time-boxed solve — and
//! nothing else. [`crate::cp_sat_backend::CpSatBackend`] is the production
//! implementation; tests can swap in a fake.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntVarId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolVarId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalId(pub u32);

/// The packer's two-stage objective is always one scalar, maximized or
/// minimized; there is never a weighted combination (§4.4).
#[derive(Debug, Clone, Copy)]
pub enum Objective {
    Maximize(IntVarId),
    Minimize(IntVarId),
}

/// Deterministic solver parameters (§4.4: fixed seed, bounded wall clock).
#[derive(Debug, Clone, Copy)]
pub struct SolveParams {
    pub random_seed: i64,
    pub num_workers: i32,
    pub max_time_seconds: f64,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            random_seed: 42,
            num_workers: 16,
            max_time_seconds: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Solved to proven optimality.
    Optimal,
    /// A feasible solution was found but optimality was not proven before
    /// the time limit (§4.4, §7 soft warning).
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    pub fn is_usable(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    pub fn is_proven(self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

/// Narrow trait isolating every solver-specific call behind value types
/// (`IntVarId`/`BoolVarId`/`IntervalId`) so C3/C4 never touch the solver
/// crate directly.
pub trait ConstraintBackend {
    fn new_int_var(&mut self, lo: i64, hi: i64, name: &str) -> IntVarId;
    fn new_bool_var(&mut self, name: &str) -> BoolVarId;
    fn new_constant(&mut self, value: i64) -> IntVarId;

    fn add_equal(&mut self, a: IntVarId, b: IntVarId);
    fn add_equal_const(&mut self, a: IntVarId, value: i64);
    /// `target == base + offset`. Used for group contiguity and end-unit
    /// derivation, the only two places the model needs addition.
    fn add_equal_offset(&mut self, base: IntVarId, offset: i64, target: IntVarId);
    fn add_bool_equal(&mut self, a: BoolVarId, b: BoolVarId);
    fn add_exactly_one(&mut self, vars: &[BoolVarId]);

    fn new_interval(&mut self, start: IntVarId, size: i64, end: IntVarId, name: &str) -> IntervalId;
    fn new_optional_interval(
        &mut self,
        start: IntVarId,
        size: i64,
        end: IntVarId,
        presence: BoolVarId,
        name: &str,
    ) -> IntervalId;
    fn add_no_overlap(&mut self, intervals: &[IntervalId]);

    fn add_max_equality(&mut self, target: IntVarId, terms: &[IntVarId]);

    fn add_hint_int(&mut self, var: IntVarId, value: i64);
    fn add_hint_bool(&mut self, var: BoolVarId, value: bool);

    /// Sets the objective and solves under `params`, returning the status.
    /// Callers read back values via [`ConstraintBackend::int_value`] /
    /// [`ConstraintBackend::bool_value`] after a usable status.
    fn solve(&mut self, objective: Objective, params: &SolveParams) -> SolveStatus;

    fn int_value(&self, var: IntVarId) -> i64;
    fn bool_value(&self, var: BoolVarId) -> bool;
}
