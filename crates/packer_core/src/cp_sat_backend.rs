//! Production [`ConstraintBackend`] implementation over the `cp_sat`
//! CP-SAT binding. Every call here maps one-for-one onto the model the
//! original implementation built with `ortools.sat.python.cp_model`
//! (see `examples/original_source/FormatPacker.py` `_build_model`).

use std::collections::HashMap;

use cp_sat::builder::CpModelBuilder;
use cp_sat::proto::CpSolverStatus;

use crate::backend::{
    BoolVarId, ConstraintBackend, IntVarId, IntervalId, Objective, SolveParams, SolveStatus,
};

pub struct CpSatBackend {
    model: CpModelBuilder,
    int_vars: Vec<cp_sat::builder::IntVar>,
    bool_vars: Vec<cp_sat::builder::BoolVar>,
    intervals: Vec<cp_sat::builder::IntervalVar>,
    response: Option<cp_sat::proto::CpSolverResponse>,
    hint_ints: HashMap<u32, i64>,
    hint_bools: HashMap<u32, bool>,
}

impl Default for CpSatBackend {
    fn default() -> Self {
        Self {
            model: CpModelBuilder::default(),
            int_vars: Vec::new(),
            bool_vars: Vec::new(),
            intervals: Vec::new(),
            response: None,
            hint_ints: HashMap::new(),
            hint_bools: HashMap::new(),
        }
    }
}

impl CpSatBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn response(&self) -> &cp_sat::proto::CpSolverResponse {
        self.response
            .as_ref()
            .expect("int_value/bool_value called before a usable solve()")
    }
}

impl ConstraintBackend for CpSatBackend {
    fn new_int_var(&mut self, lo: i64, hi: i64, name: &str) -> IntVarId {
        let var = self.model.new_int_var_with_name(lo, hi, name);
        let id = self.int_vars.len() as u32;
        self.int_vars.push(var);
        IntVarId(id)
    }

    fn new_bool_var(&mut self, name: &str) -> BoolVarId {
        let var = self.model.new_bool_var_with_name(name);
        let id = self.bool_vars.len() as u32;
        self.bool_vars.push(var);
        BoolVarId(id)
    }

    fn new_constant(&mut self, value: i64) -> IntVarId {
        let var = self.model.new_constant(value);
        let id = self.int_vars.len() as u32;
        self.int_vars.push(var);
        IntVarId(id)
    }

    fn add_equal(&mut self, a: IntVarId, b: IntVarId) {
        self.model
            .add_eq(self.int_vars[a.0 as usize], self.int_vars[b.0 as usize]);
    }

    fn add_equal_const(&mut self, a: IntVarId, value: i64) {
        self.model.add_eq(self.int_vars[a.0 as usize], value);
    }

    fn add_equal_offset(&mut self, base: IntVarId, offset: i64, target: IntVarId) {
        let expr = self.int_vars[base.0 as usize] + offset;
        self.model.add_eq(self.int_vars[target.0 as usize], expr);
    }

    fn add_bool_equal(&mut self, a: BoolVarId, b: BoolVarId) {
        self.model
            .add_eq(self.bool_vars[a.0 as usize], self.bool_vars[b.0 as usize]);
    }

    fn add_exactly_one(&mut self, vars: &[BoolVarId]) {
        let lits: Vec<_> = vars.iter().map(|v| self.bool_vars[v.0 as usize]).collect();
        self.model.add_exactly_one(lits);
    }

    fn new_interval(&mut self, start: IntVarId, size: i64, end: IntVarId, name: &str) -> IntervalId {
        let interval = self.model.new_interval_var_with_name(
            self.int_vars[start.0 as usize],
            size,
            self.int_vars[end.0 as usize],
            name,
        );
        let id = self.intervals.len() as u32;
        self.intervals.push(interval);
        IntervalId(id)
    }

    fn new_optional_interval(
        &mut self,
        start: IntVarId,
        size: i64,
        end: IntVarId,
        presence: BoolVarId,
        name: &str,
    ) -> IntervalId {
        let interval = self.model.new_optional_interval_var_with_name(
            self.int_vars[start.0 as usize],
            size,
            self.int_vars[end.0 as usize],
            self.bool_vars[presence.0 as usize],
            name,
        );
        let id = self.intervals.len() as u32;
        self.intervals.push(interval);
        IntervalId(id)
    }

    fn add_no_overlap(&mut self, intervals: &[IntervalId]) {
        let ivs: Vec<_> = intervals
            .iter()
            .map(|i| self.intervals[i.0 as usize])
            .collect();
        self.model.add_no_overlap(ivs);
    }

    fn add_max_equality(&mut self, target: IntVarId, terms: &[IntVarId]) {
        let exprs: Vec<_> = terms.iter().map(|t| self.int_vars[t.0 as usize]).collect();
        self.model
            .add_max_equality(self.int_vars[target.0 as usize], exprs);
    }

    fn add_hint_int(&mut self, var: IntVarId, value: i64) {
        self.hint_ints.insert(var.0, value);
    }

    fn add_hint_bool(&mut self, var: BoolVarId, value: bool) {
        self.hint_bools.insert(var.0, value);
    }

    fn solve(&mut self, objective: Objective, params: &SolveParams) -> SolveStatus {
        for (&idx, &value) in &self.hint_ints {
            self.model.add_hint(self.int_vars[idx as usize], value);
        }
        for (&idx, &value) in &self.hint_bools {
            self.model.add_hint(self.bool_vars[idx as usize], value);
        }

        match objective {
            Objective::Maximize(var) => self.model.maximize(self.int_vars[var.0 as usize]),
            Objective::Minimize(var) => self.model.minimize(self.int_vars[var.0 as usize]),
        }

        let mut solver = cp_sat::builder::CpSolver::default();
        solver.parameters.random_seed = params.random_seed as i32;
        solver.parameters.num_search_workers = params.num_workers;
        solver.parameters.max_time_in_seconds = params.max_time_seconds;

        let response = solver.solve(&self.model);
        let status = match response.status() {
            CpSolverStatus::Optimal => SolveStatus::Optimal,
            CpSolverStatus::Feasible => SolveStatus::Feasible,
            CpSolverStatus::Infeasible => SolveStatus::Infeasible,
            _ => SolveStatus::Unknown,
        };
        self.response = Some(response);
        status
    }

    fn int_value(&self, var: IntVarId) -> i64 {
        self.response().int_value(self.int_vars[var.0 as usize])
    }

    fn bool_value(&self, var: BoolVarId) -> bool {
        self.response().bool_value(self.bool_vars[var.0 as usize])
    }
}
