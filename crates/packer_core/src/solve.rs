//! Two-stage lexicographic solver driver (component C4).

use tracing::{info, warn};

use crate::backend::{ConstraintBackend, Objective, SolveParams, SolveStatus};
use crate::build::BuiltModel;
use crate::error::{PackerError, Result};

/// The frozen, read-back result of a successful two-stage solve.
#[derive(Debug, Clone, Copy)]
pub struct SolveOutcome {
    pub total_util: i64,
    pub max_end: i64,
    /// `false` when stage 1 hit the time limit without proving optimality
    /// (a soft warning, not a failure — §7).
    pub stage1_proven: bool,
    pub stage2_proven: bool,
}

/// Runs stage 1 (maximize utilization), freezes it, seeds stage-2 hints,
/// then runs stage 2 (minimize peak end). See §4.4.
#[tracing::instrument(skip(backend, model, params))]
pub fn two_stage_solve<B: ConstraintBackend>(
    backend: &mut B,
    model: &BuiltModel,
    params: &SolveParams,
) -> Result<SolveOutcome> {
    let status1 = backend.solve(Objective::Maximize(model.total_util), params);
    let stage1_proven = classify_stage(status1, "stage 1 (maximize utilization)", true)?;
    let best_util = backend.int_value(model.total_util);
    info!(best_util, "stage 1 complete");

    for decision in &model.decisions {
        backend.add_hint_int(decision.start_unit, backend.int_value(decision.start_unit));
        for &phase_var in &decision.phase_vars {
            backend.add_hint_bool(phase_var, backend.bool_value(phase_var));
        }
    }
    backend.add_equal_const(model.total_util, best_util);

    let status2 = backend.solve(Objective::Minimize(model.max_end), params);
    let stage2_proven = classify_stage(status2, "stage 2 (minimize peak end)", false)?;
    let max_end = backend.int_value(model.max_end);
    info!(max_end, "stage 2 complete");

    Ok(SolveOutcome {
        total_util: best_util,
        max_end,
        stage1_proven,
        stage2_proven,
    })
}

/// Returns whether the stage's optimum was proven, or raises the
/// appropriately-named packing error for an infeasible/unknown status.
fn classify_stage(status: SolveStatus, stage_name: &str, is_stage1: bool) -> Result<bool> {
    match status {
        SolveStatus::Optimal => Ok(true),
        SolveStatus::Feasible => {
            warn!(
                stage = stage_name,
                "feasible solution found, optimality not proven (consider extending the time limit)"
            );
            Ok(false)
        }
        SolveStatus::Infeasible | SolveStatus::Unknown => {
            let reason = format!("no feasible solution found for {stage_name}");
            if is_stage1 {
                Err(PackerError::Stage1Infeasible { reason })
            } else {
                Err(PackerError::Stage2Infeasible { reason })
            }
        }
    }
}
