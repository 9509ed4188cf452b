//! Public entry point tying normalization, model building, the two-stage
//! solve, and result materialization into one `pack()` call.

use std::path::PathBuf;

use tracing::instrument;

use crate::backend::SolveParams;
use crate::build::build_model;
use crate::cp_sat_backend::CpSatBackend;
use crate::error::Result;
use crate::normalize::{normalize, PackerConfig};
use crate::object::PointOrGroup;
use crate::solve::{two_stage_solve, SolveOutcome};
use crate::tables::{materialize, Tables};

/// Everything a caller needs after a successful pack: the five result
/// tables, the solve outcome (for logging/diagnostics), and the output
/// path the caller asked for (so the CLI can hand it to the workbook
/// writer without re-threading the config through).
pub struct PackedResult {
    pub tables: Tables,
    pub outcome: SolveOutcome,
    pub output_path: PathBuf,
}

/// Owns one packing run end to end. Not reusable: [`Packer::pack`]
/// consumes `self`, so a packer that has already failed or succeeded
/// cannot be called again (§7).
pub struct Packer {
    objects: Vec<PointOrGroup>,
    config: PackerConfig,
    solve_params: SolveParams,
}

impl Packer {
    pub fn new(objects: Vec<PointOrGroup>, config: PackerConfig) -> Self {
        Self {
            objects,
            config,
            solve_params: SolveParams::default(),
        }
    }

    pub fn with_solve_params(mut self, solve_params: SolveParams) -> Self {
        self.solve_params = solve_params;
        self
    }

    #[instrument(skip(self), fields(num_objects = self.objects.len()))]
    pub fn pack(self) -> Result<PackedResult> {
        let output_path = self.config.output_path.clone();
        let normalized = normalize(self.objects, self.config)?;

        let mut backend = CpSatBackend::new();
        let built = build_model(&mut backend, &normalized);
        let outcome = two_stage_solve(&mut backend, &built, &self.solve_params)?;
        let tables = materialize(&backend, &normalized, &built);

        Ok(PackedResult {
            tables,
            outcome,
            output_path,
        })
    }
}
