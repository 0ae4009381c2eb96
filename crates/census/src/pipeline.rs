use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::CensusConfig;
use crate::derive::{derive, ReferenceEpoch};
use crate::error::CensusError;
use crate::flatten::flatten;
use crate::model::{DerivedRow, DocumentInput};
use crate::reconcile::{reconcile, ReconcileSummary};
use crate::table::CensusTable;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Per-run state: the seeded generator and the age reference epoch.
///
/// [`run`] reseeds the generator before deriving, so a context can be reused
/// across runs without one run's draws leaking into the next.
#[derive(Debug, Clone)]
pub struct RunContext {
    seed: u64,
    rng: StdRng,
    pub epoch: ReferenceEpoch,
}

impl RunContext {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            epoch: ReferenceEpoch::default(),
        }
    }

    pub fn from_config(config: &CensusConfig) -> Self {
        Self::new(config.derive.seed).with_epoch(config.derive.epoch())
    }

    pub fn with_epoch(mut self, epoch: ReferenceEpoch) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Restart the random stream from the configured seed.
    pub fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: CensusTable,
    pub reconcile: ReconcileSummary,
    /// Per-document load failures that were skipped.
    pub warnings: Vec<String>,
}

/// Reconcile, flatten, derive and sort.
pub fn run(documents: Vec<DocumentInput>, ctx: &mut RunContext) -> Result<PipelineOutput, CensusError> {
    let reconciliation = reconcile(documents)?;
    let summary = reconciliation.summary.clone();
    let warnings = reconciliation.warnings.clone();

    let flat = flatten(reconciliation.records());

    ctx.reseed();
    let derived: Vec<DerivedRow> = flat.into_iter().map(|row| derive(row, ctx)).collect();
    let table = CensusTable::build(derived);

    log::info!(
        "processed {} member row(s) from {} household(s) (seed {})",
        table.len(),
        summary.total_records,
        ctx.seed()
    );

    Ok(PipelineOutput {
        table,
        reconcile: summary,
        warnings,
    })
}
