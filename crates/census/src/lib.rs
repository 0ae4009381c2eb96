//! `supas-census`: SUPAS household census engine.
//!
//! Pure engine crate: receives pre-loaded extraction documents, returns the
//! reconciled, flattened and derived per-member table. No CLI or IO dependencies.

pub mod config;
pub mod derive;
pub mod error;
pub mod flatten;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod table;

pub use config::CensusConfig;
pub use error::CensusError;
pub use model::{DerivedRow, DocumentInput, FlatRow, HouseholdRecord, RawDocument};
pub use pipeline::{run, PipelineOutput, RunContext};
pub use table::{CensusTable, FilterCriteria, TableSummary};
