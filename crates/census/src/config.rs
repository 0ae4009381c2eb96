use serde::Deserialize;

use crate::derive::ReferenceEpoch;
use crate::error::CensusError;
use crate::pipeline::DEFAULT_SEED;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration. Every section is optional; an empty file is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CensusConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub derive: DeriveConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Directory searched for extraction documents.
    #[serde(default = "default_dir")]
    pub dir: String,
    /// Glob pattern matched against file names in `dir`.
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

fn default_dir() -> String {
    ".".into()
}

fn default_pattern() -> String {
    "supas_extraction*.json".into()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            pattern: default_pattern(),
        }
    }
}

// ---------------------------------------------------------------------------
// Derive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeriveConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_reference_year")]
    pub reference_year: i64,
    #[serde(default = "default_reference_month")]
    pub reference_month: u32,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_reference_year() -> i64 {
    ReferenceEpoch::default().year
}

fn default_reference_month() -> u32 {
    ReferenceEpoch::default().month
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            reference_year: default_reference_year(),
            reference_month: default_reference_month(),
        }
    }
}

impl DeriveConfig {
    pub fn epoch(&self) -> ReferenceEpoch {
        ReferenceEpoch {
            year: self.reference_year,
            month: self.reference_month,
        }
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Upper bound on auto-fitted spreadsheet column widths, in characters.
    #[serde(default = "default_max_column_width")]
    pub max_column_width: usize,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_sheet_name() -> String {
    "Data ART".into()
}

fn default_max_column_width() -> usize {
    50
}

fn default_file_prefix() -> String {
    "supas_art_data".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            max_column_width: default_max_column_width(),
            file_prefix: default_file_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CensusConfig {
    pub fn from_toml(input: &str) -> Result<Self, CensusError> {
        let config: CensusConfig =
            toml::from_str(input).map_err(|e| CensusError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CensusError> {
        if !(1..=12).contains(&self.derive.reference_month) {
            return Err(CensusError::ConfigValidation(format!(
                "reference_month must be 1-12, got {}",
                self.derive.reference_month
            )));
        }

        if !(1..=9999).contains(&self.derive.reference_year) {
            return Err(CensusError::ConfigValidation(format!(
                "reference_year must be 1-9999, got {}",
                self.derive.reference_year
            )));
        }

        if self.input.pattern.trim().is_empty() {
            return Err(CensusError::ConfigValidation("input pattern must not be empty".into()));
        }

        if self.export.max_column_width == 0 {
            return Err(CensusError::ConfigValidation(
                "max_column_width must be greater than 0".into(),
            ));
        }

        // Excel caps sheet names at 31 characters.
        if self.export.sheet_name.is_empty() || self.export.sheet_name.chars().count() > 31 {
            return Err(CensusError::ConfigValidation(format!(
                "sheet_name must be 1-31 characters, got '{}'",
                self.export.sheet_name
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
