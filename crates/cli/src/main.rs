// supas - SUPAS household extraction reconciliation, queries and export

mod exit_codes;
mod export;
mod query;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use supas_census::{CensusConfig, CensusError, FilterCriteria, PipelineOutput, RunContext};
use supas_io::IoError;

use exit_codes::{
    EXIT_ERROR, EXIT_EXPORT, EXIT_INVALID_CONFIG, EXIT_NO_DATA, EXIT_NO_MATCHES, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "supas")]
#[command(about = "Merge SUPAS household extraction snapshots into one member table")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Where the documents come from and how the run is seeded. Flags win over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Directory holding the extraction files
    #[arg(long, global = true, env = "SUPAS_DIR")]
    pub dir: Option<PathBuf>,

    /// File-name glob inside --dir [default: supas_extraction*.json]
    #[arg(long, global = true)]
    pub pattern: Option<String>,

    /// TOML run config
    #[arg(long, global = true, env = "SUPAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for the generated income and working-time fields [default: 42]
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

/// Location criteria shared by every query command. Omitted means "all".
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Province (provinsi)
    #[arg(long)]
    pub region: Option<String>,

    /// District (kecamatan)
    #[arg(long)]
    pub sub_region: Option<String>,

    /// Village (desa_kelurahan)
    #[arg(long)]
    pub sub_district: Option<String>,
}

impl LocationArgs {
    pub fn criteria(&self, head: Option<String>) -> FilterCriteria {
        FilterCriteria {
            region: self.region.clone(),
            sub_region: self.sub_region.clone(),
            sub_district: self.sub_district.clone(),
            household_head: head,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExportFormatArg {
    Xlsx,
    Csv,
}

impl From<ExportFormatArg> for supas_io::ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Xlsx => supas_io::ExportFormat::Xlsx,
            ExportFormatArg::Csv => supas_io::ExportFormat::Csv,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Counts for the rows matching the criteria
    #[command(after_help = "\
Examples:
  supas summary
  supas summary --region Papua --sub-region Abepura
  supas summary --dir data/ --json
  supas summary --region Maluku --fail-on-empty")]
    Summary {
        #[command(flatten)]
        location: LocationArgs,

        /// Household head (nama_kepala_keluarga)
        #[arg(long)]
        head: Option<String>,

        /// Output JSON to stdout instead of the human summary
        #[arg(long)]
        json: bool,

        /// Exit 4 when the criteria match no rows
        #[arg(long)]
        fail_on_empty: bool,
    },

    /// Values selectable at each filter stage, narrowed by the earlier stages
    #[command(after_help = "\
Examples:
  supas options
  supas options --region Papua
  supas options --region Papua --sub-region Abepura --json")]
    Options {
        #[command(flatten)]
        location: LocationArgs,

        /// Household head (nama_kepala_keluarga)
        #[arg(long)]
        head: Option<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Found members of one household, with derived fields
    #[command(after_help = "\
Examples:
  supas roster --head 'Yohanes Kogoya'
  supas roster --region Papua --head 'Maria Wenda' --json")]
    Roster {
        #[command(flatten)]
        location: LocationArgs,

        /// Household head (nama_kepala_keluarga)
        #[arg(long)]
        head: String,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Exit 4 when no member of the household was found
        #[arg(long)]
        fail_on_empty: bool,
    },

    /// Write the matching rows to an Excel or CSV file
    #[command(after_help = "\
Without --output the file is named
  <file_prefix>[_region][_sub_region][_sub_district]_<YYYYmmdd_HHMMSS>.<ext>
in the current directory.

Examples:
  supas export
  supas export --region Papua --sub-region Abepura
  supas export --format csv --output members.csv")]
    Export {
        #[command(flatten)]
        location: LocationArgs,

        /// Household head (nama_kepala_keluarga)
        #[arg(long)]
        head: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "xlsx")]
        format: ExportFormatArg,

        /// Output path (default: generated name in the current directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the written path and row count as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Exit 4 instead of writing a header-only file when nothing matches
        #[arg(long)]
        fail_on_empty: bool,
    },

    /// Validate a run config without loading any documents
    #[command(after_help = "\
Examples:
  supas validate-config supas.toml")]
    ValidateConfig {
        /// Path to the TOML config
        #[arg(value_name = "CONFIG")]
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Summary {
            location,
            head,
            json,
            fail_on_empty,
        } => query::cmd_summary(&cli.input, location.criteria(head), json, fail_on_empty),
        Commands::Options {
            location,
            head,
            json,
        } => query::cmd_options(&cli.input, location.criteria(head), json),
        Commands::Roster {
            location,
            head,
            json,
            fail_on_empty,
        } => query::cmd_roster(&cli.input, location.criteria(Some(head)), json, fail_on_empty),
        Commands::Export {
            location,
            head,
            format,
            output,
            json,
            fail_on_empty,
        } => export::cmd_export(
            &cli.input,
            location.criteria(head),
            format.into(),
            output,
            json,
            fail_on_empty,
        ),
        Commands::ValidateConfig { path } => cmd_validate_config(&path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Diagnostics go to stderr so `--json` stdout stays a single value.
/// `RUST_LOG` overrides the default `warn` level; library `log` records are bridged.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn no_matches(msg: impl Into<String>) -> Self {
        Self::new(EXIT_NO_MATCHES, msg).with_hint("widen the filter, or run `supas options` to see valid values")
    }

    /// Map an engine error to its exit code.
    pub fn census(err: CensusError) -> Self {
        match err {
            CensusError::NoData(_) => Self::new(EXIT_NO_DATA, err.to_string())
                .with_hint("every matched file failed to load or had no record with an id"),
            CensusError::ConfigParse(_) | CensusError::ConfigValidation(_) => {
                Self::new(EXIT_INVALID_CONFIG, err.to_string())
            }
            CensusError::DocumentParse { .. } => Self::new(EXIT_ERROR, err.to_string()),
        }
    }

    /// Map a file I/O error to its exit code.
    pub fn io(err: IoError) -> Self {
        match err {
            IoError::NoDocuments { .. } => Self::new(EXIT_NO_DATA, err.to_string())
                .with_hint("put supas_extraction*.json files in that directory, or pass --dir / --pattern"),
            IoError::InvalidPattern { .. } => Self::usage(err.to_string()),
            IoError::Export { .. } => Self::new(EXIT_EXPORT, err.to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Shared run setup
// ============================================================================

/// A finished pipeline run plus the config it ran under.
pub struct Session {
    pub config: CensusConfig,
    pub output: PipelineOutput,
}

fn read_config(path: &Path) -> Result<CensusConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    CensusConfig::from_toml(&text).map_err(CliError::census)
}

/// Merge config file and flags. A relative `[input] dir` from the file is
/// resolved against the file's own directory.
pub(crate) fn resolve_config(input: &InputArgs) -> Result<CensusConfig, CliError> {
    let mut config = match &input.config {
        Some(path) => {
            let mut config = read_config(path)?;
            let dir = Path::new(&config.input.dir);
            if dir.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                config.input.dir = base.join(dir).display().to_string();
            }
            config
        }
        None => CensusConfig::default(),
    };

    if let Some(dir) = &input.dir {
        config.input.dir = dir.display().to_string();
    }
    if let Some(pattern) = &input.pattern {
        config.input.pattern = pattern.clone();
    }
    if let Some(seed) = input.seed {
        config.derive.seed = seed;
    }

    config.validate().map_err(CliError::census)?;
    Ok(config)
}

/// Load every matching document and run the pipeline once.
pub(crate) fn load_session(input: &InputArgs) -> Result<Session, CliError> {
    let config = resolve_config(input)?;

    let documents = supas_io::load_documents(Path::new(&config.input.dir), &config.input.pattern)
        .map_err(CliError::io)?;

    let mut ctx = RunContext::from_config(&config);
    let output = supas_census::run(documents, &mut ctx).map_err(CliError::census)?;

    eprintln!("{}", output.reconcile.message());
    if output.reconcile.documents_failed > 0 {
        eprintln!("skipped {} unreadable file(s)", output.reconcile.documents_failed);
    }

    Ok(Session { config, output })
}

// ============================================================================
// validate-config
// ============================================================================

fn cmd_validate_config(path: &Path) -> Result<(), CliError> {
    let config = read_config(path)?;
    eprintln!(
        "valid: {} (input {}/{}, seed {}, reference {}-{:02})",
        path.display(),
        config.input.dir,
        config.input.pattern,
        config.derive.seed,
        config.derive.reference_year,
        config.derive.reference_month,
    );
    Ok(())
}
