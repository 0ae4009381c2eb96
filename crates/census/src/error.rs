use std::fmt;

#[derive(Debug)]
pub enum CensusError {
    /// No documents supplied, or none yielded a usable record.
    NoData(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad month, empty pattern, etc.).
    ConfigValidation(String),
    /// Document JSON could not be decoded.
    DocumentParse { source: String, message: String },
}

impl fmt::Display for CensusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData(msg) => write!(f, "no data: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DocumentParse { source, message } => {
                write!(f, "document '{source}': {message}")
            }
        }
    }
}

impl std::error::Error for CensusError {}
