// Extraction document discovery and loading

use std::io::Read;
use std::path::{Path, PathBuf};

use supas_census::{CensusError, DocumentInput, RawDocument};

use crate::error::IoError;

/// Files in `dir` whose names match `pattern`, in sorted path order.
pub fn discover(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, IoError> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full = Path::new(&escaped_dir).join(pattern);
    let full = full.to_string_lossy();

    let entries = glob::glob(&full).map_err(|e| IoError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("skipping unreadable path: {e}");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(IoError::NoDocuments {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }
    Ok(paths)
}

/// Discover and read every matching document. Per-file failures are carried
/// as [`DocumentInput::Failed`] so the reconciler can report and skip them.
pub fn load_documents(dir: &Path, pattern: &str) -> Result<Vec<DocumentInput>, IoError> {
    let paths = discover(dir, pattern)?;
    log::info!("found {} extraction file(s) in {}", paths.len(), dir.display());
    Ok(paths.iter().map(|path| read_document(path)).collect())
}

/// Read and decode one document. Never fails: problems become `Failed`.
pub fn read_document(path: &Path) -> DocumentInput {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let content = match read_file_as_utf8(path) {
        Ok(content) => content,
        Err(reason) => return DocumentInput::Failed { source, reason },
    };

    match RawDocument::from_json(&source, &content) {
        Ok(doc) => DocumentInput::Parsed(doc),
        Err(CensusError::DocumentParse { message, .. }) => DocumentInput::Failed { source, reason: message },
        Err(e) => DocumentInput::Failed {
            source,
            reason: e.to_string(),
        },
    }
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Older field exports were saved from Windows tools.
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
