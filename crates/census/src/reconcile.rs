//! Multi-snapshot reconciliation: one canonical household record per id.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CensusError;
use crate::model::{DocumentInput, HouseholdRecord, RecordId};

/// Outcome of comparing a duplicate against the record already held for its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Incoming record replaces the stored one.
    Replace,
    /// Stored record stays, incoming is discarded.
    Keep,
}

/// Priority between two records sharing an id.
///
/// A `success` record beats any other status. Between two `success` records the
/// strictly later `extraction_timestamp` wins. Between two non-success records
/// the first one seen stays.
pub fn resolve(stored: &HouseholdRecord, incoming: &HouseholdRecord) -> Resolution {
    match (stored.extraction_status().is_success(), incoming.extraction_status().is_success()) {
        (false, true) => Resolution::Replace,
        (true, false) => Resolution::Keep,
        (true, true) => {
            let stored_ts = stored.extraction_timestamp.as_deref().unwrap_or("");
            let incoming_ts = incoming.extraction_timestamp.as_deref().unwrap_or("");
            if incoming_ts > stored_ts {
                Resolution::Replace
            } else {
                Resolution::Keep
            }
        }
        (false, false) => Resolution::Keep,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Unique records after dedup.
    pub total_records: usize,
    /// Documents supplied, including ones that failed to load.
    pub merged_from_files: usize,
    pub documents_failed: usize,
    /// Records dropped or replaced because their id was already present.
    pub duplicates_resolved: usize,
    pub skipped_without_id: usize,
}

impl ReconcileSummary {
    pub fn message(&self) -> String {
        format!(
            "read {} file(s) and merged {} unique record(s)",
            self.merged_from_files, self.total_records
        )
    }
}

/// Deduplicated records in first-seen id order.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    records: Vec<HouseholdRecord>,
    index: HashMap<RecordId, usize>,
    pub summary: ReconcileSummary,
    pub warnings: Vec<String>,
}

impl Reconciliation {
    pub fn records(&self) -> &[HouseholdRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<HouseholdRecord> {
        self.records
    }

    pub fn get(&self, id: &RecordId) -> Option<&HouseholdRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Merge all documents, in order, into one record per id.
///
/// Failed documents are reported as warnings and contribute nothing.
/// Returns [`CensusError::NoData`] when nothing usable remains.
pub fn reconcile(documents: Vec<DocumentInput>) -> Result<Reconciliation, CensusError> {
    if documents.is_empty() {
        return Err(CensusError::NoData("no extraction documents supplied".into()));
    }

    let mut records: Vec<HouseholdRecord> = Vec::new();
    let mut index: HashMap<RecordId, usize> = HashMap::new();
    let mut summary = ReconcileSummary {
        merged_from_files: documents.len(),
        ..Default::default()
    };
    let mut warnings = Vec::new();

    for document in documents {
        let doc = match document {
            DocumentInput::Parsed(doc) => doc,
            DocumentInput::Failed { source, reason } => {
                let warning = format!("error reading {source}: {reason}");
                log::warn!("{warning}");
                warnings.push(warning);
                summary.documents_failed += 1;
                continue;
            }
        };

        for record in doc.records {
            let Some(id) = record.record_id.clone() else {
                summary.skipped_without_id += 1;
                continue;
            };

            match index.get(&id).copied() {
                None => {
                    index.insert(id, records.len());
                    records.push(record);
                }
                Some(slot) => {
                    summary.duplicates_resolved += 1;
                    let resolution = resolve(&records[slot], &record);
                    log::debug!("{}: duplicate id {id} -> {resolution:?}", doc.source);
                    if resolution == Resolution::Replace {
                        records[slot] = record;
                    }
                }
            }
        }
    }

    summary.total_records = records.len();
    if records.is_empty() {
        return Err(CensusError::NoData(format!(
            "{} document(s) yielded no usable records",
            summary.merged_from_files
        )));
    }

    log::info!("{}", summary.message());

    Ok(Reconciliation {
        records,
        index,
        summary,
        warnings,
    })
}
