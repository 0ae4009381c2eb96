// Export file naming

use chrono::NaiveDateTime;
use supas_census::FilterCriteria;

use crate::ExportFormat;

/// `{prefix}{_region}{_sub_region}{_sub_district}_{YYYYmmdd_HHMMSS}.{ext}`
///
/// Only the location criteria that are set contribute a segment; spaces
/// inside them become underscores. The household-head criterion never
/// appears in the name.
pub fn export_file_name(
    prefix: &str,
    criteria: &FilterCriteria,
    timestamp: NaiveDateTime,
    format: ExportFormat,
) -> String {
    let mut name = prefix.to_string();
    for part in [&criteria.region, &criteria.sub_region, &criteria.sub_district]
        .into_iter()
        .flatten()
    {
        name.push('_');
        name.push_str(&part.replace(' ', "_"));
    }
    format!(
        "{name}_{}.{}",
        timestamp.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
