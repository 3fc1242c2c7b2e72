//! JSON document export.

use super::ExportResult;
use crate::model::document::TimelineData;

/// Pretty-printed (2-space) timeline document.
pub fn export_json(data: &TimelineData) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}
