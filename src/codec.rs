use serde_json::Value;

use crate::models::Task;

/// Conventional download name for an exported document.
pub const EXPORT_FILENAME: &str = "tasks.json";

#[derive(Debug)]
pub enum FormatError {
    Json(serde_json::Error),
    /// The document parsed but its top level is not a sequence of records.
    NotASequence,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::Json(err) => write!(f, "invalid document: {err}"),
            FormatError::NotASequence => write!(f, "document must be an array of tasks"),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<serde_json::Error> for FormatError {
    fn from(value: serde_json::Error) -> Self {
        FormatError::Json(value)
    }
}

/// Serializes the task set to a pretty-printed JSON document. Pure; the
/// caller offers the document for download.
pub fn export_document(tasks: &[Task]) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Parses an externally supplied document into insertable records.
/// Record shape is deliberately not validated here; malformed records
/// flow through to the per-record insert, which may reject them. Each
/// record's `id` is discarded so imports never reuse an existing id.
pub fn import_document(document: &str) -> Result<Vec<Value>, FormatError> {
    let value: Value = serde_json::from_str(document)?;
    let Value::Array(records) = value else {
        return Err(FormatError::NotASequence);
    };
    Ok(records
        .into_iter()
        .map(|mut record| {
            if let Value::Object(map) = &mut record {
                map.remove("id");
            }
            record
        })
        .collect())
}
