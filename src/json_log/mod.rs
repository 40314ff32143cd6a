//! Re-emit the contents of JSON documents through the structured logger
//!
//! Documents are first classified into one of the recognized shapes, turned
//! into [`LogRecord`]s, and then written through `tracing` at each record's
//! level.

pub mod level;
pub mod shape;

pub use level::{parse_level_arg, LogLevel};
pub use shape::{classify, extract, records_from_value, JsonShape, LogRecord};

use crate::{Error, Result};
use serde_json::Value;
use std::path::Path;

pub fn emit(record: &LogRecord) {
    let line = record.render();
    match record.level {
        LogLevel::Debug => tracing::debug!("{}", line),
        LogLevel::Info => tracing::info!("{}", line),
        LogLevel::Warning => tracing::warn!("{}", line),
        LogLevel::Error => tracing::error!("{}", line),
        LogLevel::Critical => tracing::error!(critical = true, "{}", line),
    }
}

/// Log every record found in `value` and return how many were written.
pub fn log_json(value: &Value) -> usize {
    let records = records_from_value(value);
    records.iter().for_each(emit);
    records.len()
}

/// Read and parse a JSON file.
///
/// Missing paths, directories and permission problems come back as
/// [`Error::Validation`] with a message naming the path; malformed JSON as
/// [`Error::Serialization`].
pub fn read_json_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::Validation(format!(
            "File not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(Error::Validation(format!(
            "Path is not a file: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Error::Validation(format!(
            "Permission denied reading file: {}",
            path.display()
        )),
        _ => Error::Io(e),
    })?;

    let value = serde_json::from_str(&contents)?;
    tracing::info!("Successfully loaded JSON file: {}", path.display());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_json_file_valid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages.json");
        fs::write(&path, r#"{"messages": [{"message": "a"}]}"#).unwrap();

        let value = read_json_file(&path).unwrap();
        assert_eq!(value, json!({"messages": [{"message": "a"}]}));
    }

    #[test]
    fn test_read_json_file_missing() {
        let dir = tempdir().unwrap();
        let err = read_json_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_read_json_file_directory() {
        let dir = tempdir().unwrap();
        let err = read_json_file(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Path is not a file"));
    }

    #[test]
    fn test_read_json_file_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json_file(&path).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_log_json_counts_records() {
        assert_eq!(log_json(&json!({"x": 1, "y": 2})), 2);
        assert_eq!(log_json(&json!([{"text": "hi"}])), 1);
    }
}
