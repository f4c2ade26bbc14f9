use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::models::document::json_type_name;
use crate::models::{EntityKind, Fields};

/// Records grouped by collection name, as read from a snapshot file.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: Fields,
}

/// Errors that prevent a snapshot from being used at all.
#[derive(Debug)]
pub enum SnapshotError {
    /// I/O error reading the file.
    ReadError(PathBuf, std::io::Error),
    /// The file is not valid JSON.
    ParseError(serde_json::Error),
    /// The top-level value is not an object.
    NotAnObject(&'static str),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::ReadError(path, e) => {
                write!(f, "Failed to read snapshot '{}': {}", path.display(), e)
            }
            SnapshotError::ParseError(e) => write!(f, "Failed to parse snapshot: {}", e),
            SnapshotError::NotAnObject(found) => {
                write!(f, "Snapshot must be a JSON object, found {}", found)
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::ReadError(_, e) => Some(e),
            SnapshotError::ParseError(e) => Some(e),
            SnapshotError::NotAnObject(_) => None,
        }
    }
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SnapshotError::ReadError(path.to_path_buf(), e))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(contents).map_err(SnapshotError::ParseError)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(SnapshotError::NotAnObject(json_type_name(&other))),
        }
    }

    /// The raw value stored under the collection of `kind`, if any.
    pub fn records(&self, kind: EntityKind) -> Option<&Value> {
        self.entries.get(kind.collection())
    }

    /// Top-level keys that do not name a known collection.
    pub fn unknown_keys(&self) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| EntityKind::from_collection(key).is_none())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_parse_groups_by_collection() {
        let snapshot =
            Snapshot::parse(r#"{"categories": [{"id": "c1"}], "drones": [], "widgets": [1]}"#)
                .unwrap();

        assert_eq!(
            snapshot.records(EntityKind::Category),
            Some(&json!([{"id": "c1"}]))
        );
        assert_eq!(snapshot.records(EntityKind::Drone), Some(&json!([])));
        assert_eq!(snapshot.records(EntityKind::Order), None);
        assert_eq!(snapshot.unknown_keys(), vec!["widgets".to_string()]);
    }

    #[test]
    fn test_rejects_non_object() {
        let result = Snapshot::parse("[1, 2, 3]");
        assert!(matches!(result, Err(SnapshotError::NotAnObject("an array"))));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let result = Snapshot::parse("{not json");
        assert!(matches!(result, Err(SnapshotError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempdir().unwrap();
        let result = Snapshot::load(&temp_dir.path().join("missing.json"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to read snapshot"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("data.json");
        std::fs::write(&path, r#"{"users": [{"_id": "u1", "name": "Ada"}]}"#).unwrap();

        let snapshot = Snapshot::load(&path).unwrap();
        assert_eq!(
            snapshot.records(EntityKind::User),
            Some(&json!([{"_id": "u1", "name": "Ada"}]))
        );
    }
}
