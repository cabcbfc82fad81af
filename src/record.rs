use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::DTError;

const BUNDLED_DATA: &str = include_str!("../data/data.json");

static ABSENT: Value = Value::Absent;

/// A single scalar cell. Values of different kinds never compare equal,
/// so the text `"1"` does not match the number `1`. Numbers are plain
/// doubles: `1` and `1.0` are the same value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    Absent,
}

impl Value {
    /// Blank values are never offered as filter options: absent fields,
    /// empty strings, zero and `false`.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Number(n) => *n == 0.0,
            Value::Bool(b) => !b,
            Value::Absent => true,
        }
    }

    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Absent,
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Value::Number(f),
                None => Value::Text(n.to_string()),
            },
            serde_json::Value::Bool(b) => Value::Bool(b),
            // Nested structures have no scalar form, show them as compact json
            other => Value::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            // -0 prints as 0, integral doubles print without a fraction
            Value::Number(n) if *n == 0.0 => f.write_str("0"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Absent => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    /// Missing fields read as `Value::Absent`.
    pub fn get(&self, field: &str) -> &Value {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
            .unwrap_or(&ABSENT)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// The static record set the table is built from. Loaded once, never mutated.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn bundled() -> Result<Self, DTError> {
        Self::from_json_str(BUNDLED_DATA)
    }

    pub fn from_path(path: &Path) -> Result<Self, DTError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DTError::FileNotFound,
            ErrorKind::PermissionDenied => DTError::PermissionDenied,
            _ => DTError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(DTError::InvalidDataset(format!(
                "{} is not a file",
                path.display()
            )));
        }

        info!("Loading dataset from {} ({} bytes)", path.display(), metadata.len());
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, DTError> {
        let parsed: serde_json::Value = serde_json::from_str(content)?;
        let serde_json::Value::Array(items) = parsed else {
            return Err(DTError::InvalidDataset(
                "top level value must be an array of objects".into(),
            ));
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                serde_json::Value::Object(map) => Ok(Record::new(
                    map.into_iter()
                        .map(|(k, v)| (k, Value::from_json(v)))
                        .collect(),
                )),
                _ => Err(DTError::InvalidDataset(format!(
                    "element {idx} is not an object"
                ))),
            })
            .collect::<Result<Vec<Record>, DTError>>()?;

        debug!("Parsed {} records", records.len());
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&Record> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_records_in_field_order() {
        let ds = Dataset::from_json_str(r#"[{"id": 1, "zeta": "z", "alpha": null}]"#).unwrap();
        let record = &ds.records()[0];
        assert_eq!(
            record.field_names().collect::<Vec<_>>(),
            vec!["id", "zeta", "alpha"]
        );
        assert_eq!(record.get("id"), &Value::from(1));
        assert_eq!(record.get("alpha"), &Value::Absent);
        assert_eq!(record.get("missing"), &Value::Absent);
    }

    #[test]
    fn text_and_number_are_distinct() {
        assert_ne!(Value::from("1"), Value::from(1));
        assert_eq!(Value::from(1).to_string(), "1");
        assert_eq!(Value::Absent.to_string(), "");
    }

    #[test]
    fn non_scalars_become_text() {
        let ds = Dataset::from_json_str(r#"[{"ok": true, "tags": ["a", "b"]}]"#).unwrap();
        let record = &ds.records()[0];
        assert_eq!(record.get("ok"), &Value::Bool(true));
        assert_ne!(record.get("ok"), &Value::from("true"));
        assert_eq!(record.get("ok").to_string(), "true");
        assert_eq!(record.get("tags"), &Value::from(r#"["a","b"]"#));
    }

    #[test]
    fn integral_floats_equal_integers() {
        let ds = Dataset::from_json_str(r#"[{"qty": 1}, {"qty": 1.0}, {"qty": 2.5}, {"qty": -0.0}]"#)
            .unwrap();
        let qty: Vec<&Value> = ds.records().iter().map(|r| r.get("qty")).collect();
        assert_eq!(qty[0], qty[1]);
        assert_eq!(qty[1], &Value::from(1));
        assert_eq!(qty[1].to_string(), "1");
        assert_eq!(qty[2].to_string(), "2.5");
        assert_eq!(qty[3].to_string(), "0");
    }

    #[test]
    fn blank_values() {
        assert!(Value::Absent.is_blank());
        assert!(Value::from("").is_blank());
        assert!(Value::from(0).is_blank());
        assert!(Value::Bool(false).is_blank());
        assert!(!Value::Bool(true).is_blank());
        assert!(!Value::from("x").is_blank());
        assert!(!Value::from(3).is_blank());
    }

    #[test]
    fn rejects_non_array() {
        let err = Dataset::from_json_str(r#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, DTError::InvalidDataset(_)));
    }

    #[test]
    fn rejects_non_object_element() {
        let err = Dataset::from_json_str(r#"[{"id": 1}, 2]"#).unwrap_err();
        match err {
            DTError::InvalidDataset(reason) => assert!(reason.contains("element 1")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Dataset::from_json_str("[{").unwrap_err();
        assert!(matches!(err, DTError::JsonError(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 1, "name": "a"}}, {{"id": 2}}]"#).unwrap();
        let ds = Dataset::from_path(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).unwrap().get("name"), &Value::Absent);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::from_path(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, DTError::FileNotFound));
    }

    #[test]
    fn directory_is_not_a_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, DTError::InvalidDataset(_)));
    }

    #[test]
    fn bundled_dataset_loads() {
        let ds = Dataset::bundled().unwrap();
        assert!(!ds.is_empty());
    }
}
