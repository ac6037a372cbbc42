use anyhow::{anyhow, Context, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A shared, immutable sequence of records supplied by the caller.
///
/// Identity of the `Arc` is what the table uses to tell "new data" apart
/// from a re-render of the same data.
pub type RecordSet = Arc<Vec<Record>>;

/// A single scalar value held by a record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl DataValue {
    /// Convert a JSON value into a scalar. Nested arrays/objects are kept
    /// as their JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else {
                    DataValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => DataValue::String(s.clone()),
            other => DataValue::String(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text coercion used for searching: everything except null stringifies
    pub fn as_text(&self) -> Option<String> {
        match self {
            DataValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Integer(value as i64)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DataValue::Null)
    }
}

/// Compare two values for sorting.
/// Order across types: Null < Boolean < numbers < String.
pub fn compare_values(a: &DataValue, b: &DataValue) -> Ordering {
    match (a, b) {
        (DataValue::Integer(a), DataValue::Integer(b)) => a.cmp(b),
        (DataValue::Float(a), DataValue::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (DataValue::Integer(i), DataValue::Float(f)) => {
            (*i as f64).partial_cmp(f).unwrap_or(Ordering::Equal)
        }
        (DataValue::Float(f), DataValue::Integer(i)) => {
            f.partial_cmp(&(*i as f64)).unwrap_or(Ordering::Equal)
        }
        (DataValue::String(a), DataValue::String(b)) => a.cmp(b),
        (DataValue::Boolean(a), DataValue::Boolean(b)) => a.cmp(b),

        (DataValue::Null, DataValue::Null) => Ordering::Equal,
        (DataValue::Null, _) => Ordering::Less,
        (_, DataValue::Null) => Ordering::Greater,

        (DataValue::Boolean(_), _) => Ordering::Less,
        (_, DataValue::Boolean(_)) => Ordering::Greater,
        (DataValue::String(_), _) => Ordering::Greater,
        (_, DataValue::String(_)) => Ordering::Less,
    }
}

/// An ordered mapping from field name to value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, DataValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a field, replacing the value in place if the name already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DataValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn from_json_object(object: &serde_json::Map<String, JsonValue>) -> Self {
        object
            .iter()
            .map(|(k, v)| (k.clone(), DataValue::from_json(v)))
            .collect()
    }
}

impl FromIterator<(String, DataValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, DataValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Build a [`Record`] from `name => value` pairs.
#[macro_export]
macro_rules! record {
    ($($name:expr => $value:expr),* $(,)?) => {{
        let mut record = $crate::data::record::Record::new();
        $(record.insert($name, $value);)*
        record
    }};
}

/// Convert a JSON array of objects into records
pub fn records_from_json(value: &JsonValue) -> Result<Vec<Record>> {
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("Expected a JSON array of objects"))?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_object()
                .map(Record::from_json_object)
                .ok_or_else(|| anyhow!("Item {} is not a JSON object", idx))
        })
        .collect()
}

/// Load a JSON file containing an array of objects
pub fn load_json_records<P: AsRef<Path>>(path: P) -> Result<RecordSet> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    let json: JsonValue = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let records = records_from_json(&json)?;
    debug!(target: "data", "Loaded {} records from {}", records.len(), path.display());
    Ok(Arc::new(records))
}
