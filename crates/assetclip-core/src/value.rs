//! Host-side value model.
//!
//! Documents handed to the engine are converted once into [`Value`] and then
//! traversed by pattern matching. Records keep their insertion order, which is
//! the order every traversal visits fields in.

use indexmap::IndexMap;
use serde_json::Number;
use std::path::PathBuf;

/// An ordered string-keyed record.
pub type Record = IndexMap<String, Value>;

/// A nested structured value, possibly carrying binary leaves.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Integers keep their exact `i64`/`u64` form; only floats are `f64`.
    Number(Number),
    String(String),
    Sequence(Vec<Value>),
    Record(Record),
    Binary(Blob),
}

impl Value {
    /// Get the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the number as a float, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Get the number as a signed integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Get the record, if this is a record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Get the record mutably, if this is a record.
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Get the sequence, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Get the sequence mutably, if this is a sequence.
    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a field when this is a record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_record().and_then(|r| r.get(key))
    }

    /// Follow a path of record fields.
    pub fn get_path(&self, path: &[String]) -> Option<&Value> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Follow a path of record fields, mutably.
    pub fn get_path_mut(&mut self, path: &[String]) -> Option<&mut Value> {
        path.iter()
            .try_fold(self, |node, key| node.as_record_mut().and_then(|r| r.get_mut(key)))
    }

    /// Whether this value is a sequence or a record.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Record(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Non-finite floats have no JSON form and become [`Value::Null`].
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Blob> for Value {
    fn from(blob: Blob) -> Self {
        Value::Binary(blob)
    }
}

/// Plain structural conversion. Binary wire records are NOT recognised here;
/// use [`crate::codec::decode`] for envelope contents.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Record(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Where a blob's bytes live.
#[derive(Debug, Clone, PartialEq)]
pub enum BlobContent {
    /// Bytes held in memory.
    Inline(Vec<u8>),
    /// Bytes read from disk when the blob is encoded.
    File(PathBuf),
}

/// A binary resource leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    /// Original filename.
    pub name: String,
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    pub content: BlobContent,
}

impl Blob {
    /// Create a blob from bytes already in memory.
    pub fn inline(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: BlobContent::Inline(bytes),
        }
    }

    /// Create a blob backed by a file on disk.
    pub fn from_file(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: BlobContent::File(path.into()),
        }
    }

    /// Read the blob's bytes.
    pub fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            BlobContent::Inline(bytes) => Ok(bytes.clone()),
            BlobContent::File(path) => std::fs::read(path),
        }
    }
}
