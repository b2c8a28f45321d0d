//! Conversion between [`Value`] and the portable JSON wire form.
//!
//! Binary leaves travel as a self-describing record:
//! ```text
//! { "__type": "File", "name": "a.png", "type": "image/png",
//!   "data": "data:image/png;base64,iVBORw0..." }
//! ```
//! Everything else maps onto JSON structurally.

use crate::value::{Blob, Record, Value};
use crate::BoxFuture;
use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

// Wire keys for binary leaves
const KEY_TYPE_MARKER: &str = "__type";
const KEY_NAME: &str = "name";
const KEY_MIME: &str = "type";
const KEY_DATA: &str = "data";

const FILE_MARKER: &str = "File";
const DATA_URL_PREFIX: &str = "data:";
const BASE64_SUFFIX: &str = ";base64";

/// Codec errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to read binary resource '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed binary resource '{name}': {reason}")]
    Decode { name: String, reason: String },
}

/// Encode a value into its wire form.
///
/// File-backed blobs are read here, which is the only step that can fail.
pub fn encode(value: &Value) -> BoxFuture<'_, Result<serde_json::Value, CodecError>> {
    Box::pin(async move {
        Ok::<_, CodecError>(match value {
            Value::Binary(blob) => encode_blob(blob)?,
            Value::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(encode(item).await?);
                }
                serde_json::Value::Array(out)
            }
            Value::Record(record) => {
                let mut out = serde_json::Map::with_capacity(record.len());
                for (key, field) in record {
                    out.insert(key.clone(), encode(field).await?);
                }
                serde_json::Value::Object(out)
            }
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
        })
    })
}

/// Encode each value of a list in order.
pub async fn encode_all(values: &[Value]) -> Result<Vec<serde_json::Value>, CodecError> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        out.push(encode(value).await?);
    }
    Ok(out)
}

fn encode_blob(blob: &Blob) -> Result<serde_json::Value, CodecError> {
    let bytes = blob.read_bytes().map_err(|source| CodecError::Encode {
        name: blob.name.clone(),
        source,
    })?;

    let mut out = serde_json::Map::new();
    out.insert(KEY_TYPE_MARKER.into(), FILE_MARKER.into());
    out.insert(KEY_NAME.into(), blob.name.clone().into());
    out.insert(KEY_MIME.into(), blob.mime_type.clone().into());
    out.insert(KEY_DATA.into(), to_data_url(&blob.mime_type, &bytes).into());
    Ok(serde_json::Value::Object(out))
}

/// Decode a wire value back into a host value.
pub fn decode(wire: serde_json::Value) -> Result<Value, CodecError> {
    Ok(match wire {
        serde_json::Value::Object(map) if is_wire_blob(&map) => Value::Binary(decode_blob(map)?),
        serde_json::Value::Object(map) => {
            let mut record = Record::with_capacity(map.len());
            for (key, field) in map {
                record.insert(key, decode(field)?);
            }
            Value::Record(record)
        }
        serde_json::Value::Array(items) => Value::Sequence(
            items.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?,
        ),
        other => Value::from(other),
    })
}

fn is_wire_blob(map: &serde_json::Map<String, serde_json::Value>) -> bool {
    map.get(KEY_TYPE_MARKER).and_then(|t| t.as_str()) == Some(FILE_MARKER)
}

fn decode_blob(map: serde_json::Map<String, serde_json::Value>) -> Result<Blob, CodecError> {
    let text = |key: &str| map.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let name = text(KEY_NAME);
    let mime_type = text(KEY_MIME);
    let url = map
        .get(KEY_DATA)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CodecError::Decode {
            name: name.clone(),
            reason: "missing data URL".to_string(),
        })?;

    let bytes = from_data_url(url).map_err(|reason| CodecError::Decode {
        name: name.clone(),
        reason,
    })?;
    Ok(Blob::inline(name, mime_type, bytes))
}

/// Build a base64 `data:` URL.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("{DATA_URL_PREFIX}{mime_type}{BASE64_SUFFIX},{}", STANDARD.encode(bytes))
}

/// Extract the bytes of a base64 `data:` URL.
pub fn from_data_url(url: &str) -> Result<Vec<u8>, String> {
    let rest = url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| "not a data URL".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URL has no payload separator".to_string())?;
    if !header.ends_with(BASE64_SUFFIX) {
        return Err("only base64 data URLs are supported".to_string());
    }
    STANDARD.decode(payload).map_err(|e| format!("invalid base64: {}", e))
}
