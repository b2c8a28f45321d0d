//! Content hashing of entity resources.

use crate::codec::from_data_url;
use crate::value::Value;
use crate::BoxFuture;
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

/// Hashing errors. These never leave the resolver.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Unresolvable resource: {0}")]
    Unresolvable(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Produces stable digests of resources.
///
/// An empty digest means "no hash available".
#[cfg(not(target_arch = "wasm32"))]
pub trait ContentHasher: Send + Sync {
    fn digest<'a>(&'a self, resource: &'a Value) -> BoxFuture<'a, Result<String, HashError>>;
}

/// Produces stable digests of resources (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait ContentHasher {
    fn digest<'a>(&'a self, resource: &'a Value) -> BoxFuture<'a, Result<String, HashError>>;
}

/// SHA-256 over a resource's bytes.
///
/// Understands inline or file-backed blobs, base64 `data:` URLs and paths of
/// readable files. Empty references hash to the empty digest.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    pub fn new() -> Self {
        Self
    }

    fn bytes_of(resource: &Value) -> Result<Option<Vec<u8>>, HashError> {
        match resource {
            Value::Binary(blob) => blob
                .read_bytes()
                .map(Some)
                .map_err(|e| HashError::Io(format!("{}: {}", blob.name, e))),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) if s.starts_with("data:") => {
                from_data_url(s).map(Some).map_err(HashError::Unresolvable)
            }
            Value::String(s) => {
                let path = Path::new(s);
                if !path.is_file() {
                    return Err(HashError::Unresolvable(s.clone()));
                }
                std::fs::read(path)
                    .map(Some)
                    .map_err(|e| HashError::Io(format!("{}: {}", s, e)))
            }
            other => Err(HashError::Unresolvable(format!("{:?}", other))),
        }
    }
}

impl ContentHasher for Sha256Hasher {
    fn digest<'a>(&'a self, resource: &'a Value) -> BoxFuture<'a, Result<String, HashError>> {
        Box::pin(async move {
            Ok::<_, HashError>(match Self::bytes_of(resource)? {
                Some(bytes) => hex::encode(Sha256::digest(&bytes)),
                None => String::new(),
            })
        })
    }
}
