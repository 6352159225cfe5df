//! Response encoding for the cache store

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Outcome of decoding a stored payload
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// Payload decoded into a response
    Value(T),

    /// Payload was malformed; callers treat it as a miss
    Corrupt,
}

impl<T> Decoded<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Decoded::Value(value) => Some(value),
            Decoded::Corrupt => None,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Decoded::Corrupt)
    }
}

/// Serialize a response for storage
pub fn encode<R: Serialize>(response: &R) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(response)?)
}

/// Deserialize a stored payload, never failing
pub fn decode<R: DeserializeOwned>(bytes: &[u8]) -> Decoded<R> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Decoded::Value(value),
        Err(_) => Decoded::Corrupt,
    }
}
