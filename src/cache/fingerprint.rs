//! Request fingerprinting and handler classification

use crate::cache::request::SearchRequest;
use sha1::{Digest, Sha1};

/// Default handler prefix for read-only queries
pub const SELECT_HANDLER_PREFIX: &str = "select";

/// SHA1 of the request URI immediately followed by the raw body, hex encoded
pub fn fingerprint(request: &SearchRequest) -> String {
    let mut hasher = Sha1::new();
    hasher.update(request.uri.as_bytes());
    hasher.update(&request.raw_body);
    hex::encode(hasher.finalize())
}

/// Whether `handler` names a read-only handler, i.e. its lowercased name
/// starts with `prefix`
pub fn is_select_handler(handler: &str, prefix: &str) -> bool {
    handler.to_lowercase().starts_with(prefix)
}
