//! Append-only log of cacheable queries

use crate::cache::request::SearchRequest;
use crate::error::Result;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// One log line: URI, query string, a comma, the raw body, newline
pub fn format_line(request: &SearchRequest) -> String {
    format!(
        "{}{},{}\n",
        request.uri,
        request.query_string,
        request.body_lossy()
    )
}

/// Append the request to `path`, creating the file if needed
pub async fn append(path: impl AsRef<Path>, request: &SearchRequest) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())
        .await?;

    file.write_all(format_line(request).as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
