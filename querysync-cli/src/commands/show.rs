//! Show command implementation

use super::engine::UrlSession;
use anyhow::Result;
use querysync_core::{AbstractQuery, Pagination};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ShowOutput {
    url: String,
    query: AbstractQuery,
    pagination: Pagination,
}

/// Print the typed query and pagination read from a URL
pub fn show_url(config_path: &Path, url: &str, json: bool) -> Result<()> {
    let session = UrlSession::open(config_path, url)?;
    let output = ShowOutput {
        url: session.href(),
        query: session.list.query(),
        pagination: session.list.pagination(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("url: {}", output.url);
    println!("page: {}", output.pagination.page);
    println!("size: {}", output.pagination.size);
    for (key, value) in output.query.iter() {
        println!("{}: {}", key, serde_json::to_string(value)?);
    }
    Ok(())
}
