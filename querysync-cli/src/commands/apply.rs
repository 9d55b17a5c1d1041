//! Apply command implementation

use super::engine::UrlSession;
use anyhow::{bail, Context, Result};
use querysync_adapters::QUERY_ARRAY_SEPARATOR;
use querysync_core::{AbstractQuery, ChangeQueryOptions, FieldKind, FlatValue};
use std::path::Path;
use tracing::debug;

/// One operation on the URL's query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Set { key: String, value: String },
    Reset,
    Page(u64),
    Size(u64),
    ResetPagination,
    ResetAll,
}

/// Parse a token list such as `set search=Max page 2 reset`
pub fn parse_ops(tokens: &[String]) -> Result<Vec<Op>> {
    let mut ops = Vec::new();
    let mut tokens = tokens.iter();

    while let Some(token) = tokens.next() {
        let op = match token.as_str() {
            "set" => {
                let arg = tokens.next().context("`set` expects key=value")?;
                let (key, value) = arg
                    .split_once('=')
                    .with_context(|| format!("`set` expects key=value, got '{}'", arg))?;
                Op::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            "page" | "size" => {
                let arg = tokens
                    .next()
                    .with_context(|| format!("`{}` expects a number", token))?;
                let n: u64 = arg
                    .parse()
                    .with_context(|| format!("`{}` expects a number, got '{}'", token, arg))?;
                if token == "page" {
                    Op::Page(n)
                } else if n == 0 {
                    bail!("Page size must be positive");
                } else {
                    Op::Size(n)
                }
            }
            "reset" => Op::Reset,
            "reset-pagination" => Op::ResetPagination,
            "reset-all" => Op::ResetAll,
            other => bail!("Unknown operation: {}", other),
        };
        ops.push(op);
    }

    Ok(ops)
}

/// Apply operations to a URL and print the resulting URL
pub fn apply_ops(config_path: &Path, url: &str, tokens: &[String], keep_page: bool) -> Result<()> {
    let ops = parse_ops(tokens)?;
    let session = UrlSession::open(config_path, url)?;
    let schema = session.config.schema();
    let options = if keep_page {
        ChangeQueryOptions::keep_page()
    } else {
        ChangeQueryOptions::default()
    };

    for op in ops {
        debug!(?op, "applying");
        match op {
            Op::Set { key, value } => {
                let flat = match schema.kind(&key) {
                    Some(FieldKind::List(_)) => FlatValue::from_list(
                        value
                            .split(QUERY_ARRAY_SEPARATOR)
                            .map(str::to_string)
                            .collect(),
                    ),
                    _ => FlatValue::from(value),
                };
                let typed = schema
                    .coerce_field(&key, &flat)
                    .with_context(|| format!("Cannot set '{}'", key))?;
                let query = AbstractQuery::new().with(key, typed);
                session.list.set_query(&query, options)?;
            }
            Op::Reset => session.list.reset_query(options)?,
            Op::Page(page) => session.list.set_page(page)?,
            Op::Size(size) => session.list.set_size(size)?,
            Op::ResetPagination => session.list.reset_pagination()?,
            Op::ResetAll => session.list.reset_query_and_pagination()?,
        }
    }

    println!("{}", session.href());
    Ok(())
}
