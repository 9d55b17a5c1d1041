//! Engine setup shared by the commands

use anyhow::{Context, Result};
use querysync_adapters::{BrowserHistory, SearchParamsRouter};
use querysync_core::{PaginatedQuery, QueryOptions, QuerySyncConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A paginated engine over a single-entry history at the given URL
pub struct UrlSession {
    pub config: QuerySyncConfig,
    pub history: Arc<BrowserHistory>,
    pub list: PaginatedQuery<SearchParamsRouter>,
}

impl UrlSession {
    pub fn open(config_path: &Path, url: &str) -> Result<Self> {
        let config =
            QuerySyncConfig::from_file(config_path).context("Failed to load configuration")?;
        let history = Arc::new(
            BrowserHistory::from_href(url).with_context(|| format!("Invalid URL: {}", url))?,
        );
        let router = SearchParamsRouter::with_config(history.clone(), config.router);

        let default_query = config
            .default_query()
            .context("Invalid field defaults in configuration")?;
        debug!(
            fields = config.fields.len(),
            default_keys = default_query.len(),
            "building engine"
        );

        let list = PaginatedQuery::new(
            router,
            config.schema(),
            default_query,
            config.partial_pagination(),
            QueryOptions::default(),
        );

        Ok(Self {
            config,
            history,
            list,
        })
    }

    /// The current URL, without scheme and host
    pub fn href(&self) -> String {
        self.history.location().href()
    }
}
