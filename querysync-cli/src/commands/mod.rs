//! CLI command implementations.

pub mod apply;
pub mod config;
pub mod engine;
pub mod show;

pub use apply::apply_ops;
pub use config::show_config_value;
pub use show::show_url;
