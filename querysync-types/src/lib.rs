//! Shared types for querysync
//!
//! This crate provides the data model used across the querysync crates:
//! the flat string query stored by routers and the typed abstract query
//! handed to callers.

mod flat;
mod value;

pub use flat::{FlatQuery, FlatValue};
pub use value::{AbstractQuery, QueryScalar, QueryValue};

pub use chrono::{DateTime, Utc};
pub use num_bigint::BigInt;
