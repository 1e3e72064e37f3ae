//! Shared error type and result helpers used across mortar crates.

pub mod error;

pub use error::{Context, Error, Result};
