//! Common types and utilities shared across openshelf crates.
//!
//! Kept deliberately small so every crate can depend on it: the
//! [`observability`] module owns `tracing` initialisation, and
//! [`OutputFormat`] describes how results are rendered for humans.
//!
//! ```rust
//! use openshelf_common::OutputFormat;
//!
//! let fmt: OutputFormat = "text".parse().unwrap();
//! assert_eq!(fmt, OutputFormat::Text);
//! assert_eq!(OutputFormat::default(), OutputFormat::Json);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Preferred output format for rendered search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Text => f.write_str("text"),
        }
    }
}
