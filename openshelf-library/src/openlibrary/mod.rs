//! Open Library search adapter.
//!
//! - [`query`]: validation of user settings and query-string construction
//! - [`client`]: the single GET against `search.json` and result shaping
//! - [`types`]: request, settings, wire and normalized output types
//! - [`error`]: typed failures that collapse into `{ "error": ... }`

pub mod client;
pub mod error;
pub mod query;
pub mod types;

pub use client::{OpenLibraryClient, OpenLibraryOptions};
pub use error::{ErrorKind, InvalidSetting, SearchError};
pub use query::{build_query, validate, SEARCH_FIELDS};
pub use types::{
    CoverSize, NormalizedBook, PublishYear, SearchOutcome, SearchPage, SearchRequest,
    SearchResult, UserSettings, ValidatedSettings, YearRange, NO_RESULTS_MESSAGE,
};
