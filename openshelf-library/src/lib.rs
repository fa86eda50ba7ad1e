//! Book search against the Open Library catalogue.
//!
//! Takes a structured [`SearchRequest`] plus loosely typed [`UserSettings`],
//! validates the settings, builds the upstream query, performs one request
//! and reshapes the response into a stable list of [`NormalizedBook`]s.
//!
//! ```no_run
//! use openshelf_library::{OpenLibraryClient, SearchRequest, UserSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), openshelf_http::HttpError> {
//! let client = OpenLibraryClient::new()?;
//! let settings = UserSettings {
//!     publish_year_from: "1950".into(),
//!     limit: Some("5".into()),
//!     ..Default::default()
//! };
//! let result = client.search(&SearchRequest::query("tolkien"), &settings).await;
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod openlibrary;

pub use openlibrary::*;
