use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::fmt;

use super::error::SearchError;

/// Returned in place of a page when the upstream matched nothing.
pub const NO_RESULTS_MESSAGE: &str = "No books found.";

const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

// ==============================
// Inbound
// ==============================

/// Search terms for one call.
///
/// Every text field is optional; `None` and `""` both mean "not provided".
/// Anything else, whitespace included, is sent exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Free-text query
    pub q: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub place: Option<String>,
    pub person: Option<String>,
    /// MARC language code, e.g. `eng`
    pub language: Option<String>,
    pub offset: u32,
}

impl SearchRequest {
    /// Free-text search with every other field unset.
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Default::default()
        }
    }

    /// Field-scoped filters in the order they are sent upstream.
    pub(crate) fn field_filters(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("title", provided(self.title.as_deref())),
            ("author", provided(self.author.as_deref())),
            ("subject", provided(self.subject.as_deref())),
            ("place", provided(self.place.as_deref())),
            ("person", provided(self.person.as_deref())),
            ("language", provided(self.language.as_deref())),
        ]
    }
}

/// Caller settings exactly as typed into a form or config file.
///
/// Numeric settings stay textual until [`validate`](super::query::validate)
/// so that bad input can be reported instead of silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub sort: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub publish_year_from: String,
    #[serde(deserialize_with = "text_or_number")]
    pub publish_year_to: String,
    #[serde(deserialize_with = "optional_text_or_number")]
    pub limit: Option<String>,
}

/// Value when present and non-empty.
pub(crate) fn provided(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<TextOrNumber> for String {
    fn from(v: TextOrNumber) -> Self {
        match v {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Int(n) => n.to_string(),
            TextOrNumber::Float(n) => n.to_string(),
        }
    }
}

// YAML and JSON front-ends hand us `limit: 20` as often as `limit: "20"`.
fn optional_text_or_number<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TextOrNumber>::deserialize(d)?.map(String::from))
}

fn text_or_number<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text_or_number(d)?.unwrap_or_default())
}

/// Inclusive, possibly open-ended range over first publication year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearRange {
    pub from: Option<Number>,
    pub to: Option<Number>,
}

impl YearRange {
    /// Solr range term understood by the search endpoint, or `None` when
    /// neither bound is set.
    ///
    /// ```
    /// use openshelf_library::YearRange;
    ///
    /// let r = YearRange { from: Some(1950.into()), to: None };
    /// assert_eq!(r.filter_term().as_deref(), Some("first_publish_year:[1950 TO *]"));
    /// assert_eq!(YearRange::default().filter_term(), None);
    /// ```
    pub fn filter_term(&self) -> Option<String> {
        let range = match (&self.from, &self.to) {
            (Some(from), Some(to)) => format!("[{from} TO {to}]"),
            (Some(from), None) => format!("[{from} TO *]"),
            (None, Some(to)) => format!("[* TO {to}]"),
            (None, None) => return None,
        };
        Some(format!("first_publish_year:{range}"))
    }
}

/// Settings after validation; only well-formed values survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedSettings {
    pub sort: Option<String>,
    pub years: YearRange,
    pub limit: Option<Number>,
}

// ==============================
// Upstream wire format
// ==============================

/// Body of `GET /search.json`. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "numFound", alias = "num_found")]
    pub num_found: u64,
    pub docs: Vec<SearchDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchDoc {
    pub key: String,
    pub title: Option<String>,
    pub author_name: Option<Vec<String>>,
    pub first_publish_year: Option<i32>,
    pub ebook_access: Option<String>,
    pub cover_i: Option<i64>,
    pub subject: Option<Vec<String>>,
    pub publisher: Option<Vec<String>>,
}

// ==============================
// Normalized output
// ==============================

/// Cover image size suffix used by the covers service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverSize {
    #[serde(rename = "S", alias = "s", alias = "small")]
    Small,
    #[default]
    #[serde(rename = "M", alias = "m", alias = "medium")]
    Medium,
    #[serde(rename = "L", alias = "l", alias = "large")]
    Large,
}

impl CoverSize {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
        }
    }
}

/// Where derived links point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplates {
    /// Root of the human-facing site; book pages hang off it by key.
    pub site_url: String,
    pub covers_url: String,
    pub cover_size: CoverSize,
}

impl LinkTemplates {
    pub fn cover_image(&self, cover_id: i64) -> String {
        format!(
            "{}/b/id/{}-{}.jpg",
            self.covers_url.trim_end_matches('/'),
            cover_id,
            self.cover_size.suffix()
        )
    }

    pub fn book_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.site_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }
}

/// First publication year, or the `"N/A"` marker when the record has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishYear {
    Year(i32),
    NotAvailable,
}

impl Serialize for PublishYear {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Year(y) => s.serialize_i32(*y),
            Self::NotAvailable => s.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl fmt::Display for PublishYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(y) => write!(f, "{y}"),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedBook {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub author_name: String,
    pub first_publish_year: PublishYear,
    pub ebook_access: String,
    pub cover_image: Option<String>,
    pub book_url: String,
    pub subject: String,
    pub publisher: String,
}

fn join_or(list: Option<Vec<String>>, fallback: &str) -> String {
    list.map(|v| v.join(", "))
        .unwrap_or_else(|| fallback.to_string())
}

impl SearchDoc {
    pub fn normalize(self, links: &LinkTemplates) -> NormalizedBook {
        let book_url = links.book_url(&self.key);
        NormalizedBook {
            cover_image: self
                .cover_i
                .filter(|id| *id != 0)
                .map(|id| links.cover_image(id)),
            first_publish_year: self
                .first_publish_year
                .filter(|y| *y != 0)
                .map_or(PublishYear::NotAvailable, PublishYear::Year),
            ebook_access: self
                .ebook_access
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            author_name: join_or(self.author_name, UNKNOWN),
            subject: join_or(self.subject, NOT_AVAILABLE),
            publisher: join_or(self.publisher, UNKNOWN),
            title: self.title,
            key: self.key,
            book_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub total: u64,
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Number>,
    pub books: Vec<NormalizedBook>,
}

/// Typed success value of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(SearchPage),
    NoResults,
}

/// Boundary shape of a search: a page, the no-results notice, or an error
/// message. Serializes untagged, so the JSON carries `books`, `message` or
/// `error` at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchResult {
    Page(SearchPage),
    Empty { message: String },
    Failed { error: String },
}

impl SearchResult {
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }
}

impl From<Result<SearchOutcome, SearchError>> for SearchResult {
    fn from(r: Result<SearchOutcome, SearchError>) -> Self {
        match r {
            Ok(SearchOutcome::Found(page)) => Self::Page(page),
            Ok(SearchOutcome::NoResults) => Self::Empty {
                message: NO_RESULTS_MESSAGE.to_string(),
            },
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}
