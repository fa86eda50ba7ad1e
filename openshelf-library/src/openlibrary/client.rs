use super::error::SearchError;
use super::query::{build_query, validate};
use super::types::{
    CoverSize, LinkTemplates, SearchOutcome, SearchPage, SearchRequest, SearchResponse,
    SearchResult, UserSettings,
};
use openshelf_http::{HttpClient, HttpError, RequestOpts, Url};
use std::borrow::Cow;
use std::time::{Duration, Instant};

pub const DEFAULT_SEARCH_URL: &str = "https://openlibrary.org/search.json";
pub const DEFAULT_SITE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Endpoints and knobs for [`OpenLibraryClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenLibraryOptions {
    pub search_url: String,
    pub site_url: String,
    pub covers_url: String,
    pub timeout: Duration,
    pub cover_size: CoverSize,
}

impl Default for OpenLibraryOptions {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            covers_url: DEFAULT_COVERS_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cover_size: CoverSize::default(),
        }
    }
}

/// Client for the Open Library search endpoint.
///
/// One call is one GET; nothing is cached or retried. The client holds no
/// per-call state and can be cloned and shared freely.
#[derive(Clone, Debug)]
pub struct OpenLibraryClient {
    http: HttpClient,
    search_path: String,
    links: LinkTemplates,
}

impl OpenLibraryClient {
    pub fn new() -> Result<Self, HttpError> {
        Self::with_options(OpenLibraryOptions::default())
    }

    /// ```
    /// use openshelf_library::{OpenLibraryClient, OpenLibraryOptions};
    ///
    /// let client = OpenLibraryClient::with_options(OpenLibraryOptions {
    ///     search_url: "http://127.0.0.1:8080/search.json".into(),
    ///     ..Default::default()
    /// })
    /// .unwrap();
    /// let url = client
    ///     .search_url(&Default::default(), &Default::default())
    ///     .unwrap();
    /// assert_eq!(url.path(), "/search.json");
    /// ```
    pub fn with_options(opts: OpenLibraryOptions) -> Result<Self, HttpError> {
        let endpoint = Url::parse(&opts.search_url).map_err(|e| HttpError::Url(e.to_string()))?;
        let search_path = endpoint
            .path_segments()
            .and_then(|mut segs| segs.next_back())
            .unwrap_or_default()
            .to_string();
        let base = endpoint
            .join("./")
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let http = HttpClient::new(base.as_str())?.with_timeout(opts.timeout);
        Ok(Self {
            http,
            search_path,
            links: LinkTemplates {
                site_url: opts.site_url,
                covers_url: opts.covers_url,
                cover_size: opts.cover_size,
            },
        })
    }

    /// Run one search and fold every failure into the `{ error }` shape.
    pub async fn search(&self, request: &SearchRequest, settings: &UserSettings) -> SearchResult {
        self.try_search(request, settings).await.into()
    }

    /// The exact URL [`search`](Self::search) would request.
    pub fn search_url(
        &self,
        request: &SearchRequest,
        settings: &UserSettings,
    ) -> Result<Url, SearchError> {
        let validated = validate(settings)?;
        let opts = RequestOpts {
            query: Some(Cow::Owned(build_query(request, &validated))),
            ..Default::default()
        };
        Ok(self.http.resolve(&self.search_path, &opts)?)
    }

    /// Typed variant of [`search`](Self::search).
    pub async fn try_search(
        &self,
        request: &SearchRequest,
        settings: &UserSettings,
    ) -> Result<SearchOutcome, SearchError> {
        let validated = validate(settings).map_err(|e| {
            tracing::warn!(
                target: "library.openlibrary",
                error = %e,
                "openlibrary.search.invalid_input"
            );
            e
        })?;
        let query = build_query(request, &validated);

        let started = Instant::now();
        tracing::info!(
            target: "library.openlibrary",
            query = %query,
            "openlibrary.search.start"
        );

        let resp: SearchResponse = self
            .http
            .get_json(
                &self.search_path,
                RequestOpts {
                    query: Some(Cow::Owned(query)),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| {
                let e = SearchError::from(e);
                tracing::warn!(
                    target: "library.openlibrary",
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    kind = ?e.kind(),
                    error = %e,
                    "openlibrary.search.failed"
                );
                e
            })?;

        tracing::info!(
            target: "library.openlibrary",
            elapsed_ms = started.elapsed().as_millis() as u64,
            total = resp.num_found,
            returned = resp.docs.len(),
            "openlibrary.search.done"
        );

        if resp.docs.is_empty() {
            return Ok(SearchOutcome::NoResults);
        }

        let books = resp
            .docs
            .into_iter()
            .map(|doc| doc.normalize(&self.links))
            .collect();

        Ok(SearchOutcome::Found(SearchPage {
            total: resp.num_found,
            offset: request.offset,
            limit: validated.limit,
            books,
        }))
    }
}
