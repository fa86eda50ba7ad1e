use clap::Parser;
use openshelf_common::OutputFormat;
use openshelf_library::{SearchRequest, UserSettings};
use std::path::PathBuf;

/// Search the Open Library catalogue.
#[derive(Debug, Parser)]
#[command(name = "openshelf", version, about)]
pub struct Args {
    /// Free-text query
    pub query: Option<String>,

    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub subject: Option<String>,
    #[arg(long)]
    pub place: Option<String>,
    #[arg(long)]
    pub person: Option<String>,
    /// MARC language code, e.g. `eng`
    #[arg(long)]
    pub language: Option<String>,

    /// Number of results to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Sort order, e.g. `new`, `old`, `rating`
    #[arg(long)]
    pub sort: Option<String>,
    /// Earliest first publication year
    #[arg(long = "from", value_name = "YEAR", allow_hyphen_values = true)]
    pub publish_year_from: Option<String>,
    /// Latest first publication year
    #[arg(long = "to", value_name = "YEAR", allow_hyphen_values = true)]
    pub publish_year_to: Option<String>,
    /// Maximum number of results
    #[arg(long, allow_hyphen_values = true)]
    pub limit: Option<String>,

    /// Configuration file (defaults to ./openshelf.yaml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Output format: json or text
    #[arg(long)]
    pub format: Option<OutputFormat>,
    /// Print the request URL instead of sending it
    #[arg(long)]
    pub dry_run: bool,
    /// Mirror log events to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn request(&self) -> SearchRequest {
        SearchRequest {
            q: self.query.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            subject: self.subject.clone(),
            place: self.place.clone(),
            person: self.person.clone(),
            language: self.language.clone(),
            offset: self.offset,
        }
    }

    /// Flags win over configured defaults, one setting at a time.
    pub fn settings(&self, defaults: &UserSettings) -> UserSettings {
        UserSettings {
            sort: self.sort.clone().or_else(|| defaults.sort.clone()),
            publish_year_from: self
                .publish_year_from
                .clone()
                .unwrap_or_else(|| defaults.publish_year_from.clone()),
            publish_year_to: self
                .publish_year_to
                .clone()
                .unwrap_or_else(|| defaults.publish_year_to.clone()),
            limit: self.limit.clone().or_else(|| defaults.limit.clone()),
        }
    }
}
