//! `tracing` setup for the `openshelf` binary and the integration tests.
//!
//! Events go to a daily-rotated file named `<app>.log.<YYYY-MM-DD>`, and
//! optionally to stderr as well. The first [`init_logging`] call installs the
//! subscriber; later calls return the file chosen by the first one.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static FLUSH_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static ACTIVE_FILE: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "OPENSHELF_LOG_DIR";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Line encoding shared by every sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Stem of the log file and of the fallback directory.
    pub app_name: &'static str,
    /// Wins over `OPENSHELF_LOG_DIR`; `~/` is expanded.
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Directive used when `RUST_LOG` is unset or unparsable.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "openshelf",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

/// Install the global subscriber and return today's log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = ACTIVE_FILE.get() {
        return Ok(path.clone());
    }

    let dir = log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let stem = format!("{}.log", config.app_name);
    let file = dir.join(format!("{stem}.{}", Local::now().format("%Y-%m-%d")));

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &stem));
    let _ = FLUSH_GUARD.set(guard);

    let mut sinks = vec![sink(config.format, writer, false)];
    if config.emit_stderr {
        sinks.push(sink(config.format, std::io::stderr, true));
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(sinks)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = ACTIVE_FILE.set(file.clone());
    Ok(file)
}

fn sink<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

fn log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from))
        .map(|dir| with_home(&dir))
        .unwrap_or_else(|| data_home().join(app_name))
}

fn with_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

// XDG data home, or the working directory when HOME is unset.
fn data_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".local/share"))
        .unwrap_or_else(|| PathBuf::from("."))
}
