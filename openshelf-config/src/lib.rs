//! Loader for openshelf configuration with YAML + environment overlays.
//!
//! Every section and field is optional. Sources merge in the order they are
//! added, with `OPENSHELF__`-prefixed environment variables on top
//! (`OPENSHELF__OPEN_LIBRARY__TIMEOUT_SECS=30` sets `open_library.timeout_secs`).
//! String values may reference other variables as `${VAR}`; expansion runs
//! after merging.
use config::{Config, ConfigError, Environment, File};
use openshelf_common::observability::{LogConfig, LogFormat};
use openshelf_common::OutputFormat;
use openshelf_library::{CoverSize, OpenLibraryOptions, UserSettings};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "OPENSHELF";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpenshelfConfig {
    pub version: Option<String>,
    pub open_library: OpenLibraryConfig,
    /// Settings applied when the caller does not supply their own.
    pub defaults: UserSettings,
    pub logging: LoggingConfig,
    pub output: OutputFormat,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OpenLibraryConfig {
    pub search_url: String,
    pub site_url: String,
    pub covers_url: String,
    pub timeout_secs: u64,
    pub cover_size: CoverSize,
}

impl Default for OpenLibraryConfig {
    fn default() -> Self {
        let d = OpenLibraryOptions::default();
        Self {
            search_url: d.search_url,
            site_url: d.site_url,
            covers_url: d.covers_url,
            timeout_secs: d.timeout.as_secs(),
            cover_size: d.cover_size,
        }
    }
}

impl OpenLibraryConfig {
    pub fn options(&self) -> OpenLibraryOptions {
        OpenLibraryOptions {
            search_url: self.search_url.clone(),
            site_url: self.site_url.clone(),
            covers_url: self.covers_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            cover_size: self.cover_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let d = LogConfig::default();
        Self {
            format: d.format,
            emit_stderr: d.emit_stderr,
            filter: d.default_filter,
            dir: d.log_dir,
        }
    }
}

impl LoggingConfig {
    pub fn log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct OpenshelfConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for OpenshelfConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenshelfConfigLoader {
    /// Start from built-in defaults plus `OPENSHELF__` env overrides.
    ///
    /// ```
    /// use openshelf_config::OpenshelfConfigLoader;
    ///
    /// let config = OpenshelfConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.open_library.search_url, "https://openlibrary.org/search.json");
    /// ```
    pub fn new() -> Self {
        let builder = Config::builder();
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file) but silently skipped when missing,
    /// so headless deployments can rely on environment variables alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use openshelf_config::OpenshelfConfigLoader;
    /// use openshelf_library::CoverSize;
    ///
    /// let cfg = OpenshelfConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// open_library:
    ///   cover_size: L
    /// defaults:
    ///   limit: 10
    ///   publish_year_from: 1950
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.open_library.cover_size, CoverSize::Large);
    /// assert_eq!(cfg.defaults.limit.as_deref(), Some("10"));
    /// assert_eq!(cfg.defaults.publish_year_from, "1950");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment overrides are layered last, then `${VAR}` placeholders are
    /// expanded before materialising the typed structs.
    pub fn load(self) -> Result<OpenshelfConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: OpenshelfConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
