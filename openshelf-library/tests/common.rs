use std::sync::OnceLock;

use openshelf_common::observability::{LogConfig, LogFormat, init_logging};
use openshelf_library::{OpenLibraryClient, OpenLibraryOptions};
use wiremock::MockServer;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "openshelf-tests",
            log_dir: Some(std::env::temp_dir().join("openshelf-tests")),
            emit_stderr: true,
            format: if std::env::var("OPENSHELF_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        init_logging(config).unwrap_or_default()
    });
}

/// Client pointed at the mock server, with the production link roots.
pub fn client_for(server: &MockServer) -> OpenLibraryClient {
    OpenLibraryClient::with_options(OpenLibraryOptions {
        search_url: format!("{}/search.json", server.uri()),
        ..Default::default()
    })
    .expect("mock server uri is a valid URL")
}
