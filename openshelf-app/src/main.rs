use anyhow::Result;
use clap::Parser;
use openshelf_common::observability::init_logging;
use openshelf_config::OpenshelfConfigLoader;
use openshelf_library::OpenLibraryClient;
use std::process::ExitCode;

mod cli;
mod render;

const APP_NAME: &str = "openshelf";
const DEFAULT_CONFIG_FILE: &str = "openshelf.yaml";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Args::parse();

    // 1) Load config (env wins)
    let loader = OpenshelfConfigLoader::new();
    let loader = match &args.config {
        Some(path) => loader.with_file(path),
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg = loader.load()?;

    let mut log_config = cfg.logging.log_config(APP_NAME);
    log_config.emit_stderr |= args.verbose;
    let log_path = init_logging(log_config)?;
    tracing::debug!(log_path = %log_path.display(), version = ?cfg.version, "openshelf.start");

    let client = OpenLibraryClient::with_options(cfg.open_library.options())?;
    let request = args.request();
    let settings = args.settings(&cfg.defaults);

    if args.dry_run {
        return match client.search_url(&request, &settings) {
            Ok(url) => {
                println!("{url}");
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("error: {e}");
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let result = client.search(&request, &settings).await;
    let format = args.format.unwrap_or(cfg.output);
    println!("{}", render::render(&result, format)?);

    Ok(if result.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
