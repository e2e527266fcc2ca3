mod cli;
mod commands;

use clap::Parser;
use cli::{Args, LogLevel};
use integrationcli::gcp::http::{api_error_message, error_hint};
use integrationcli::Error;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Exit code for rejected input
const EXIT_VALIDATION: u8 = 2;

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    // INTEGRATIONCLI_LOG overrides --log-level, e.g. "integrationcli=debug,reqwest=debug"
    let filter = EnvFilter::try_from_env("INTEGRATIONCLI_LOG").unwrap_or_else(|_| {
        EnvFilter::new(format!("integrationcli={}", tracing_level.as_str().to_lowercase()))
    });

    let guard = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("Failed to open log file {:?}: {}", path, e))?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking.with_max_level(tracing_level))
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .init();

            guard
        }
        None => {
            let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking.with_max_level(tracing_level))
                .with_target(false)
                .without_time()
                .compact()
                .init();

            guard
        }
    };

    tracing::debug!("integrationcli started with log level: {:?}", level);

    Ok(Some(guard))
}

fn report(err: &anyhow::Error) -> ExitCode {
    eprintln!("Error: {err:#}");

    if let Some(Error::Http { body, .. }) = err.downcast_ref::<Error>() {
        if let Some(message) = api_error_message(body) {
            eprintln!("  {}", message);
        }
    }
    if let Some(hint) = error_hint(err) {
        eprintln!("{}", hint);
    }

    match err.downcast_ref::<Error>() {
        Some(e) if e.is_validation() => ExitCode::from(EXIT_VALIDATION),
        _ => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => return report(&err),
    };

    match commands::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}
