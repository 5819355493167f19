use anyhow::{Context, Result};
use clap::Parser;
use gitlab_vars::cli::{self, Cli, LogLevel};
use gitlab_vars::env::ProcessEnv;
use gitlab_vars::gitlab::variables::SystemClock;
use std::path::Path;
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;

fn setup_logging(level: LogLevel, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    // stdout is reserved for command output
    let guard = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            builder.with_writer(non_blocking).with_ansi(false).init();
            Some(guard)
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            None
        }
    };

    tracing::info!("gitlab-vars {} started with log level: {:?}", env!("CARGO_PKG_VERSION"), level);

    Ok(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let _log_guard = match setup_logging(args.log_level, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    match cli::run(&args, &ProcessEnv, &SystemClock).await {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}
