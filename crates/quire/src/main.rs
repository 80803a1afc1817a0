mod cli;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};
use quire_core::{Application, BootOptions, SitePaths};
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Outcome};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();

    // Route `log` records from quire-core into tracing.
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {}", e);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    let mut options = BootOptions::new(SitePaths::from_root(&args.root)).with_panic_hook(true);
    if let Some(config) = &args.config {
        options = options.with_config_file(config);
    }

    let app = match Application::instance(options).await {
        Ok(app) => app,
        Err(e) if e.is_config_missing() => {
            eprintln!("{}", e);
            eprintln!("Is '{}' a Quire site root?", args.root.display());
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!("Boot failed: {}", e);
            eprintln!("Failed to boot site: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut startup_log = app.take_startup_log();
    if args.verbose > 0 || quire_core::development() {
        if let Err(e) = startup_log.flush(&mut io::stderr()) {
            error!("Could not write startup log: {}", e);
        }
    } else {
        debug!("Discarded {} startup record(s)", startup_log.discard());
    }

    let code = match cli::run(app, args.command).await {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::NotFound(message)) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
        Err(e) => {
            // Development mode already rendered the report.
            if app.error_handler().exception(&e).is_none() {
                eprintln!("{}", e);
            }
            ExitCode::FAILURE
        }
    };

    if let Err(e) = app.shutdown().await {
        error!("Shutdown failed: {}", e);
        return ExitCode::FAILURE;
    }
    code
}
