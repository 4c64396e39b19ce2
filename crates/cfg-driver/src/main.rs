//! Configuration core CLI: load a file, start it, commit the persist
//! store, and exit with the code spec.md §6 names.

use cfg_driver::GlobalConfig;
use cfg_lexer::Version;
use cfg_persist::PersistStore;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Configuration-language front end and persistent-state store for a
/// syslog-style log router.
#[derive(Parser, Debug)]
#[command(name = "cfg-driver", version, about, long_about = None)]
struct Args {
    /// Top-level configuration file to load.
    config: PathBuf,

    /// Directory searched for relative `@include` targets.
    #[arg(long, default_value = "")]
    include_path: String,

    /// Target configuration version, overridden by a file's own
    /// `@version` pragma once one is seen.
    #[arg(long, default_value = "4.7")]
    version: String,

    /// Path to the persist file backing this configuration's runtime state.
    #[arg(long, default_value = "cfg-driver.persist")]
    persist_file: PathBuf,

    /// Load every persisted entry regardless of its `in_use` flag, for
    /// offline inspection rather than a live start.
    #[arg(long)]
    load_all: bool,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    let exit_code = run(&args);
    std::process::exit(exit_code);
}

fn run(args: &Args) -> i32 {
    let target_version = Version::parse(&args.version).unwrap_or(Version::new(4, 7));
    tracing::info!(config = %args.config.display(), version = %target_version, "cfg-driver: loading configuration");

    let mut persist = PersistStore::new(&args.persist_file);
    let persist_result = if args.load_all { persist.start_load_all() } else { persist.start() };
    if let Err(err) = persist_result {
        tracing::error!(error = %err, "failed to load persist file");
        return 1;
    }

    let config_path = args.config.to_string_lossy();
    let mut config = match GlobalConfig::load(&config_path, &args.include_path, target_version) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "configuration load failed");
            return err.exit_code();
        }
    };

    if let Err(err) = config.start() {
        tracing::error!(error = %err, "configuration failed to start");
        return err.exit_code();
    }

    tracing::info!("configuration started, committing persist file");
    if let Err(err) = persist.commit() {
        tracing::error!(error = %err, "failed to commit persist file");
        config.stop();
        return 1;
    }

    config.stop();
    0
}
