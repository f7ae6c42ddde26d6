use anyhow::{anyhow, Result};
use chrono::Local;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Records emitted through the
/// `log` facade are forwarded as well.
///
/// # Arguments
/// * `log_dir` - Write to a timestamped file in this directory instead of stderr
/// * `default_level` - Filter directive used when `RUST_LOG` is absent
pub fn init_logger(log_dir: Option<&str>, default_level: &str) -> Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_dir {
        Some(log_dir) => {
            if !Path::new(log_dir).exists() {
                fs::create_dir_all(log_dir)?;
            }

            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            let log_file = format!("{}/tld_reconciler_{}.log", log_dir, timestamp);

            FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(fs::File::create(&log_file)?))
                .try_init()
                .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

            info!("Logging to {}", log_file);
        }
        None => {
            FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!("Failed to install logger: {}", e))?;
        }
    }

    Ok(())
}

/// Maps repeated `-v` flags to a filter directive
pub fn level_for_verbosity(verbose: u8, quiet_default: &str) -> &str {
    match verbose {
        0 => quiet_default,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
