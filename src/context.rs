//! Per-run context
//!
//! Built once in `main` after the privilege gate and handed to every step.
//! Carries the log file location, the debug flag and the operator console.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::console::Console;

pub struct RunContext {
    pub log_path: PathBuf,
    pub debug: bool,
    pub console: Console,
    file_logging: bool,
}

impl RunContext {
    pub fn new(log_path: PathBuf, debug: bool, console: Console) -> Self {
        Self {
            log_path,
            debug,
            console,
            file_logging: true,
        }
    }

    /// Leave the global logger alone (embedding, tests)
    pub fn without_file_logging(mut self) -> Self {
        self.file_logging = false;
        self
    }

    /// Route the `log` facade into this run's log file
    ///
    /// Called by the procedure once the privilege gate has passed.
    pub fn start_logging(&self) -> Result<()> {
        if !self.file_logging {
            return Ok(());
        }
        init_file_logger(&self.log_path, self.debug)
    }
}

fn init_file_logger(path: &Path, debug: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("Logger already initialized")?;

    Ok(())
}
