//! Cluster service registry
//!
//! After the trust components are configured, the services now enabled on
//! this host have to be published in the cluster's shared service state.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, anyhow};

pub trait ServiceRegistry {
    /// Publish the enabled-service list of `host` to the rest of the cluster
    fn sync_services_state(&mut self, host: &str) -> Result<()>;
}

/// Runs the configured sync command with the host name
#[derive(Debug, Clone)]
pub struct CommandServiceRegistry {
    command: PathBuf,
}

impl CommandServiceRegistry {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ServiceRegistry for CommandServiceRegistry {
    fn sync_services_state(&mut self, host: &str) -> Result<()> {
        log::debug!("Running {} {host}", self.command.display());

        let output = Command::new(&self.command)
            .arg(host)
            .output()
            .with_context(|| format!("Failed to execute {}", self.command.display()))?;

        if !output.status.success() {
            return Err(anyhow!(
                "Failed to sync service state for {host}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(())
    }
}
