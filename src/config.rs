//! On-disk tool settings
//!
//! Paths and external commands the setup procedure talks to. Everything has
//! a default, so a missing settings file is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SetupError};

/// Settings file consulted when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/adtrust-install/adtrust-install.toml";

/// Top-level tool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    /// Where the run log is appended
    pub log_file: PathBuf,
    /// Server environment written by the directory server installer
    pub server_conf: PathBuf,
    /// Rollback/restore store
    pub sysrestore_dir: PathBuf,
    /// Group whose members may configure trusts
    pub admin_group: String,
    pub ipa_command: String,
    pub kinit_command: String,
    pub klist_command: String,
    /// Helper implementing the trust precheck and install steps
    pub trust_helper: PathBuf,
    /// Command that enables configured services for a host
    pub service_sync_command: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("/var/log/adtrust-install.log"),
            server_conf: PathBuf::from("/etc/ipa/default.conf"),
            sysrestore_dir: PathBuf::from("/var/lib/ipa/sysrestore"),
            admin_group: "admins".into(),
            ipa_command: "ipa".into(),
            kinit_command: "kinit".into(),
            klist_command: "klist".into(),
            trust_helper: PathBuf::from("/usr/libexec/adtrust-install/adtrust-helper"),
            service_sync_command: PathBuf::from("/usr/libexec/adtrust-install/sync-services"),
        }
    }
}

impl ToolConfig {
    /// Load settings, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| SetupError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        Self::from_toml(&contents).map_err(|e| SetupError::Config {
            message: format!("{}: {e}", path.display()),
        })
    }

    fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
