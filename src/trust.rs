//! Trust installer delegate
//!
//! The actual trust configuration (Samba, directory objects, key tables) is
//! somebody else's job. This module defines the two calls the setup procedure
//! makes into it, and an implementation that hands them to an external helper
//! program.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::directory::DirectoryBackend;
use crate::fstore::FileStore;
use crate::options::{InstallConfig, SafeInstallConfig};
use crate::server_env::ServerEnv;

/// Everything the trust installer is given
#[derive(Debug, Clone, Copy)]
pub struct TrustSetupRequest<'a> {
    pub config: &'a InstallConfig,
    pub server: &'a ServerEnv,
    /// Always true for this tool; the shared installer also serves other callers
    pub setup_adtrust: bool,
}

impl<'a> TrustSetupRequest<'a> {
    pub fn new(config: &'a InstallConfig, server: &'a ServerEnv) -> Self {
        Self {
            config,
            server,
            setup_adtrust: true,
        }
    }
}

/// DNS SRV record the administrator may have to create by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvRecord {
    pub name: String,
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

impl SrvRecord {
    fn new(name: &str, port: u16, host: &str) -> Self {
        Self {
            name: name.to_string(),
            priority: 0,
            weight: 100,
            port,
            target: format!("{}.", host.trim_end_matches('.')),
        }
    }

    /// The `_msdcs` records AD clients use to find a domain controller
    pub fn msdcs_records(host: &str) -> Vec<Self> {
        vec![
            Self::new("_ldap._tcp.Default-First-Site-Name._sites.dc._msdcs", 389, host),
            Self::new("_ldap._tcp.dc._msdcs", 389, host),
            Self::new("_kerberos._tcp.Default-First-Site-Name._sites.dc._msdcs", 88, host),
            Self::new("_kerberos._udp.Default-First-Site-Name._sites.dc._msdcs", 88, host),
            Self::new("_kerberos._tcp.dc._msdcs", 88, host),
            Self::new("_kerberos._udp.dc._msdcs", 88, host),
        ]
    }

    /// Zone-file form of the record
    pub fn zone_line(&self) -> String {
        format!(
            "{} IN SRV {} {} {} {}",
            self.name, self.priority, self.weight, self.port, self.target
        )
    }
}

fn default_true() -> bool {
    true
}

/// What the installer reports back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    /// False when the records cannot be created automatically
    /// (for instance the integrated DNS server is not in use)
    #[serde(default = "default_true")]
    pub dns_auto_update: bool,

    /// Records to add by hand when `dns_auto_update` is false
    #[serde(default)]
    pub srv_records: Vec<SrvRecord>,
}

impl Default for InstallReport {
    fn default() -> Self {
        Self {
            dns_auto_update: true,
            srv_records: Vec::new(),
        }
    }
}

pub trait TrustInstaller {
    /// Validate the environment; may prompt for missing input in attended mode
    fn precheck(
        &mut self,
        request: &TrustSetupRequest<'_>,
        session: &mut dyn DirectoryBackend,
    ) -> Result<()>;

    /// Configure the trust subsystem and create its directory objects
    fn install(
        &mut self,
        request: &TrustSetupRequest<'_>,
        fstore: &mut FileStore,
        session: &mut dyn DirectoryBackend,
    ) -> Result<InstallReport>;
}

/// Request as handed to the helper program. Built from the safe projection,
/// so the admin password never leaves this process.
#[derive(Debug, Serialize)]
struct HelperRequest<'a> {
    setup_adtrust: bool,
    realm: &'a str,
    domain: &'a str,
    host: &'a str,
    #[serde(flatten)]
    options: SafeInstallConfig,
}

/// Runs `<helper> precheck|install --request <json>`
#[derive(Debug, Clone)]
pub struct ExternalTrustInstaller {
    helper: PathBuf,
}

impl ExternalTrustInstaller {
    pub fn new(helper: impl Into<PathBuf>) -> Self {
        Self {
            helper: helper.into(),
        }
    }

    fn request_json(request: &TrustSetupRequest<'_>) -> Result<String> {
        let body = HelperRequest {
            setup_adtrust: request.setup_adtrust,
            realm: &request.server.realm,
            domain: &request.server.domain,
            host: &request.server.host,
            options: request.config.safe_view(),
        };
        serde_json::to_string(&body).context("Failed to serialize trust setup request")
    }

    fn ensure_helper(&self) -> Result<()> {
        if !self.helper.is_file() {
            return Err(anyhow!(
                "Trust helper not found: {}. Is the trust support package installed?",
                self.helper.display()
            ));
        }
        Ok(())
    }
}

impl TrustInstaller for ExternalTrustInstaller {
    fn precheck(
        &mut self,
        request: &TrustSetupRequest<'_>,
        session: &mut dyn DirectoryBackend,
    ) -> Result<()> {
        self.ensure_helper()?;
        if !session.is_connected() {
            return Err(anyhow!("Directory session is not connected"));
        }

        // Inherit the terminal so the helper can prompt in attended mode.
        let status = Command::new(&self.helper)
            .arg("precheck")
            .arg("--request")
            .arg(Self::request_json(request)?)
            .status()
            .with_context(|| format!("Failed to execute {}", self.helper.display()))?;

        if !status.success() {
            return Err(anyhow!(
                "Trust precheck failed with exit code: {}",
                status.code().unwrap_or(-1)
            ));
        }
        Ok(())
    }

    fn install(
        &mut self,
        request: &TrustSetupRequest<'_>,
        fstore: &mut FileStore,
        session: &mut dyn DirectoryBackend,
    ) -> Result<InstallReport> {
        self.ensure_helper()?;
        if !session.is_connected() {
            return Err(anyhow!("Directory session is not connected"));
        }

        let output = Command::new(&self.helper)
            .arg("install")
            .arg("--request")
            .arg(Self::request_json(request)?)
            .arg("--sysrestore")
            .arg(fstore.path())
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("Failed to execute {}", self.helper.display()))?;

        if !output.status.success() {
            return Err(anyhow!(
                "Trust installation failed with exit code: {}",
                output.status.code().unwrap_or(-1)
            ));
        }

        parse_report(&String::from_utf8_lossy(&output.stdout), &request.server.host)
    }
}

/// Read the helper's JSON report; empty output means "nothing special"
fn parse_report(stdout: &str, host: &str) -> Result<InstallReport> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Ok(InstallReport::default());
    }

    let mut report: InstallReport =
        serde_json::from_str(stdout).context("Trust helper returned an invalid report")?;

    if !report.dns_auto_update && report.srv_records.is_empty() {
        report.srv_records = SrvRecord::msdcs_records(host);
    }
    Ok(report)
}
