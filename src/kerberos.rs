//! Kerberos ticket handling
//!
//! Ticket acquisition failures are deliberately not part of
//! [`crate::error::SetupError`]: a failed `kinit` only downgrades the run to
//! whatever credentials were already in the cache.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, anyhow};
use thiserror::Error;

use crate::options::AdminPassword;

/// Why a ticket is being (re)acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// Before the first directory query
    Initial,
    /// Trust installation changed the admin account's attributes, so the
    /// existing ticket no longer carries the right authorization data
    PostInstallAttributeChange,
}

impl RefreshReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshReason::Initial => "initial",
            RefreshReason::PostInstallAttributeChange => "post-install-attribute-change",
        }
    }
}

impl std::fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket acquisition failure, always recoverable
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("{tool} not found in PATH")]
    MissingTool { tool: String },

    #[error("Failed to run {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("kinit for {principal} failed: {message}")]
    Rejected { principal: String, message: String },
}

/// Ticket cache operations
pub trait TicketAgent {
    /// Obtain a fresh ticket for `principal`
    fn kinit(
        &mut self,
        principal: &str,
        password: &AdminPassword,
        reason: RefreshReason,
    ) -> Result<(), CredentialError>;

    /// Default principal of the current ticket cache
    fn current_principal(&mut self) -> anyhow::Result<String>;
}

/// Drives the MIT `kinit` / `klist` tools
#[derive(Debug, Clone)]
pub struct KinitAgent {
    kinit: String,
    klist: String,
}

impl KinitAgent {
    pub fn new(kinit: impl Into<String>, klist: impl Into<String>) -> Self {
        Self {
            kinit: kinit.into(),
            klist: klist.into(),
        }
    }
}

impl TicketAgent for KinitAgent {
    fn kinit(
        &mut self,
        principal: &str,
        password: &AdminPassword,
        reason: RefreshReason,
    ) -> Result<(), CredentialError> {
        let kinit = which::which(&self.kinit).map_err(|_| CredentialError::MissingTool {
            tool: self.kinit.clone(),
        })?;

        log::debug!("Running {} {principal} ({reason})", kinit.display());

        let mut child = Command::new(&kinit)
            .arg(principal)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CredentialError::Spawn {
                tool: self.kinit.clone(),
                message: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{}", password.expose()).map_err(|e| CredentialError::Spawn {
                tool: self.kinit.clone(),
                message: format!("failed to pass password: {e}"),
            })?;
        }

        let output = child.wait_with_output().map_err(|e| CredentialError::Spawn {
            tool: self.kinit.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(CredentialError::Rejected {
                principal: principal.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn current_principal(&mut self) -> anyhow::Result<String> {
        let klist = which::which(&self.klist)
            .with_context(|| format!("{} not found in PATH", self.klist))?;

        let output = Command::new(&klist)
            .output()
            .with_context(|| format!("Failed to execute {}", klist.display()))?;

        if !output.status.success() {
            return Err(anyhow!(
                "No Kerberos credentials available: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        parse_default_principal(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| anyhow!("klist output has no default principal"))
    }
}

/// Pull `Default principal: ...` out of `klist` output
pub fn parse_default_principal(klist_output: &str) -> Option<String> {
    klist_output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Default principal:"))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

/// Account name a principal refers to
///
/// Drops the `@REALM` suffix and any `service/` prefix:
/// `admin@EXAMPLE.TEST` gives `admin`, `host/ipa.example.test@EXAMPLE.TEST`
/// gives `ipa.example.test`.
///
/// Everything up to the last `/` is treated as a service prefix. A user
/// principal with an instance, such as `jdoe/admin@REALM`, therefore resolves
/// to `admin` rather than `jdoe`, and the membership check runs against the
/// `admin` account.
pub fn short_account_name(principal: &str) -> &str {
    let without_realm = match principal.rsplit_once('@') {
        Some((name, _realm)) => name,
        None => principal,
    };
    match without_realm.rsplit_once('/') {
        Some((_service, name)) => name,
        None => without_realm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_account_name() {
        assert_eq!(short_account_name("admin@EXAMPLE.TEST"), "admin");
        assert_eq!(short_account_name("admin"), "admin");
        assert_eq!(
            short_account_name("host/ipa.example.test@EXAMPLE.TEST"),
            "ipa.example.test"
        );
        assert_eq!(short_account_name("jdoe/admin@EXAMPLE.TEST"), "admin");
        assert_eq!(short_account_name("trustadmin/"), "");
    }

    #[test]
    fn test_parse_default_principal() {
        let output = "Ticket cache: KCM:0\n\
                      Default principal: admin@EXAMPLE.TEST\n\
                      \n\
                      Valid starting       Expires              Service principal\n";
        assert_eq!(
            parse_default_principal(output).as_deref(),
            Some("admin@EXAMPLE.TEST")
        );
        assert_eq!(parse_default_principal("klist: No credentials cache found"), None);
    }

    #[test]
    fn test_refresh_reason_tags() {
        assert_eq!(RefreshReason::Initial.to_string(), "initial");
        assert_eq!(
            RefreshReason::PostInstallAttributeChange.to_string(),
            "post-install-attribute-change"
        );
    }
}
