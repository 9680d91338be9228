//! Resolved installation options
//!
//! [`InstallConfig`] is the immutable snapshot the whole procedure works from.
//! It is built once by [`crate::cli::Args::resolve`] and never mutated.
//! The admin password lives in [`AdminPassword`], which has no `Serialize`
//! impl and a redacting `Debug`, so the only way to record the configuration
//! is through [`InstallConfig::safe_view`].

use serde::Serialize;

use crate::error::{Result, SetupError};

/// First RID handed out to local accounts
pub const DEFAULT_PRIMARY_RID_BASE: u32 = 1000;

/// First RID of the secondary range used when a primary RID collides
pub const DEFAULT_SECONDARY_RID_BASE: u32 = 100_000_000;

/// Administrative principal used when `--admin-name` is not given
pub const DEFAULT_ADMIN_NAME: &str = "admin";

const NETBIOS_NAME_MAX: usize = 15;

/// Sensitive admin password
#[derive(Clone, PartialEq, Eq)]
pub struct AdminPassword(String);

impl AdminPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Plaintext, only for handing to `kinit`
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminPassword(********)")
    }
}

/// Optional follow-up work requested from the trust installer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrustFlags {
    /// Backfill SIDs for existing users and groups
    pub add_sids: bool,
    /// Register the other servers as trust agents
    pub add_agents: bool,
    /// Enable the legacy-client compatibility plugin
    pub enable_compat: bool,
}

/// Resolved invocation options
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub debug: bool,
    pub netbios_name: Option<String>,
    pub rid_base: u32,
    pub secondary_rid_base: u32,
    pub unattended: bool,
    pub admin_name: String,
    pub admin_password: Option<AdminPassword>,
    pub flags: TrustFlags,
}

/// Projection of [`InstallConfig`] that is safe to log
#[derive(Debug, Clone, Serialize)]
pub struct SafeInstallConfig {
    pub debug: bool,
    pub netbios_name: Option<String>,
    pub rid_base: u32,
    pub secondary_rid_base: u32,
    pub unattended: bool,
    pub admin_name: String,
    pub admin_password_supplied: bool,
    #[serde(flatten)]
    pub flags: TrustFlags,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            debug: false,
            netbios_name: None,
            rid_base: DEFAULT_PRIMARY_RID_BASE,
            secondary_rid_base: DEFAULT_SECONDARY_RID_BASE,
            unattended: false,
            admin_name: DEFAULT_ADMIN_NAME.to_string(),
            admin_password: None,
            flags: TrustFlags::default(),
        }
    }
}

impl InstallConfig {
    /// Strip every password-bearing field
    pub fn safe_view(&self) -> SafeInstallConfig {
        SafeInstallConfig {
            debug: self.debug,
            netbios_name: self.netbios_name.clone(),
            rid_base: self.rid_base,
            secondary_rid_base: self.secondary_rid_base,
            unattended: self.unattended,
            admin_name: self.admin_name.clone(),
            admin_password_supplied: self.admin_password.is_some(),
            flags: self.flags,
        }
    }
}

/// Normalize and check a NetBIOS domain name
pub fn normalize_netbios_name(raw: &str) -> Result<String> {
    let name = raw.trim().to_ascii_uppercase();

    if name.is_empty() || name.len() > NETBIOS_NAME_MAX {
        return Err(SetupError::usage(format!(
            "NetBIOS name must be 1 to {NETBIOS_NAME_MAX} characters long, got '{raw}'"
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SetupError::usage(format!(
            "NetBIOS name may only contain letters, digits and '-', got '{raw}'"
        )));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_password() -> InstallConfig {
        InstallConfig {
            admin_password: Some(AdminPassword::new("Secret123!")),
            netbios_name: Some("EXAMPLE".to_string()),
            ..InstallConfig::default()
        }
    }

    #[test]
    fn test_defaults_match_constants() {
        let config = InstallConfig::default();
        assert_eq!(config.rid_base, 1000);
        assert_eq!(config.secondary_rid_base, 100_000_000);
        assert_eq!(config.admin_name, "admin");
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn test_safe_view_never_contains_password() {
        let config = with_password();
        let json = serde_json::to_string(&config.safe_view()).unwrap();
        assert!(!json.contains("Secret123!"));
        assert!(json.contains("\"admin_password_supplied\":true"));
    }

    #[test]
    fn test_debug_output_redacts_password() {
        let config = with_password();
        let debug = format!("{config:?}");
        assert!(!debug.contains("Secret123!"));
        assert!(debug.contains("********"));
    }

    #[test]
    fn test_netbios_name_is_uppercased() {
        assert_eq!(normalize_netbios_name("example").unwrap(), "EXAMPLE");
        assert_eq!(normalize_netbios_name("AD-LAB1").unwrap(), "AD-LAB1");
    }

    #[test]
    fn test_netbios_name_rejects_bad_input() {
        assert!(normalize_netbios_name("").is_err());
        assert!(normalize_netbios_name("ABCDEFGHIJKLMNOP").is_err());
        assert!(normalize_netbios_name("EXAMPLE.COM").is_err());
        assert!(normalize_netbios_name("EX AMPLE").is_err());
    }
}
