//! CLI argument parsing for adtrust-install

use std::path::PathBuf;

use clap::Parser;

use crate::error::{Result, SetupError};
use crate::options::{
    AdminPassword, DEFAULT_ADMIN_NAME, DEFAULT_PRIMARY_RID_BASE, DEFAULT_SECONDARY_RID_BASE,
    InstallConfig, TrustFlags, normalize_netbios_name,
};

/// Command-line arguments for adtrust-install
#[derive(Parser, Debug, Clone)]
#[command(name = "adtrust-install")]
#[command(version, about = "Prepare this server for trusts with Active Directory domains")]
pub struct Args {
    /// Print debugging information
    #[arg(short, long)]
    pub debug: bool,

    /// NetBIOS name of the domain
    #[arg(long, value_name = "NETBIOS_NAME")]
    pub netbios_name: Option<String>,

    /// Start value for mapping UIDs and GIDs to RIDs
    #[arg(long, value_name = "RID_BASE", default_value_t = DEFAULT_PRIMARY_RID_BASE)]
    pub rid_base: u32,

    /// Start value of the secondary range for mapping UIDs and GIDs to RIDs
    #[arg(long, value_name = "SECONDARY_RID_BASE", default_value_t = DEFAULT_SECONDARY_RID_BASE)]
    pub secondary_rid_base: u32,

    /// Unattended installation, never prompts the user
    #[arg(short = 'U', long)]
    pub unattended: bool,

    /// Admin user Kerberos password
    #[arg(short = 'a', long, value_name = "PASSWORD")]
    pub admin_password: Option<String>,

    /// Admin user principal
    #[arg(short = 'A', long, value_name = "ADMIN_NAME", default_value = DEFAULT_ADMIN_NAME)]
    pub admin_name: String,

    /// Add SIDs for existing users and groups as the final step
    #[arg(long)]
    pub add_sids: bool,

    /// Add the other servers as trust agents
    #[arg(long)]
    pub add_agents: bool,

    /// Enable support for trusted domains for old clients
    #[arg(long)]
    pub enable_compat: bool,

    /// Accepted for compatibility, ignored
    #[arg(long, hide = true)]
    pub no_msdcs: bool,

    /// Alternate tool settings file
    #[arg(long, hide = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Turn raw arguments into the immutable install configuration
    pub fn resolve(&self) -> Result<InstallConfig> {
        let netbios_name = self
            .netbios_name
            .as_deref()
            .map(normalize_netbios_name)
            .transpose()?;

        let admin_name = self.admin_name.trim();
        if admin_name.is_empty() {
            return Err(SetupError::usage("Admin name cannot be empty"));
        }

        let admin_password = self
            .admin_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(AdminPassword::new);

        Ok(InstallConfig {
            debug: self.debug,
            netbios_name,
            rid_base: self.rid_base,
            secondary_rid_base: self.secondary_rid_base,
            unattended: self.unattended,
            admin_name: admin_name.to_string(),
            admin_password,
            flags: TrustFlags {
                add_sids: self.add_sids,
                add_agents: self.add_agents,
                enable_compat: self.enable_compat,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["adtrust-install"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_resolve_to_constants() {
        let config = parse(&[]).resolve().unwrap();
        assert_eq!(config.rid_base, DEFAULT_PRIMARY_RID_BASE);
        assert_eq!(config.secondary_rid_base, DEFAULT_SECONDARY_RID_BASE);
        assert_eq!(config.admin_name, "admin");
        assert!(!config.unattended);
        assert_eq!(config.flags, TrustFlags::default());
    }

    #[test]
    fn test_overrides_pass_through() {
        let config = parse(&[
            "-U",
            "--rid-base",
            "5000",
            "--secondary-rid-base",
            "200000000",
            "--netbios-name",
            "corp",
            "-A",
            "trustadmin",
            "--add-sids",
            "--enable-compat",
        ])
        .resolve()
        .unwrap();

        assert!(config.unattended);
        assert_eq!(config.rid_base, 5000);
        assert_eq!(config.secondary_rid_base, 200_000_000);
        assert_eq!(config.netbios_name.as_deref(), Some("CORP"));
        assert_eq!(config.admin_name, "trustadmin");
        assert!(config.flags.add_sids);
        assert!(!config.flags.add_agents);
        assert!(config.flags.enable_compat);
    }

    #[test]
    fn test_non_integer_rid_base_is_rejected() {
        let result = Args::try_parse_from(["adtrust-install", "--rid-base", "lots"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_msdcs_is_accepted() {
        let args = parse(&["--no-msdcs"]);
        assert!(args.no_msdcs);
        assert!(args.resolve().is_ok());
    }

    #[test]
    fn test_empty_password_means_none() {
        let config = parse(&["-a", ""]).resolve().unwrap();
        assert!(config.admin_password.is_none());

        let config = parse(&["--admin-password", "pw"]).resolve().unwrap();
        assert_eq!(config.admin_password.as_ref().map(|p| p.expose()), Some("pw"));
    }

    #[test]
    fn test_bad_netbios_name_is_usage_error() {
        let err = parse(&["--netbios-name", "way-too-long-netbios"])
            .resolve()
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
