//! Error taxonomy for the trust setup procedure
//!
//! Every fatal condition the procedure can hit maps to exactly one variant.
//! The top-level handler in `main.rs` uses [`SetupError::user_message`] for the
//! single console line and [`SetupError::exit_code`] for the process status;
//! the `Display` form carries the full detail that goes to the log file.

use thiserror::Error;

/// Result type alias for setup operations
pub type Result<T> = std::result::Result<T, SetupError>;

/// Fatal errors that abort the setup procedure
#[derive(Error, Debug)]
pub enum SetupError {
    /// Malformed invocation
    #[error("Invalid options: {message}")]
    Usage { message: String },

    /// Process is not running with root-equivalent privilege
    #[error("Insufficient privilege: effective uid {euid}, root required")]
    Privilege { euid: u32 },

    /// The directory server itself has not been installed on this host
    #[error("Server configuration not found at {path}")]
    NotConfigured { path: String },

    /// The tool settings file could not be read
    #[error("Invalid tool configuration: {message}")]
    Config { message: String },

    /// The ambient Kerberos ticket was rejected by the directory
    #[error("Directory rejected the current credentials: {detail}")]
    AuthExpired { detail: String },

    /// The directory service could not be reached
    #[error("Directory service unavailable: {detail}")]
    BackendUnavailable { detail: String },

    /// The administrative membership check did not pass
    #[error("Authorization check failed: {detail}")]
    Authorization { detail: String },

    /// The trust precheck or install routine failed
    #[error("Trust installation failed: {0:#}")]
    DelegateInstall(anyhow::Error),

    /// Anything not covered above
    #[error("{0:#}")]
    Unexpected(anyhow::Error),
}

impl SetupError {
    /// Shorthand for a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        SetupError::Usage {
            message: message.into(),
        }
    }

    /// The single human-readable line printed on the console
    pub fn user_message(&self) -> String {
        match self {
            SetupError::Usage { message } => message.clone(),
            SetupError::Privilege { .. } => "Must be root to setup AD trusts on server".to_string(),
            SetupError::NotConfigured { .. } => "IPA is not configured on this system.".to_string(),
            SetupError::Config { message } => format!("Invalid configuration: {message}"),
            SetupError::AuthExpired { .. } => {
                "Outdated Kerberos credentials. Use kdestroy and kinit to update your ticket"
                    .to_string()
            }
            SetupError::BackendUnavailable { .. } => {
                "Cannot connect to the LDAP database. Please check if IPA is running".to_string()
            }
            SetupError::Authorization { .. } => {
                "Must have administrative privileges to setup AD trusts on server".to_string()
            }
            SetupError::DelegateInstall(e) => format!("Trust installation failed: {e}"),
            SetupError::Unexpected(e) => format!("Unexpected error: {e}"),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::Usage { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_exit_code_differs_from_fatal() {
        assert_eq!(SetupError::usage("bad").exit_code(), 2);
        assert_eq!(SetupError::Privilege { euid: 1000 }.exit_code(), 1);
        assert_eq!(
            SetupError::DelegateInstall(anyhow::anyhow!("boom")).exit_code(),
            1
        );
    }

    #[test]
    fn test_auth_expired_message_mentions_kdestroy() {
        let err = SetupError::AuthExpired {
            detail: "Insufficient access".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.contains("kdestroy"));
        assert!(msg.contains("kinit"));
    }

    #[test]
    fn test_authorization_detail_only_in_log_form() {
        let err = SetupError::Authorization {
            detail: "group admins does not list admin".to_string(),
        };
        assert!(!err.user_message().contains("group admins"));
        assert!(err.to_string().contains("group admins does not list admin"));
    }
}
