//! Directory backend interface
//!
//! The setup procedure only needs a handful of directory operations. They are
//! collected in [`DirectoryBackend`] so the orchestration depends on exactly
//! this contract and nothing else.
//!
//! # Module Structure
//!
//! - `ipa_cli` - implementation driving the `ipa` command-line client

mod ipa_cli;

pub use ipa_cli::IpaCliBackend;

use thiserror::Error;

/// Directory entry of a user account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRecord {
    pub uid: String,
    pub member_of_groups: Vec<String>,
}

/// Directory entry of a group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRecord {
    pub name: String,
    pub member_users: Vec<String>,
}

/// Why a directory connection could not be established
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// Credentials were presented but refused (stale ticket, ACI denial)
    #[error("credentials rejected: {0}")]
    AuthExpired(String),

    /// The directory service did not answer
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Operations consumed from the identity backend
pub trait DirectoryBackend {
    fn connect(&mut self) -> Result<(), ConnectError>;

    /// Release the connection; calling it twice is harmless
    fn disconnect(&mut self) -> anyhow::Result<()>;

    fn is_connected(&self) -> bool;

    fn lookup_account(&mut self, name: &str) -> anyhow::Result<AccountRecord>;

    fn lookup_group(&mut self, name: &str) -> anyhow::Result<GroupRecord>;

    /// Regenerate the DNS records advertising the cluster's services
    fn update_system_records(&mut self) -> anyhow::Result<()>;
}
