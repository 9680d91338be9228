//! adtrust-install library
//!
//! Prepares a directory server for cross-realm trusts with Active Directory
//! domains. The procedure itself lives in [`setup`]; every external system it
//! touches sits behind a narrow trait so the sequencing can be exercised
//! without a live server.

pub mod cli;
pub mod config;
pub mod console;
pub mod context;
pub mod directory;
pub mod error;
pub mod fstore;
pub mod kerberos;
pub mod options;
pub mod privilege;
pub mod prompt;
pub mod registry;
pub mod server_env;
pub mod setup;
pub mod trust;

pub use config::ToolConfig;
pub use context::RunContext;
pub use error::{Result, SetupError};
pub use options::InstallConfig;
pub use setup::{Collaborators, RunSummary, run};
