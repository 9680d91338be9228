//! Privilege gate
//!
//! Trust setup rewrites Samba and directory configuration, so it only runs
//! as root. The check is the first thing the binary does after parsing its
//! arguments: no log file, no network connection before it passes.

use nix::unistd::Uid;

use crate::error::{Result, SetupError};

/// Source of the process's effective identity
pub trait PrivilegeProbe {
    fn effective_uid(&self) -> u32;
}

/// Reads the real process credentials
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessPrivileges;

impl PrivilegeProbe for ProcessPrivileges {
    fn effective_uid(&self) -> u32 {
        Uid::effective().as_raw()
    }
}

/// Fixed identity, for callers that already know who they run as
#[derive(Debug, Clone, Copy)]
pub struct StaticPrivileges {
    pub uid: u32,
}

impl PrivilegeProbe for StaticPrivileges {
    fn effective_uid(&self) -> u32 {
        self.uid
    }
}

/// Fail unless the effective uid is root
pub fn check_privileges(probe: &dyn PrivilegeProbe) -> Result<()> {
    let euid = probe.effective_uid();
    if euid != 0 {
        return Err(SetupError::Privilege { euid });
    }
    Ok(())
}
