//! Credential acquisition and the directory session guard

use log::{info, warn};

use crate::context::RunContext;
use crate::directory::{ConnectError, DirectoryBackend};
use crate::error::{Result, SetupError};
use crate::kerberos::{RefreshReason, TicketAgent};
use crate::options::{AdminPassword, InstallConfig};
use crate::prompt::PasswordPrompt;

/// Authenticated handle on the directory backend
///
/// Disconnects exactly once: either through [`AdminSession::release`] on the
/// success path or from `Drop` when an earlier step aborts the run.
pub struct AdminSession<'a> {
    backend: &'a mut dyn DirectoryBackend,
    principal: Option<String>,
    released: bool,
}

impl<'a> AdminSession<'a> {
    /// Connect to the directory using whatever ticket is in the cache
    pub fn establish(backend: &'a mut dyn DirectoryBackend) -> Result<Self> {
        info!("Connecting to the directory backend");

        backend.connect().map_err(|e| match e {
            ConnectError::AuthExpired(detail) => SetupError::AuthExpired { detail },
            ConnectError::Unavailable(detail) => SetupError::BackendUnavailable { detail },
        })?;

        Ok(Self {
            backend,
            principal: None,
            released: false,
        })
    }

    pub fn backend(&mut self) -> &mut (dyn DirectoryBackend + 'a) {
        &mut *self.backend
    }

    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    pub(crate) fn set_principal(&mut self, principal: &str) {
        self.principal = Some(principal.to_string());
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Disconnect; later calls do nothing
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Err(e) = self.backend.disconnect() {
            warn!("Failed to disconnect from the directory backend: {e:#}");
        } else {
            info!("Disconnected from the directory backend");
        }
    }
}

impl Drop for AdminSession<'_> {
    fn drop(&mut self) {
        if !self.is_released() {
            warn!("Releasing directory session after an aborted run");
            self.release();
        }
    }
}

/// Work out which admin password, if any, this run uses
///
/// Unattended runs never prompt; without a password they go on with the
/// ambient ticket.
pub fn obtain_password(
    ctx: &mut RunContext,
    config: &InstallConfig,
    prompt: &mut dyn PasswordPrompt,
) -> Result<Option<AdminPassword>> {
    if let Some(password) = &config.admin_password {
        return Ok(Some(password.clone()));
    }

    if config.unattended {
        info!("Unattended run without admin password, using existing credentials");
        return Ok(None);
    }

    let answer = prompt
        .read_password(&config.admin_name)
        .map_err(SetupError::Unexpected)?;

    if answer.is_none() {
        ctx.console.warning("No password given, using existing Kerberos credentials");
    }
    Ok(answer.map(AdminPassword::new))
}

/// Acquire a ticket for the admin principal
///
/// Returns true when a fresh ticket was obtained. Failure is only a warning:
/// the run continues with whatever credentials existed before.
pub fn acquire_ticket(
    ctx: &mut RunContext,
    tickets: &mut dyn TicketAgent,
    admin_name: &str,
    password: Option<&AdminPassword>,
    reason: RefreshReason,
) -> bool {
    let Some(password) = password else {
        info!("No admin password available, skipping kinit ({reason})");
        return false;
    };

    match tickets.kinit(admin_name, password, reason) {
        Ok(()) => {
            info!("Obtained Kerberos ticket for {admin_name} ({reason})");
            true
        }
        Err(e) => {
            warn!("Failed to kinit as {admin_name} ({reason}): {e}");
            ctx.console.warning(&format!("Was unable to kinit as {admin_name}: {e}"));
            ctx.console.warning("Proceeding with credentials that existed before");
            false
        }
    }
}
