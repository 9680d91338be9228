//! Success-path teardown
//!
//! Trust installation adds attributes to the admin account, so the ticket
//! obtained at the start no longer carries the right authorization data.

use log::info;

use crate::context::RunContext;
use crate::kerberos::{RefreshReason, TicketAgent};
use crate::options::AdminPassword;

use super::session::{AdminSession, acquire_ticket};

/// Refresh the admin ticket, warn if that did not happen, then disconnect
///
/// Returns whether the refresh succeeded.
pub fn finish(
    ctx: &mut RunContext,
    tickets: &mut dyn TicketAgent,
    mut session: AdminSession<'_>,
    admin_name: &str,
    password: Option<&AdminPassword>,
) -> bool {
    let refreshed = acquire_ticket(
        ctx,
        tickets,
        admin_name,
        password,
        RefreshReason::PostInstallAttributeChange,
    );

    if !refreshed {
        ctx.console.rekinit_warning(admin_name);
    }

    info!(
        "Closing directory session for {}",
        session.principal().unwrap_or("an unknown principal")
    );
    session.release();
    refreshed
}
