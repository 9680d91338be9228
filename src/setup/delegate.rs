//! Hand-off to the trust installer
//!
//! The only step that makes hard-to-reverse changes. Rollback, if any, is the
//! installer's business through the file store.

use log::info;

use crate::context::RunContext;
use crate::error::{Result, SetupError};
use crate::fstore::FileStore;
use crate::trust::{InstallReport, TrustInstaller, TrustSetupRequest};

use super::session::AdminSession;

pub fn install_trust(
    ctx: &mut RunContext,
    installer: &mut dyn TrustInstaller,
    request: &TrustSetupRequest<'_>,
    fstore: &mut FileStore,
    session: &mut AdminSession<'_>,
) -> Result<InstallReport> {
    info!("Running trust installation precheck");
    installer
        .precheck(request, session.backend())
        .map_err(SetupError::DelegateInstall)?;

    ctx.console.line("Configuring trust support. This may take some minutes...");
    info!("Running trust installation");
    let report = installer
        .install(request, fstore, session.backend())
        .map_err(SetupError::DelegateInstall)?;

    info!(
        "Trust installation finished (dns_auto_update={}, {} manual SRV records)",
        report.dns_auto_update,
        report.srv_records.len()
    );
    Ok(report)
}
