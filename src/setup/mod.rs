//! The trust setup procedure
//!
//! One linear sequence, each step able to abort the run:
//!
//! 1. privilege gate
//! 2. server environment and restore store
//! 3. admin password and initial ticket (ticket failure is only a warning)
//! 4. directory session
//! 5. two-way admin group membership check
//! 6. trust precheck + install (the only destructive step)
//! 7. service state sync and DNS records
//! 8. ticket refresh and disconnect
//!
//! # Module Structure
//!
//! - `session` - password, ticket acquisition, directory session guard
//! - `authorization` - admin group membership check
//! - `delegate` - trust installer hand-off
//! - `postinstall` - service sync and DNS branch
//! - `teardown` - second ticket refresh and disconnect

mod authorization;
mod delegate;
mod postinstall;
mod session;
mod teardown;

pub use authorization::{AuthorizationOutcome, evaluate_membership};
pub use postinstall::DnsOutcome;
pub use session::AdminSession;

use log::{debug, error, info, warn};

use crate::config::ToolConfig;
use crate::context::RunContext;
use crate::directory::DirectoryBackend;
use crate::error::{Result, SetupError};
use crate::fstore::FileStore;
use crate::kerberos::{RefreshReason, TicketAgent};
use crate::options::InstallConfig;
use crate::privilege::{PrivilegeProbe, check_privileges};
use crate::prompt::PasswordPrompt;
use crate::registry::ServiceRegistry;
use crate::server_env::ServerEnv;
use crate::trust::{TrustInstaller, TrustSetupRequest};

/// External systems the procedure talks to
pub struct Collaborators<'a> {
    pub privileges: &'a dyn PrivilegeProbe,
    pub prompt: &'a mut dyn PasswordPrompt,
    pub tickets: &'a mut dyn TicketAgent,
    pub directory: &'a mut dyn DirectoryBackend,
    pub installer: &'a mut dyn TrustInstaller,
    pub registry: &'a mut dyn ServiceRegistry,
}

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub freshly_authenticated: bool,
    pub admin_account: String,
    /// Ticketed principal the directory session ran as
    pub principal: Option<String>,
    pub dns: DnsOutcome,
    pub refreshed_after_install: bool,
}

/// Run the whole procedure
pub fn run(
    ctx: &mut RunContext,
    config: &InstallConfig,
    tool: &ToolConfig,
    c: &mut Collaborators<'_>,
) -> Result<RunSummary> {
    check_privileges(c.privileges)?;

    ctx.start_logging().map_err(SetupError::Unexpected)?;
    info!("adtrust-install started, log file {}", ctx.log_path.display());
    match serde_json::to_string(&config.safe_view()) {
        Ok(json) => info!("Installation options: {json}"),
        Err(e) => warn!("Could not record installation options: {e}"),
    }

    let server = ServerEnv::load(&tool.server_conf)?;
    debug!("Server environment: {server:?}");

    if !config.unattended {
        ctx.console.intro();
    }

    let mut fstore = FileStore::open(&tool.sysrestore_dir).map_err(SetupError::Unexpected)?;

    let password = session::obtain_password(ctx, config, &mut *c.prompt)?;
    let freshly_authenticated = session::acquire_ticket(
        ctx,
        &mut *c.tickets,
        &config.admin_name,
        password.as_ref(),
        RefreshReason::Initial,
    );

    let mut admin_session = AdminSession::establish(&mut *c.directory)?;

    let outcome = authorization::verify(&mut *c.tickets, &mut admin_session, &tool.admin_group);
    let admin_account = match outcome {
        AuthorizationOutcome::Authorized { account } => {
            info!("{account} is a member of {}", tool.admin_group);
            account
        }
        AuthorizationOutcome::Denied(reason) => {
            error!("Not authorized to set up trusts: {reason}");
            return Err(SetupError::Authorization { detail: reason });
        }
        AuthorizationOutcome::CheckFailed(detail) => {
            error!("Administrative privilege check failed: {detail}");
            return Err(SetupError::Authorization { detail });
        }
    };

    let request = TrustSetupRequest::new(config, &server);
    let report = delegate::install_trust(
        ctx,
        &mut *c.installer,
        &request,
        &mut fstore,
        &mut admin_session,
    )?;

    let dns = postinstall::synchronize(
        ctx,
        &mut *c.registry,
        &mut admin_session,
        &server,
        &report,
    )
    .map_err(SetupError::Unexpected)?;

    ctx.console.setup_complete();

    let principal = admin_session.principal().map(str::to_string);

    let refreshed_after_install = teardown::finish(
        ctx,
        &mut *c.tickets,
        admin_session,
        &config.admin_name,
        password.as_ref(),
    );

    info!("adtrust-install finished successfully");
    Ok(RunSummary {
        freshly_authenticated,
        admin_account,
        principal,
        dns,
        refreshed_after_install,
    })
}
