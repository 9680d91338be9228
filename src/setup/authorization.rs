//! Administrative membership check
//!
//! The ticketed account must list the admin group among its groups AND the
//! admin group must list the account among its members. One direction alone
//! is not enough.

use crate::directory::{AccountRecord, GroupRecord};
use crate::kerberos::{TicketAgent, short_account_name};

use super::session::AdminSession;

/// Result of the membership check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Authorized { account: String },
    /// The lookups worked and the account is not an administrator
    Denied(String),
    /// The check itself could not be carried out
    CheckFailed(String),
}

/// Look up the current principal's account and the admin group, then compare
pub fn verify(
    tickets: &mut dyn TicketAgent,
    session: &mut AdminSession<'_>,
    admin_group: &str,
) -> AuthorizationOutcome {
    let principal = match tickets.current_principal() {
        Ok(principal) => principal,
        Err(e) => {
            return AuthorizationOutcome::CheckFailed(format!(
                "cannot determine current principal: {e:#}"
            ));
        }
    };
    session.set_principal(&principal);

    let account_name = short_account_name(&principal).to_string();
    if account_name.is_empty() {
        return AuthorizationOutcome::CheckFailed(format!(
            "principal '{principal}' has no account name"
        ));
    }
    log::debug!("Checking {admin_group} membership of {account_name} ({principal})");

    let account = match session.backend().lookup_account(&account_name) {
        Ok(account) => account,
        Err(e) => {
            return AuthorizationOutcome::CheckFailed(format!(
                "lookup of account {account_name} failed: {e:#}"
            ));
        }
    };

    let group = match session.backend().lookup_group(admin_group) {
        Ok(group) => group,
        Err(e) => {
            return AuthorizationOutcome::CheckFailed(format!(
                "lookup of group {admin_group} failed: {e:#}"
            ));
        }
    };

    evaluate_membership(&account, &group)
}

/// Two-way membership comparison
pub fn evaluate_membership(account: &AccountRecord, group: &GroupRecord) -> AuthorizationOutcome {
    let listed_in_group = group.member_users.iter().any(|u| u == &account.uid);
    let group_in_account = account.member_of_groups.iter().any(|g| g == &group.name);

    match (listed_in_group, group_in_account) {
        (true, true) => AuthorizationOutcome::Authorized {
            account: account.uid.clone(),
        },
        (false, _) => AuthorizationOutcome::Denied(format!(
            "group {} does not list {} as a member",
            group.name, account.uid
        )),
        (true, false) => AuthorizationOutcome::Denied(format!(
            "account {} is not a member of group {}",
            account.uid, group.name
        )),
    }
}
