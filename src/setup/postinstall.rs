//! Service state and DNS record reconciliation after a successful install

use anyhow::{Context, Result};
use log::info;

use crate::context::RunContext;
use crate::registry::ServiceRegistry;
use crate::server_env::ServerEnv;
use crate::trust::InstallReport;

use super::session::AdminSession;

/// Which DNS branch ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsOutcome {
    AutomaticUpdate,
    ManualRecords(usize),
}

pub fn synchronize(
    ctx: &mut RunContext,
    registry: &mut dyn ServiceRegistry,
    session: &mut AdminSession<'_>,
    server: &ServerEnv,
    report: &InstallReport,
) -> Result<DnsOutcome> {
    registry
        .sync_services_state(&server.host)
        .context("Failed to enable trust services")?;
    info!("Synchronized service state for {}", server.host);

    if !report.dns_auto_update {
        ctx.console.line("");
        ctx.console.warning(&format!(
            "Add the following service records to your DNS server for DNS zone {}:",
            server.domain
        ));
        for record in &report.srv_records {
            ctx.console.line(&record.zone_line());
        }
        info!(
            "DNS records must be added manually ({} records)",
            report.srv_records.len()
        );
        return Ok(DnsOutcome::ManualRecords(report.srv_records.len()));
    }

    session
        .backend()
        .update_system_records()
        .context("Failed to update DNS system records")?;
    info!("Updated DNS system records");
    ctx.console.success("DNS system records updated");
    Ok(DnsOutcome::AutomaticUpdate)
}
