//! Directory backend driving the `ipa` command-line client.
//!
//! The client authenticates with the ambient Kerberos ticket, which is exactly
//! the credential model the setup procedure relies on. Command output is the
//! human-readable `Key: value, value` form.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};

use super::{AccountRecord, ConnectError, DirectoryBackend, GroupRecord};

/// Checked before the credential markers
const UNAVAILABLE_MARKERS: &[&str] = &[
    "cannot contact any kdc",
    "connection refused",
    "cannot connect",
    "name or service not known",
    "no route to host",
    "network is unreachable",
    "timed out",
];

const AUTH_FAILURE_MARKERS: &[&str] = &[
    "insufficient access",
    "ticket expired",
    "did not receive kerberos credentials",
    "no kerberos credentials available",
    "no credentials cache found",
    "invalid credentials",
    "unauthorized",
    "acierror",
];

pub struct IpaCliBackend {
    command: String,
    resolved: Option<PathBuf>,
    connected: bool,
}

impl IpaCliBackend {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            resolved: None,
            connected: false,
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        let program = self
            .resolved
            .as_ref()
            .ok_or_else(|| anyhow!("Directory session is not connected"))?;

        log::debug!("Running {} {}", program.display(), args.join(" "));

        Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute {}", program.display()))
    }

    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(anyhow!(
                "{} {} failed: {}",
                self.command,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl DirectoryBackend for IpaCliBackend {
    fn connect(&mut self) -> Result<(), ConnectError> {
        let program = which::which(&self.command).map_err(|_| {
            ConnectError::Unavailable(format!("{} not found in PATH", self.command))
        })?;
        self.resolved = Some(program);

        let output = self
            .run(&["ping"])
            .map_err(|e| ConnectError::Unavailable(format!("{e:#}")))?;

        if !output.status.success() {
            return Err(classify_failure(&String::from_utf8_lossy(&output.stderr)));
        }

        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        // Each command opens and closes its own connection; nothing to tear down.
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn lookup_account(&mut self, name: &str) -> Result<AccountRecord> {
        let stdout = self.run_checked(&["user-show", name])?;
        let fields = parse_show_output(&stdout);

        Ok(AccountRecord {
            uid: first_value(&fields, "User login").unwrap_or_else(|| name.to_string()),
            member_of_groups: fields.get("Member of groups").cloned().unwrap_or_default(),
        })
    }

    fn lookup_group(&mut self, name: &str) -> Result<GroupRecord> {
        let stdout = self.run_checked(&["group-show", name])?;
        let fields = parse_show_output(&stdout);

        Ok(GroupRecord {
            name: first_value(&fields, "Group name").unwrap_or_else(|| name.to_string()),
            member_users: fields.get("Member users").cloned().unwrap_or_default(),
        })
    }

    fn update_system_records(&mut self) -> Result<()> {
        self.run_checked(&["dns-update-system-records"])?;
        Ok(())
    }
}

/// Map a failed `ipa ping` to the two connection failure kinds
pub(crate) fn classify_failure(stderr: &str) -> ConnectError {
    let lowered = stderr.to_ascii_lowercase();
    let message = stderr.trim().to_string();

    if UNAVAILABLE_MARKERS.iter().any(|m| lowered.contains(m)) {
        ConnectError::Unavailable(message)
    } else if AUTH_FAILURE_MARKERS.iter().any(|m| lowered.contains(m)) {
        ConnectError::AuthExpired(message)
    } else {
        ConnectError::Unavailable(message)
    }
}

/// Parse `Key: value, value` lines into a field map
pub(crate) fn parse_show_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut fields = HashMap::new();

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || key.starts_with('-') {
            continue;
        }

        let values = value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        fields.insert(key.to_string(), values);
    }

    fields
}

fn first_value(fields: &HashMap<String, Vec<String>>, key: &str) -> Option<String> {
    fields.get(key).and_then(|v| v.first()).cloned()
}
