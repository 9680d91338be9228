//! User-facing console output
//!
//! Everything the operator reads goes through [`Console`] so the procedure
//! can be run against a captured buffer in tests. The real console writes
//! coloured output to stdout and errors to stderr.

use std::io::Write;
use std::sync::{Arc, Mutex};

use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

const RULE: &str =
    "==============================================================================";

/// Ports that must be reachable once trust support is configured
pub const REQUIRED_TCP_PORTS: &[(&str, &str)] = &[
    ("135", "epmap"),
    ("138", "netbios-dgm"),
    ("139", "netbios-ssn"),
    ("445", "microsoft-ds"),
    ("1024..1300", "epmap listener range"),
    ("3268", "msft-gc"),
];

pub const REQUIRED_UDP_PORTS: &[(&str, &str)] = &[
    ("138", "netbios-dgm"),
    ("139", "netbios-ssn"),
    ("389", "(C)LDAP"),
    ("445", "microsoft-ds"),
];

enum Sink {
    Terminal {
        stdout: StandardStream,
        stderr: StandardStream,
    },
    Captured(Arc<Mutex<Buffer>>),
}

/// Handle on text written to a captured console
#[derive(Clone)]
pub struct Captured(Arc<Mutex<Buffer>>);

impl Captured {
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(buf) => String::from_utf8_lossy(buf.as_slice()).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(poisoned.into_inner().as_slice()).into_owned(),
        }
    }
}

pub struct Console {
    sink: Sink,
}

impl Console {
    /// Console attached to the process stdout/stderr
    pub fn terminal() -> Self {
        Self {
            sink: Sink::Terminal {
                stdout: StandardStream::stdout(ColorChoice::Auto),
                stderr: StandardStream::stderr(ColorChoice::Auto),
            },
        }
    }

    /// Console writing into an in-memory buffer, both streams interleaved
    pub fn captured() -> (Self, Captured) {
        let buf = Arc::new(Mutex::new(Buffer::no_color()));
        (
            Self {
                sink: Sink::Captured(buf.clone()),
            },
            Captured(buf),
        )
    }

    fn write_colored(&mut self, to_stderr: bool, color: Option<Color>, bold: bool, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);

        match &mut self.sink {
            Sink::Terminal { stdout, stderr } => {
                let stream = if to_stderr { stderr } else { stdout };
                let _ = stream.set_color(&spec);
                let _ = writeln!(stream, "{text}");
                let _ = stream.reset();
            }
            Sink::Captured(buf) => {
                if let Ok(mut buf) = buf.lock() {
                    let _ = writeln!(buf, "{text}");
                }
            }
        }
    }

    /// Plain informational line
    pub fn line(&mut self, text: &str) {
        self.write_colored(false, None, false, text);
    }

    pub fn success(&mut self, text: &str) {
        self.write_colored(false, Some(Color::Green), false, text);
    }

    pub fn warning(&mut self, text: &str) {
        self.write_colored(false, Some(Color::Yellow), false, text);
    }

    /// Fatal error line, on stderr
    pub fn error(&mut self, text: &str) {
        self.write_colored(true, Some(Color::Red), true, text);
    }

    /// Introduction shown before an attended run
    pub fn intro(&mut self) {
        self.line("");
        self.write_colored(false, Some(Color::Cyan), false, RULE);
        self.line("This program will setup components needed to establish trust to AD domains for");
        self.line("the IPA Server.");
        self.line("");
        self.line("This includes:");
        self.line("  * Configure Samba");
        self.line("  * Add trust related objects to IPA LDAP server");
        self.line("");
        self.line("To accept the default shown in brackets, press the Enter key.");
        self.line("");
    }

    /// Completion banner with the port list the operator must open
    pub fn setup_complete(&mut self) {
        self.line("");
        self.write_colored(false, Some(Color::Cyan), false, RULE);
        self.write_colored(false, Some(Color::Green), true, "Setup complete");
        self.line("");
        self.line("You must make sure these network ports are open:");
        self.line("\tTCP Ports:");
        for (port, name) in REQUIRED_TCP_PORTS {
            self.line(&format!("\t  * {port}: {name}"));
        }
        self.line("\tUDP Ports:");
        for (port, name) in REQUIRED_UDP_PORTS {
            self.line(&format!("\t  * {port}: {name}"));
        }
        self.line("");
        self.write_colored(false, Some(Color::Cyan), false, RULE);
        self.line("");
    }

    /// Shown when the post-install ticket refresh did not happen
    pub fn rekinit_warning(&mut self, admin_name: &str) {
        self.write_colored(false, Some(Color::Yellow), false, RULE);
        self.write_colored(
            false,
            Some(Color::Yellow),
            true,
            &format!("WARNING: You must re-kinit {admin_name} user before using AD trust management"),
        );
        self.write_colored(
            false,
            Some(Color::Yellow),
            false,
            "commands, in order to obtain a fresh Kerberos ticket that carries the new",
        );
        self.write_colored(false, Some(Color::Yellow), false, "authorization data.");
        self.write_colored(false, Some(Color::Yellow), false, RULE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_complete_lists_every_port() {
        let (mut console, captured) = Console::captured();
        console.setup_complete();
        let out = captured.contents();

        assert!(out.contains("Setup complete"));
        for (port, name) in REQUIRED_TCP_PORTS.iter().chain(REQUIRED_UDP_PORTS) {
            assert!(out.contains(&format!("* {port}: {name}")), "missing {port}");
        }
    }

    #[test]
    fn test_rekinit_warning_names_admin() {
        let (mut console, captured) = Console::captured();
        console.rekinit_warning("trustadmin");
        assert!(captured.contents().contains("re-kinit trustadmin user"));
    }

    #[test]
    fn test_error_is_captured() {
        let (mut console, captured) = Console::captured();
        console.error("Must be root to setup AD trusts on server");
        assert_eq!(
            captured.contents(),
            "Must be root to setup AD trusts on server\n"
        );
    }
}
