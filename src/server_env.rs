//! Local directory server environment
//!
//! The server installer leaves its identity in an INI-style `default.conf`.
//! Its absence means the server was never installed on this host.

use std::fs;
use std::path::Path;

use crate::error::{Result, SetupError};

/// Identity of the local server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEnv {
    pub realm: String,
    pub domain: String,
    pub host: String,
    pub basedn: Option<String>,
}

impl ServerEnv {
    /// Load from `default.conf`, failing with `NotConfigured` if absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SetupError::NotConfigured {
                path: path.display().to_string(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|e| SetupError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        Self::parse(&contents).ok_or_else(|| SetupError::NotConfigured {
            path: path.display().to_string(),
        })
    }

    /// Parse the `[global]` section; `None` if realm, domain or host is missing
    pub fn parse(contents: &str) -> Option<Self> {
        let mut in_global = false;
        let mut realm = None;
        let mut domain = None;
        let mut host = None;
        let mut basedn = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                in_global = line[1..line.len() - 1].trim() == "global";
                continue;
            }

            if !in_global {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim() {
                "realm" => realm = Some(value),
                "domain" => domain = Some(value),
                "host" => host = Some(value),
                "basedn" => basedn = Some(value),
                _ => {}
            }
        }

        Some(Self {
            realm: realm?,
            domain: domain?,
            host: host?,
            basedn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[global]
basedn = dc=example,dc=test
realm = EXAMPLE.TEST
domain = example.test
xmlrpc_uri = https://ipa.example.test/ipa/xml
host = ipa.example.test
# comment = ignored

[other]
host = not-this-one
"#;

    #[test]
    fn test_parse_global_section() {
        let env = ServerEnv::parse(SAMPLE).unwrap();
        assert_eq!(env.realm, "EXAMPLE.TEST");
        assert_eq!(env.domain, "example.test");
        assert_eq!(env.host, "ipa.example.test");
        assert_eq!(env.basedn.as_deref(), Some("dc=example,dc=test"));
    }

    #[test]
    fn test_missing_host_is_incomplete() {
        assert!(ServerEnv::parse("[global]\nrealm = R\ndomain = d\n").is_none());
    }

    #[test]
    fn test_missing_file_is_not_configured() {
        let dir = tempfile::tempdir().unwrap();
        match ServerEnv::load(&dir.path().join("default.conf")) {
            Err(SetupError::NotConfigured { .. }) => {}
            other => panic!("expected NotConfigured, got {other:?}"),
        }
    }
}
