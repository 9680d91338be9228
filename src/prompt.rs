//! Interactive password prompt

use anyhow::Result;
use inquire::{Password, PasswordDisplayMode};

pub trait PasswordPrompt {
    /// Ask for the password of `principal`; `None` when left empty
    fn read_password(&mut self, principal: &str) -> Result<Option<String>>;
}

/// Terminal prompt backed by inquire
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn read_password(&mut self, principal: &str) -> Result<Option<String>> {
        let password = Password::new(&format!("{principal} password:"))
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .map_err(|e| anyhow::anyhow!("Prompt cancelled: {}", e))?;

        Ok(Some(password).filter(|p| !p.is_empty()))
    }
}
