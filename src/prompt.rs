//! Interactive prompts for missing credentials

use std::io::IsTerminal;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};

use crate::error::{ConfigError, Result};

/// Source of interactively entered values.
pub trait Prompt {
    /// Read a visible line of input.
    fn input(&self, label: &'static str) -> Result<String>;

    /// Read a secret without echoing it.
    fn password(&self, label: &'static str) -> Result<String>;
}

/// Prompts on the controlling terminal.
///
/// `dialoguer` switches echo off for the duration of a password read and
/// restores the terminal when the read returns, including on error.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ensure_terminal(label: &'static str) -> Result<()> {
        if std::io::stdin().is_terminal() {
            Ok(())
        } else {
            Err(ConfigError::MissingCredential(label).into())
        }
    }
}

impl Prompt for TerminalPrompt {
    fn input(&self, label: &'static str) -> Result<String> {
        Self::ensure_terminal(label)?;
        let value = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .interact_text()?;
        Ok(value)
    }

    fn password(&self, label: &'static str) -> Result<String> {
        Self::ensure_terminal(label)?;
        let value = Password::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .interact()?;
        Ok(value)
    }
}
