//! MFA token prompt
//!
//! The master profile may declare `mfa_serial`. The token can only be
//! asked for when a human is at the keyboard.

use async_trait::async_trait;
use std::io::{BufRead, IsTerminal, Write};

use crate::error::{ErrorKind, ProviderError, Result};

/// Source of one-time MFA codes
#[async_trait]
pub trait MfaPrompt: Send + Sync {
    /// Returns the current code for the device `serial`
    async fn token_code(&self, serial: &str) -> Result<String>;
}

/// Prompts on stderr and reads the code from stdin
///
/// Fails with `mfa-unavailable` when stdin is not a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinMfaPrompt;

#[async_trait]
impl MfaPrompt for StdinMfaPrompt {
    async fn token_code(&self, serial: &str) -> Result<String> {
        if !std::io::stdin().is_terminal() {
            return Err(ProviderError::mfa_unavailable(format!(
                "MFA token required for {} but stdin is not a terminal",
                serial
            )));
        }

        let serial = serial.to_string();
        let line = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            let mut stderr = std::io::stderr();
            write!(stderr, "Assume Role MFA token code ({}): ", serial)?;
            stderr.flush()?;

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| ProviderError::new(ErrorKind::Io, format!("MFA prompt failed: {}", e)))?
        .map_err(|e| ProviderError::new(ErrorKind::Io, format!("failed to read MFA token: {}", e)))?;

        let code = line.trim().to_string();
        if code.is_empty() {
            return Err(ProviderError::mfa_unavailable("no MFA token entered"));
        }

        Ok(code)
    }
}
