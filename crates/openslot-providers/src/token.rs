//! External OAuth token helper.
//!
//! Token acquisition is delegated to an external helper binary in the
//! `oama` mold: `<helper> access <identity>` prints a bearer token on
//! stdout, `<helper> renew <identity>` forces a refresh. No OAuth flow
//! logic lives in this codebase.

use tokio::process::Command;
use tracing::debug;

use crate::error::{SourceError, SourceResult};

/// Wrapper around the external OAuth helper binary.
#[derive(Debug, Clone)]
pub struct TokenHelper {
    program: String,
}

impl TokenHelper {
    /// Creates a helper invoking the given program (e.g. "oama").
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the helper program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Obtains a bearer token for the identity.
    pub async fn access(&self, identity: &str) -> SourceResult<String> {
        debug!(helper = %self.program, identity = %identity, "requesting access token");
        let output = self.run(&["access", identity]).await?;
        parse_token(&output).ok_or_else(|| {
            SourceError::authentication(format!(
                "token helper '{}' returned no token for {identity}",
                self.program
            ))
        })
    }

    /// Forces a token renewal for the identity.
    pub async fn renew(&self, identity: &str) -> SourceResult<()> {
        debug!(helper = %self.program, identity = %identity, "renewing token");
        self.run(&["renew", identity]).await?;
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> SourceResult<String> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                SourceError::configuration(format!(
                    "failed to run token helper '{}': {e}",
                    self.program
                ))
                .with_source(e)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::authentication(format!(
                "token helper '{}' failed: {}",
                self.program,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extracts the token from helper output: the last non-empty line.
///
/// Helpers may print informational lines before the token itself.
fn parse_token(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .map(String::from)
}
