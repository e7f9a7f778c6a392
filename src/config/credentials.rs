//! API credentials
//!
//! The token is handed to the pipeline explicitly and zeroed when dropped.
//! It never appears in Debug or Display output.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{EtlError, EtlResult};

/// Environment variable the CLI reads the token from
pub const TOKEN_ENV_VAR: &str = "LEDGER_ETL_TOKEN";

/// Access token for the accounting API
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiToken {
    inner: String,
}

impl ApiToken {
    /// Create a token, rejecting blank values
    pub fn new(token: impl Into<String>) -> EtlResult<Self> {
        let inner = token.into().trim().to_string();
        if inner.is_empty() {
            return Err(EtlError::Config("API token must not be empty".into()));
        }
        Ok(Self { inner })
    }

    /// Prompt for the token on the terminal without echoing it
    pub fn prompt() -> EtlResult<Self> {
        let token = rpassword::prompt_password("API token: ")
            .map_err(|e| EtlError::Config(format!("Failed to read API token: {}", e)))?;
        Self::new(token)
    }

    /// Get the token for use in a request header
    pub fn expose(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED {} bytes]", self.inner.len())
    }
}
