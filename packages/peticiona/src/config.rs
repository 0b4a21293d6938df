use std::env;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use mni_client::{Credentials, DEFAULT_ENDPOINT};

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoint: String,
    pub query_timeout: Duration,
    pub submit_timeout: Duration,
    /// Fixed pause after each row, throttling calls to the court
    pub row_pause: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv();

        let cpf = env::var("PJE_CPF").context("PJE_CPF must be set")?;
        let senha = env::var("PJE_SENHA").context("PJE_SENHA must be set")?;
        let credentials = Credentials::new(&cpf, senha);
        ensure!(credentials.has_valid_cpf(), "PJE_CPF must have 11 digits");

        Ok(Self {
            credentials,
            endpoint: env::var("PJE_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            query_timeout: Duration::from_secs(
                env::var("PJE_QUERY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "90".to_string())
                    .parse()
                    .context("PJE_QUERY_TIMEOUT_SECS must be a valid number")?,
            ),
            submit_timeout: Duration::from_secs(
                env::var("PJE_SUBMIT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "180".to_string())
                    .parse()
                    .context("PJE_SUBMIT_TIMEOUT_SECS must be a valid number")?,
            ),
            row_pause: Duration::from_millis(
                env::var("PJE_ROW_PAUSE_MS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .context("PJE_ROW_PAUSE_MS must be a valid number")?,
            ),
        })
    }
}
