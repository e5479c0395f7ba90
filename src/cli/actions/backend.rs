use crate::service::{
    config::ClientConfig, http::HttpOtpClient, simulated::SimulatedOtpService,
    CredentialService, IssuanceService, VerificationService,
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// Backend settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Backend {
    pub api_base_url: Option<String>,
    pub request_timeout_seconds: u64,
    pub otp_ttl_seconds: u32,
    pub simulated_code: String,
    pub simulated_latency_ms: u64,
}

/// The three collaborators of the access flow.
pub struct Services {
    pub verifier: Arc<dyn VerificationService>,
    pub issuer: Arc<dyn IssuanceService>,
    pub credentials: Arc<dyn CredentialService>,
}

impl Backend {
    #[must_use]
    pub fn simulated(&self) -> SimulatedOtpService {
        SimulatedOtpService::new()
            .with_accepted_code(self.simulated_code.clone())
            .with_latency(Duration::from_millis(self.simulated_latency_ms))
    }

    /// HTTP client when an API base URL is set, the simulated backend otherwise.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn services(&self) -> Result<Services> {
        if let Some(base_url) = &self.api_base_url {
            let config = ClientConfig::new(base_url)
                .context("invalid INVOICEPRO_API_BASE_URL")?
                .with_timeout_seconds(self.request_timeout_seconds);
            info!(base_url = %config.base_url(), "using InvoicePro API");
            let client = Arc::new(HttpOtpClient::new(config)?);
            return Ok(Services {
                verifier: client.clone(),
                issuer: client.clone(),
                credentials: client,
            });
        }

        info!("no API base URL set, using the simulated backend");
        let simulated = Arc::new(self.simulated());
        Ok(Services {
            verifier: simulated.clone(),
            issuer: simulated.clone(),
            credentials: simulated,
        })
    }
}
