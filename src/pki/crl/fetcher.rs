use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::timeout;
use tracing::{info, warn};
use url::Url;

use super::errors::{CrlError, CrlResult};

/// Anything able to hand back the DER body published at a CRL URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrlSource: Send + Sync {
    async fn download(&self, url: &str) -> CrlResult<Vec<u8>>;
}

/// Transport settings for CRL downloads.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub timeout: Duration,
    /// Skip TLS certificate verification for CRL endpoints.
    pub accept_invalid_certs: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

/// Fetches CRLs over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpCrlSource {
    client: Client,
    request_timeout: Duration,
}

impl HttpCrlSource {
    pub fn new(config: &FetcherConfig) -> CrlResult<Self> {
        if config.accept_invalid_certs {
            // SECURITY: CRL endpoints are reached without verifying their TLS certificates
            warn!("TLS certificate verification is disabled for CRL downloads");
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .use_rustls_tls()
            .build()?;

        Ok(Self {
            client,
            request_timeout: config.timeout,
        })
    }
}

#[async_trait]
impl CrlSource for HttpCrlSource {
    async fn download(&self, url: &str) -> CrlResult<Vec<u8>> {
        info!("Fetching CRL from: {}", url);

        let _ = Url::parse(url)?;

        let response = match timeout(self.request_timeout, self.client.get(url).send()).await {
            Ok(result) => result?,
            Err(_) => return Err(CrlError::Timeout(url.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(CrlError::Download {
                url: url.to_string(),
                status: status.to_string(),
            });
        }

        let crl_data = response.bytes().await?.to_vec();
        info!("Fetched {} bytes of CRL data from {}", crl_data.len(), url);
        Ok(crl_data)
    }
}
