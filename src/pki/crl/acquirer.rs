use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::pki::certificate::CaCertificate;
use crate::pki::pem::{self, X509_CRL_LABEL};

use super::errors::CrlResult;
use super::fetcher::CrlSource;
use super::next_update::next_update_from_pem;

/// CA common name -> CRL download URL.
pub type CrlDownloadAddresses = HashMap<String, String>;

/// A CRL downloaded for one CA, ready to be bundled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredCrl {
    pub common_name: String,
    pub url: String,
    pub pem: String,
    pub next_update: DateTime<Utc>,
}

/// Resolves a CA to its published CRL and downloads it.
pub struct CrlAcquirer<S> {
    source: S,
    addresses: CrlDownloadAddresses,
}

impl<S: CrlSource> CrlAcquirer<S> {
    pub fn new(source: S, addresses: CrlDownloadAddresses) -> Self {
        Self { source, addresses }
    }

    pub fn download_url(&self, common_name: &str) -> Option<&str> {
        self.addresses.get(common_name).map(String::as_str)
    }

    /// Download the CRL of `cert`.
    ///
    /// Returns `Ok(None)` when the subject has no CN or the CN has no known
    /// download address. Download failures are returned as errors and are
    /// meant to stop the run.
    pub async fn acquire(&self, cert: &CaCertificate) -> CrlResult<Option<AcquiredCrl>> {
        let Some((common_name, url)) = cert
            .common_name()
            .and_then(|cn| self.download_url(cn).map(|url| (cn, url)))
        else {
            warn!(
                "CRL download URL not found for CA: {}",
                cert.subject_display()
            );
            return Ok(None);
        };

        let der = self.source.download(url).await?;
        let pem = pem::encode(X509_CRL_LABEL, &der);
        let next_update = next_update_from_pem(&pem)?;
        debug!("CRL of {} valid until {}", common_name, next_update);

        Ok(Some(AcquiredCrl {
            common_name: common_name.to_string(),
            url: url.to_string(),
            pem,
            next_update,
        }))
    }
}
