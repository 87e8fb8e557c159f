use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::pki::certificate::CaCertificate;
use crate::pki::crl::{CrlAcquirer, CrlResult, CrlSource, earliest};

use super::writer::write_artifact;

/// Only this environment downloads CRLs.
pub const PRODUCTION: &str = "production";

/// Where the bundle artifacts are written.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub ca_bundle: PathBuf,
    pub crl_bundle: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            ca_bundle: PathBuf::from("./certs/cas.pem"),
            crl_bundle: PathBuf::from("./certs/crls.pem"),
        }
    }
}

/// Outcome of one bundle run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleReport {
    pub ca_count: usize,
    pub crl_count: usize,
    pub ca_bundle_written: bool,
    pub crl_bundle_written: bool,
    /// Earliest nextUpdate over all acquired CRLs
    pub shortest_crl_next_update: Option<DateTime<Utc>>,
}

/// Concatenate the PEM text of `certs` in input order.
pub fn build_ca_bundle(certs: &[CaCertificate]) -> Option<String> {
    if certs.is_empty() {
        return None;
    }
    Some(certs.iter().map(CaCertificate::to_pem).collect())
}

/// Builds `cas.pem` and, in production, `crls.pem` from a list of CAs.
pub struct TrustBundleBuilder<S> {
    environment: String,
    paths: OutputPaths,
    acquirer: CrlAcquirer<S>,
}

impl<S: CrlSource> TrustBundleBuilder<S> {
    pub fn new(
        environment: impl Into<String>,
        paths: OutputPaths,
        acquirer: CrlAcquirer<S>,
    ) -> Self {
        Self {
            environment: environment.into(),
            paths,
            acquirer,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// Run one pass over `certs`.
    ///
    /// A failed CRL download aborts the run before anything is written.
    /// Missing download addresses and write failures are only logged.
    pub async fn build(&self, certs: &[CaCertificate]) -> CrlResult<BundleReport> {
        let mut pem_crls = Vec::new();
        let mut shortest = None;

        if self.is_production() {
            for cert in certs {
                if let Some(crl) = self.acquirer.acquire(cert).await? {
                    shortest = Some(earliest(shortest, crl.next_update));
                    pem_crls.push(crl.pem);
                }
            }
        }

        let now = Utc::now();
        let mut report = BundleReport {
            ca_count: certs.len(),
            crl_count: pem_crls.len(),
            shortest_crl_next_update: shortest,
            ..BundleReport::default()
        };

        if let Some(ca_bundle) = build_ca_bundle(certs) {
            report.ca_bundle_written = save(&self.paths.ca_bundle, &ca_bundle).await;
            if report.ca_bundle_written {
                info!(
                    at = %now,
                    "File {} with the CAs accepted by the ecosystem saved successfully",
                    self.paths.ca_bundle.display()
                );
            }
        }

        if !pem_crls.is_empty() {
            report.crl_bundle_written = save(&self.paths.crl_bundle, &pem_crls.concat()).await;
            if report.crl_bundle_written {
                info!(
                    at = %now,
                    "File {} with the revoked certificate lists saved successfully",
                    self.paths.crl_bundle.display()
                );
            }
            if let Some(shortest) = shortest {
                info!(at = %now, "The CRL closest to expiring expires at: {}", shortest);
            }
        }

        Ok(report)
    }
}

async fn save(path: &Path, content: &str) -> bool {
    match write_artifact(path, content).await {
        Ok(()) => true,
        Err(e) => {
            error!("Error writing to file: {}", e);
            false
        }
    }
}
