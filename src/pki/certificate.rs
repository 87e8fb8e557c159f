use std::path::Path;

use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};
use x509_parser::objects::{oid_registry, oid2abbrev};
use x509_parser::pem::Pem;
use x509_parser::prelude::*;

use super::pem::{self, CERTIFICATE_LABEL};

/// Common name segment of the ICP-Brasil root that issues the production CAs
pub const ICP_BRASIL_ROOT_V10: &str = "Autoridade Certificadora Raiz Brasileira v10";

const COMMON_NAME_PREFIX: &str = "CN=";

/// Error type for loading CA certificates.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("X.509 error: {0}")]
    X509(#[from] X509Error),

    #[error("PEM decoding failed: {0}")]
    Pem(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A CA certificate taking part in the trust bundle.
///
/// `issuer` and `subject` hold one `KEY=value` attribute per line, in the
/// order they appear in the certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaCertificate {
    pub issuer: String,
    pub subject: String,
    der: Vec<u8>,
}

impl CaCertificate {
    /// Build a certificate from already extracted names and its DER body.
    pub fn new(issuer: impl Into<String>, subject: impl Into<String>, der: Vec<u8>) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
            der,
        }
    }

    /// Create a certificate from DER-encoded bytes
    pub fn from_der(der: impl AsRef<[u8]>) -> Result<Self, CertificateError> {
        let der_bytes = der.as_ref();
        let (_, cert) =
            X509Certificate::from_der(der_bytes).map_err(|e| CertificateError::X509(e.into()))?;

        Ok(Self {
            issuer: name_to_lines(cert.issuer()),
            subject: name_to_lines(cert.subject()),
            der: der_bytes.to_vec(),
        })
    }

    /// Create a certificate from the first PEM block of `pem`.
    pub fn from_pem(pem: impl AsRef<[u8]>) -> Result<Self, CertificateError> {
        load_pem_bundle(pem)?
            .into_iter()
            .next()
            .ok_or_else(|| CertificateError::Pem("no CERTIFICATE block found".to_string()))
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// PEM text of the certificate, newline terminated.
    pub fn to_pem(&self) -> String {
        pem::encode(CERTIFICATE_LABEL, &self.der)
    }

    /// Value of the first `CN=` line of the subject, if any.
    pub fn common_name(&self) -> Option<&str> {
        self.subject
            .lines()
            .find_map(|line| line.strip_prefix(COMMON_NAME_PREFIX))
    }

    /// Whether this CA hangs under the ICP-Brasil v10 root.
    pub fn is_icp_brasil_root_issued(&self) -> bool {
        self.issuer.contains(ICP_BRASIL_ROOT_V10)
    }

    /// Subject with attributes joined by commas, for log lines.
    pub fn subject_display(&self) -> String {
        self.subject.lines().collect::<Vec<_>>().join(",")
    }
}

/// Render a distinguished name as newline separated `KEY=value` lines.
fn name_to_lines(name: &X509Name<'_>) -> String {
    let registry = oid_registry();
    let mut lines = Vec::new();

    for rdn in name.iter_rdn() {
        for attr in rdn.iter() {
            let key = oid2abbrev(attr.attr_type(), registry)
                .map(str::to_string)
                .unwrap_or_else(|_| attr.attr_type().to_id_string());

            match attr.as_str() {
                Ok(value) => lines.push(format!("{key}={value}")),
                Err(e) => debug!("Skipping non-string attribute {key}: {e}"),
            }
        }
    }

    lines.join("\n")
}

/// Decode every CERTIFICATE block of a PEM buffer, keeping their order.
pub fn load_pem_bundle(pem: impl AsRef<[u8]>) -> Result<Vec<CaCertificate>, CertificateError> {
    let mut certificates = Vec::new();

    for block in Pem::iter_from_buffer(pem.as_ref()) {
        let block = block.map_err(|e| CertificateError::Pem(e.to_string()))?;
        if block.label != CERTIFICATE_LABEL {
            debug!("Ignoring PEM block labelled {}", block.label);
            continue;
        }
        certificates.push(CaCertificate::from_der(&block.contents)?);
    }

    Ok(certificates)
}

/// Load all CA certificates found in `dir`, in file name order.
///
/// Files starting with a PEM header are read as bundles, anything else is
/// tried as a single DER certificate. Unreadable files are skipped.
pub async fn load_ca_directory(
    dir: impl AsRef<Path>,
) -> Result<Vec<CaCertificate>, CertificateError> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut certificates = Vec::new();
    for path in paths {
        let content = fs::read(&path).await?;

        let loaded = if content.starts_with(b"-----BEGIN") {
            load_pem_bundle(&content)
        } else {
            CaCertificate::from_der(&content).map(|cert| vec![cert])
        };

        match loaded {
            Ok(mut certs) => {
                debug!("Loaded {} certificate(s) from {:?}", certs.len(), path);
                certificates.append(&mut certs);
            }
            Err(e) => warn!("Skipping {:?}: {}", path, e),
        }
    }

    Ok(certificates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, KeyPair};
    use tempfile::TempDir;

    fn gen_ca_cert(common_name: &str) -> rcgen::Certificate {
        let mut params = CertificateParams::default();
        let key_pair = KeyPair::generate().unwrap();

        let mut dn = DistinguishedName::new();
        dn.push(DnType::CountryName, "BR");
        dn.push(DnType::OrganizationName, "ICP-Brasil");
        dn.push(DnType::CommonName, common_name);
        params.distinguished_name = dn;

        params.is_ca = rcgen::IsCa::Ca(BasicConstraints::Unconstrained);
        params.self_signed(&key_pair).unwrap()
    }

    #[test]
    fn test_common_name_from_subject() {
        let cert = CaCertificate::new("", "CN=Example CA\nO=Org", Vec::new());
        assert_eq!(cert.common_name(), Some("Example CA"));
    }

    #[test]
    fn test_common_name_takes_first_match() {
        let cert = CaCertificate::new("", "C=BR\nCN=First\nCN=Second", Vec::new());
        assert_eq!(cert.common_name(), Some("First"));
    }

    #[test]
    fn test_common_name_missing() {
        let cert = CaCertificate::new("", "O=Org\nOU=Unit", Vec::new());
        assert_eq!(cert.common_name(), None);
    }

    #[test]
    fn test_common_name_prefix_is_case_sensitive() {
        let cert = CaCertificate::new("", "cn=lower\nO=Org", Vec::new());
        assert_eq!(cert.common_name(), None);
    }

    #[test]
    fn test_icp_brasil_issuer_predicate() {
        let brasil = CaCertificate::new(
            "C=BR\nO=ICP-Brasil\nCN=Autoridade Certificadora Raiz Brasileira v10",
            "CN=AC Intermediaria",
            Vec::new(),
        );
        let other = CaCertificate::new(
            "C=BR\nO=ICP-Brasil\nCN=Autoridade Certificadora Raiz Brasileira v5",
            "CN=AC Antiga",
            Vec::new(),
        );
        assert!(brasil.is_icp_brasil_root_issued());
        assert!(!other.is_icp_brasil_root_issued());
    }

    #[test]
    fn test_from_der_extracts_names_in_order() {
        let generated = gen_ca_cert("Test CA Root");
        let cert = CaCertificate::from_der(generated.der()).unwrap();

        assert_eq!(cert.subject, "C=BR\nO=ICP-Brasil\nCN=Test CA Root");
        // self-signed: issuer equals subject
        assert_eq!(cert.issuer, cert.subject);
        assert_eq!(cert.common_name(), Some("Test CA Root"));
        assert_eq!(cert.subject_display(), "C=BR,O=ICP-Brasil,CN=Test CA Root");
    }

    #[test]
    fn test_to_pem_round_trips() {
        let generated = gen_ca_cert("Test CA Root");
        let cert = CaCertificate::from_der(generated.der()).unwrap();

        let reparsed = CaCertificate::from_pem(cert.to_pem()).unwrap();
        assert_eq!(reparsed, cert);
    }

    #[test]
    fn test_load_pem_bundle_keeps_order() {
        let first = gen_ca_cert("First CA");
        let second = gen_ca_cert("Second CA");
        let bundle = format!("{}{}", first.pem(), second.pem());

        let certs = load_pem_bundle(bundle).unwrap();
        let names: Vec<_> = certs.iter().filter_map(|c| c.common_name()).collect();
        assert_eq!(names, vec!["First CA", "Second CA"]);
    }

    #[test]
    fn test_from_pem_without_certificate_block() {
        assert!(CaCertificate::from_pem("not a pem").is_err());
    }

    #[tokio::test]
    async fn test_load_ca_directory_pem_and_der() {
        let dir = TempDir::new().unwrap();
        let pem_ca = gen_ca_cert("Pem CA");
        let der_ca = gen_ca_cert("Der CA");

        fs::write(dir.path().join("a.pem"), pem_ca.pem()).await.unwrap();
        fs::write(dir.path().join("b.cer"), der_ca.der().to_vec())
            .await
            .unwrap();
        fs::write(dir.path().join("c.txt"), b"garbage").await.unwrap();

        let certs = load_ca_directory(dir.path()).await.unwrap();
        let names: Vec<_> = certs.iter().filter_map(|c| c.common_name()).collect();
        assert_eq!(names, vec!["Pem CA", "Der CA"]);
    }
}
