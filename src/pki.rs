pub mod bundle;
pub mod certificate;
pub mod crl;
pub mod pem;

// Re-export commonly used types
pub use bundle::{BundleReport, TrustBundleBuilder};
pub use certificate::{CaCertificate, CertificateError};
pub use crl::{CrlAcquirer, CrlError};
