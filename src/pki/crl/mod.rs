//! Certificate Revocation List acquisition
//!
//! Downloads the CRL published by each CA of the bundle, re-encodes it as PEM
//! and tracks the earliest `nextUpdate` among them.

mod acquirer;
mod errors;
mod fetcher;
pub mod next_update;

// Re-export public types
pub use acquirer::{AcquiredCrl, CrlAcquirer, CrlDownloadAddresses};
pub use errors::{CrlError, CrlResult};
#[cfg(test)]
pub use fetcher::MockCrlSource;
pub use fetcher::{CrlSource, FetcherConfig, HttpCrlSource};
pub use next_update::{earliest, next_update_from_pem, parse_crl_date, shortest_next_update};
