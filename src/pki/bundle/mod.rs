//! CA and CRL bundle artifacts

mod builder;
mod errors;
mod writer;

pub use builder::{BundleReport, OutputPaths, PRODUCTION, TrustBundleBuilder, build_ca_bundle};
pub use errors::BundleError;
pub use writer::write_artifact;
