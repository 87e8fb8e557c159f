use std::path::PathBuf;

use thiserror::Error;

/// Trust bundle artifact errors
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
