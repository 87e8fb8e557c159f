use std::path::Path;

use tokio::fs;

use super::errors::BundleError;

/// Replace the content of `path` with `content`, creating parent directories.
pub async fn write_artifact(path: &Path, content: &str) -> Result<(), BundleError> {
    let to_error = |source| BundleError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await.map_err(to_error)?;
    }
    fs::write(path, content).await.map_err(to_error)
}
