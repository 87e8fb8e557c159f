use std::{collections::HashMap, path::PathBuf, time::Duration};

use config::{Config as ConfigLib, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::pki::bundle::OutputPaths;
use crate::pki::crl::{CrlDownloadAddresses, FetcherConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub crl: CrlConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// CRLs are only downloaded when this is exactly `production`.
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the CA certificates to bundle
    pub ca_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub ca_bundle_path: PathBuf,
    pub crl_bundle_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrlConfig {
    pub timeout_secs: u64,
    /// Disables TLS certificate verification for CRL endpoints.
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub download_addresses: Vec<CrlDownloadAddress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrlDownloadAddress {
    pub common_name: String,
    pub url: String,
}

impl OutputConfig {
    pub fn paths(&self) -> OutputPaths {
        OutputPaths {
            ca_bundle: self.ca_bundle_path.clone(),
            crl_bundle: self.crl_bundle_path.clone(),
        }
    }
}

impl CrlConfig {
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }

    /// Lookup table keyed by CA common name. Later entries win on duplicates.
    pub fn download_addresses(&self) -> CrlDownloadAddresses {
        self.download_addresses
            .iter()
            .map(|entry| (entry.common_name.clone(), entry.url.clone()))
            .collect()
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("app.environment", "development")?
            .set_default("input.ca_dir", "./cas")?
            .set_default("output.ca_bundle_path", "./certs/cas.pem")?
            .set_default("output.crl_bundle_path", "./certs/crls.pem")?
            .set_default("crl.timeout_secs", 30)?
            .set_default("crl.accept_invalid_certs", false)?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(File::with_name("config/crl_download_addresses").required(false));

        // If env_vars is provided, we use it instead of system environment
        // This is to avoid systems variables pollution across tests
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // Should be in the format APP_APP__ENVIRONMENT or APP_CRL__TIMEOUT_SECS
            builder = builder.add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        builder.build()?.try_deserialize()
    }
}
