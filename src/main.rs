use color_eyre::eyre::Context;
use trust_bundle::{
    config::Config,
    pki::{
        bundle::TrustBundleBuilder,
        certificate::load_ca_directory,
        crl::{CrlAcquirer, HttpCrlSource},
    },
    telemetry,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::load()?;
    tracing::info!("Loaded configuration: {:?}", config);

    let certs = load_ca_directory(&config.input.ca_dir)
        .await
        .wrap_err_with(|| format!("Failed to load CAs from {:?}", config.input.ca_dir))?;
    tracing::info!("Loaded {} CA certificate(s)", certs.len());

    let source = HttpCrlSource::new(&config.crl.fetcher_config())?;
    let acquirer = CrlAcquirer::new(source, config.crl.download_addresses());
    let builder = TrustBundleBuilder::new(
        config.app.environment.clone(),
        config.output.paths(),
        acquirer,
    );

    let report = builder.build(&certs).await?;
    tracing::info!(
        ca_count = report.ca_count,
        crl_count = report.crl_count,
        "Trust bundle run finished"
    );
    Ok(())
}
