use anyhow::Context;
use revive::provider_manager::ProviderManager;
use revive::settings::Settings;
use revive::RestartError;
use revive_providers::Connector;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let connect = || connector_from_env().map_err(RestartError::Config);
    match revive::run(std::env::args_os(), connect).await {
        Ok(_) => ExitCode::SUCCESS,
        // clap prints usage/help itself and picks the exit code.
        Err(RestartError::Usage(e)) => e.exit(),
        Err(e) => {
            tracing::error!(
                kind = e.kind(),
                http_status = ?e.compute_error().and_then(|c| c.http_status()),
                "{}",
                e
            );
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn connector_from_env() -> anyhow::Result<Box<dyn Connector>> {
    let settings = Settings::from_env().context("invalid configuration")?;
    ProviderManager::get_connector(&settings)
        .with_context(|| format!("unknown provider {:?}", settings.provider))
}
