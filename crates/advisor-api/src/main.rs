//! Binary entrypoint for the Advisor API server.
use std::path::PathBuf;

use advisor_api::{run, AppConfig, AppState};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "advisor-api", version, about = "Azure Advisor recommendations plugin")]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, env = "ADVISOR_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.listen`.
    #[arg(long, env = "ADVISOR_LISTEN")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    fmt().with_target(false).with_env_filter(filter).init();

    tracing::info!(
        prompts_dir = %config.plugin.prompts_dir.display(),
        plugin = %config.plugin.name_for_model,
        "starting advisor api"
    );

    let addr = config.server.listen.clone();
    let state = AppState::from_config(config)?;
    run(state, &addr).await?;

    Ok(())
}
