use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

use parkdesk::config::RemoteConfig;
use parkdesk::remote::GitLabClient;
use parkdesk::server;
use parkdesk::store::TicketStore;
use parkdesk::sync::Synchronizer;

#[derive(Parser)]
#[command(name = "parkdesk")]
#[command(about = "Help-desk ticket tracker with best-effort GitLab issue mirroring")]
#[command(version)]
struct Cli {
    /// Address to serve the API on
    #[arg(long, default_value = "127.0.0.1:8600")]
    bind: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = RemoteConfig::from_env();
    let project_id = config.project_id().map(String::from);
    let store = Arc::new(TicketStore::new());
    let sync = Synchronizer::new(store, GitLabClient::new(config), project_id);

    if let Err(e) = server::run(sync, &cli.bind).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
