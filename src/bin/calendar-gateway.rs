use std::path::PathBuf;

use anyhow::Result;
use calendar_gateway::config::proc_loader;
use calendar_gateway::server;
use calendar_gateway::utils::logging;
use calendar_gateway::utils::logging::LogLevel;
use clap::arg;
use clap::command;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config file; without it everything is read from the environment
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args
    // -------------------------------

    let args = Args::parse();

    // -------------------------------
    // 2. Load and validate config, fail fast on missing credentials
    // -------------------------------

    let service_config = proc_loader::load(args.config.as_deref()).await?;
    logging::run(&service_config, args.log_level);
    info!("google config: {:?}", service_config.google);

    // -------------------------------
    // 3. Serve
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config).await
}
