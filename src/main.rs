mod ai;
mod app;
mod cli;
mod config;
mod domain;
mod infrastructure;
mod store;
mod tasks;

use anyhow::Result;
use clap::Parser;
use infrastructure::{directories, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    let mut config = config::load_config()?;
    if let Some(data_dir) = cli.data_dir.clone() {
        config.directories.data_dir = data_dir;
    }
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let app = app::MailAgentApp::initialize(&config, paths, cli.offline);
    cli::run(cli.command, &app).await
}
