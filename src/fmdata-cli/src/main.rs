use anyhow::{Context, Result};
use clap::Parser;
use fmdata_cli::{commands, CliConfig};
use fmdata_rs::Client;
use std::path::PathBuf;

mod telemetry;

#[derive(Parser)]
#[command(
    name = "fmdata",
    about = "FileMaker Data API client: log in, run one request, log out",
    version
)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, short = 'c', default_value = "fmdata.json")]
    config: String,

    /// Database account name (overrides the config file)
    #[arg(long, env = "FMDATA_USERNAME")]
    username: Option<String>,

    /// Database account password (overrides the config file)
    #[arg(long, env = "FMDATA_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Directory for rotated log files
    #[arg(long, default_value = "./logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = telemetry::init_telemetry(&cli.log_dir)?;

    let mut config = CliConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config))?;
    if let Some(username) = cli.username {
        config.username = username;
    }
    if let Some(password) = cli.password {
        config.password = password;
    }

    tracing::info!("fmdata starting");
    tracing::info!("  Host: {}", config.client.base_url());
    tracing::info!("  Database: {}", config.database);

    let credentials = config.credentials()?;
    let ca_cert = config.client.read_ca_cert()?;
    let mut client = Client::from_config(&config.client, credentials, ca_cert.as_deref())?;

    let body = commands::run_session(&mut client, &config.database, &config.layout, cli.command)
        .await?;
    println!("{}", body);

    Ok(())
}
