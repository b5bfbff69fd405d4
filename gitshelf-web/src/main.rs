//! gitshelf web server
//!
//! Serves the repository store at `--config` (or `/mnt/git`) over HTTP.

use clap::Parser;
use gitshelf_core::{init_logging, LogFormat, LoggingConfig};
use gitshelf_web::server::GitshelfServerBuilder;
use gitshelf_web::WebConfig;
use std::path::PathBuf;
use tracing::info;

/// gitshelf web server - browse and manage a directory of git repositories
#[derive(Parser)]
#[command(name = "gitshelf-web")]
#[command(about = "HTTP interface for a gitshelf repository store")]
#[command(version)]
struct Args {
    /// Server host to bind to [env: GITSHELF_WEB_HOST, default: 127.0.0.1]
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on [env: GITSHELF_WEB_PORT, default: 8080]
    #[arg(short, long)]
    port: Option<u16>,

    /// Store configuration file (TOML) [env: GITSHELF_CONFIG]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace) [env: GITSHELF_LOG_LEVEL]
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact")]
    log_format: LogFormatArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum LogFormatArg {
    Json,
    Pretty,
    Compact,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
        }
    }
}

impl Args {
    /// Command line values take precedence over the environment
    fn apply(self, mut config: WebConfig) -> WebConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = self.config {
            config.config_file = Some(path);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let log_format = args.log_format;
    let config = args.apply(WebConfig::from_env());

    let mut logging = LoggingConfig::with_level(&config.log_level);
    logging.format = log_format.into();
    logging.filter_directives.push("tower_http=debug".to_string());
    init_logging(&logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        address = %config.address(),
        config_file = ?config.config_file,
        "starting gitshelf web server"
    );

    let server = GitshelfServerBuilder::with_config(config).build()?;
    server.start().await?;
    Ok(())
}
