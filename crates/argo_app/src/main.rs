mod platform;

use std::path::PathBuf;

use argo_logging::argo_info;
use clap::Parser;

use platform::config::{AppConfig, DEFAULT_CONFIG_FILE};
use platform::logging::{self, LogDestination};

/// Select an ocean region and download Argo float profiles as CSV.
#[derive(Debug, Parser)]
#[command(name = "argo", version)]
struct Cli {
    /// RON config file; missing means built-in defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Service endpoint (ws:// or wss:// unless --http).
    #[arg(long)]
    endpoint: Option<String>,

    /// Use the plain POST /api/process endpoint instead of the websocket.
    #[arg(long)]
    http: bool,

    /// Directory downloads are written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum)]
    log: Option<LogDestination>,

    /// Debug-level logging.
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if self.http {
            config.use_http();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(destination) = self.log {
            config.log_destination = destination;
        }
        config.verbose |= self.verbose;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config)?;
    cli.apply(&mut config);

    logging::initialize(config.log_destination, config.verbose);
    argo_info!(
        "argo starting: endpoint={} transport={:?} output_dir={}",
        config.endpoint,
        config.transport,
        config.output_dir.display()
    );

    platform::run_app(config)
}
