//! CLI for ntfy-hub-mcp
//!
//! Serves the ntfy tools over stdio. Configuration comes from
//! `config/default.*`, `NTFY_*` environment variables (a `.env` file is
//! honoured) and finally the flags below.

use clap::Parser;
use ntfy_hub_mcp::NtfyClient;
use ntfy_hub_mcp::config::{Settings, load_config};
use ntfy_hub_mcp::transport::{NtfyTools, ToolSettings};
use ntfy_hub_mcp::utils::logging;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "ntfy-hub-mcp", version, about = "MCP server bridging an agent and a human over ntfy")]
struct Cli {
    /// ntfy server base URL
    #[arg(long)]
    url: Option<String>,
    /// Default topic for outgoing notifications
    #[arg(long)]
    topic_out: Option<String>,
    /// Default topic to wait for replies on
    #[arg(long)]
    topic_in: Option<String>,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(url) = self.url {
            settings.url = url;
        }
        if let Some(topic_out) = self.topic_out {
            settings.topic_out = topic_out;
        }
        if let Some(topic_in) = self.topic_in {
            settings.topic_in = topic_in;
        }
        if let Some(log_level) = self.log_level {
            settings.log_level = log_level;
        }
        settings
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match load_config() {
        Ok(settings) => cli.apply(settings),
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(&settings.log_level);

    if let Err(e) = run_server(settings).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

async fn run_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let client = NtfyClient::new(&settings.url);
    let tools = NtfyTools::new(client, ToolSettings::from(&settings));
    let shutdown = tools.shutdown_token();

    info!(
        url = %settings.url,
        topic_out = %settings.topic_out,
        topic_in = %settings.topic_in,
        "starting MCP server on stdio"
    );
    let service = tools.serve(stdio()).await?;

    tokio::select! {
        quit = service.waiting() => {
            info!("MCP server stopped: {:?}", quit?);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }
    shutdown.cancel();

    Ok(())
}
