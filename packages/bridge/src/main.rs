//! NoteGraph Bridge
//!
//! Starts one of the three surfaces over the same services:
//!
//! - `stdio` - MCP over stdin/stdout (what desktop MCP clients launch)
//! - `mcp-http` - MCP over `POST /mcp`
//! - `legacy-http` - the `POST /api/<tool>` endpoints
//!
//! Configuration comes from the environment (see `notegraph_core::config`).
//! Logs always go to stderr so stdout stays a clean JSON-RPC channel.

use clap::{Parser, Subcommand};
use notegraph_core::config::Credentials;
use notegraph_core::mcp::{run_mcp_server, McpServices, McpTransport};
use notegraph_core::remote::{
    create_http_client, CachedTokenProvider, HttpGraphStore, HttpTokenSource, RequestQueue,
    StaticTokenSource, TokenSource,
};
use notegraph_core::{BridgeConfig, RootClassifier, SessionIdentity, TraversalConfig};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

/// NoteGraph bridge for AI agents and legacy REST clients
#[derive(Parser)]
#[command(name = "notegraph-bridge")]
#[command(version)]
#[command(about = "Expose a remote NoteGraph store over MCP and HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// MCP over stdin/stdout (default)
    Stdio,
    /// MCP over HTTP (`POST /mcp`)
    McpHttp {
        /// Port to listen on
        #[arg(long, env = "MCP_PORT")]
        port: Option<u16>,
    },
    /// Legacy `POST /api/<tool>` endpoints
    LegacyHttp {
        /// Port to listen on
        #[arg(long, env = "HTTP_PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BridgeConfig::from_env()?;
    tracing::info!(
        "🚀 NoteGraph bridge v{} targeting {}",
        env!("CARGO_PKG_VERSION"),
        config.api_url
    );

    let services = build_services(&config)?;

    match cli.command.unwrap_or(Commands::Stdio) {
        Commands::Stdio => run_mcp_server(services, McpTransport::Stdio).await?,
        Commands::McpHttp { port } => {
            let port = port.unwrap_or(config.mcp_port);
            run_mcp_server(services, McpTransport::Http { port }).await?
        }
        Commands::LegacyHttp { port } => {
            let port = port.unwrap_or(config.http_port);
            notegraph_core::http::start_server(services, port).await?
        }
    }

    tracing::info!("✅ NoteGraph bridge stopped");
    Ok(())
}

/// Wire the remote store, token cache and request queue into the services
fn build_services(config: &BridgeConfig) -> anyhow::Result<McpServices> {
    let identity = SessionIdentity::new(&config.user_id)?;
    let client = create_http_client();

    let source: Arc<dyn TokenSource> = match &config.credentials {
        Credentials::ApiKey(key) => Arc::new(HttpTokenSource::new(
            client.clone(),
            config.api_url.clone(),
            key.clone(),
        )),
        Credentials::AccessToken(token) => Arc::new(StaticTokenSource::new(token.clone())),
    };
    let tokens = Arc::new(CachedTokenProvider::new(source));
    let queue = Arc::new(RequestQueue::new(config.queue.clone()));

    let store = Arc::new(HttpGraphStore::with_client(
        client,
        config.api_url.clone(),
        tokens,
        queue,
    ));

    let classifier = RootClassifier::new(
        config.shared_root_ids.clone(),
        Some(config.user_root_id.clone()),
    );
    let traversal = TraversalConfig {
        budget: config.traversal_budget,
        ..Default::default()
    };

    Ok(McpServices::new(store, identity, classifier, traversal))
}
