/// Main entry point for the Hello World MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hello_world_mcp::config::DEFAULT_MAX_IN_FLIGHT;
use hello_world_mcp::{HelloWorldServer, ServerConfig};

/// Command line arguments for the Hello World MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    /// Process requests one at a time, answering strictly in arrival order
    #[arg(long)]
    sequential: bool,

    /// Maximum number of tool calls executing at once
    #[arg(long, default_value_t = DEFAULT_MAX_IN_FLIGHT)]
    max_in_flight: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    // RUST_LOG wins over the flags when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hello_world_mcp={}", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    let mut config = ServerConfig::default().with_max_in_flight(args.max_in_flight);
    if args.sequential {
        config = config.sequential();
    }

    info!("Starting {} (concurrent dispatch: {})", config.name, config.concurrent);

    // Registry errors surface here, before any request is read
    let server = HelloWorldServer::new(config)?;

    // Run the MCP server - this will handle JSON-RPC communication over stdin/stdout
    server.run().await?;

    info!("Hello World MCP server shutdown complete");
    Ok(())
}
