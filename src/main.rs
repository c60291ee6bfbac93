mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use zilmon_mcp::{build_registry, serve_stdio, DEFAULT_TOOL_NAMES};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match &cli.command {
        Commands::Completions { shell } => {
            cli::print_completions(*shell);
            Ok(())
        }
        Commands::ShowConfig => {
            let config = zilmon_config::load(cli.config.as_deref())?;
            println!("{}", toml::to_string_pretty(&config).unwrap_or_default());
            Ok(())
        }
        Commands::Tools => {
            for name in DEFAULT_TOOL_NAMES {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Serve { http, tools } => {
            let config = zilmon_config::load(cli.config.as_deref())?;
            let registry = Arc::new(build_registry(&config, tools.as_deref()));

            match http {
                Some(addr) => {
                    let addr = if addr.is_empty() {
                        &config.server.http_addr
                    } else {
                        addr
                    };
                    let addr = addr
                        .parse()
                        .with_context(|| format!("invalid bind address {addr:?}"))?;
                    zilmon_mcp::http::serve_http(registry, addr).await
                }
                None => serve_stdio(registry).await,
            }
        }
    }
}

/// Logging goes to stderr: on the stdio transport stdout carries the
/// protocol stream and must stay clean.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
