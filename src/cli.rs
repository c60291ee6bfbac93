// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "zilmon",
    about = "MCP server exposing Zilliqa validator observability metrics",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve MCP on stdio (default) or on the streamable-HTTP transport
    Serve {
        /// Bind address for the streamable-HTTP transport, e.g. 127.0.0.1:8123.
        /// When given without a value the configured server.http_addr is used.
        /// When omitted entirely the server speaks line-delimited JSON-RPC on
        /// stdin/stdout.
        #[arg(long, value_name = "ADDR", num_args = 0..=1, default_missing_value = "")]
        http: Option<String>,

        /// Comma-separated subset of tools to expose (default: all)
        #[arg(long, value_name = "NAMES")]
        tools: Option<String>,
    },
    /// Print the effective configuration and exit
    ShowConfig,
    /// List the tool names the server exposes
    Tools,
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "zilmon", &mut std::io::stdout());
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults_to_stdio() {
        let cli = Cli::try_parse_from(["zilmon", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { http, tools } => {
                assert!(http.is_none());
                assert!(tools.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_http_with_address() {
        let cli = Cli::try_parse_from(["zilmon", "serve", "--http", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve { http, .. } => assert_eq!(http.as_deref(), Some("0.0.0.0:9000")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_http_without_address_falls_back_to_config() {
        let cli = Cli::try_parse_from(["zilmon", "serve", "--http"]).unwrap();
        match cli.command {
            Commands::Serve { http, .. } => assert_eq!(http.as_deref(), Some("")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from(["zilmon", "serve", "-vv", "-c", "/tmp/z.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/tmp/z.toml"))
        );
    }

    #[test]
    fn tools_filter_is_forwarded() {
        let cli = Cli::try_parse_from(["zilmon", "serve", "--tools", "list_validators"]).unwrap();
        match cli.command {
            Commands::Serve { tools, .. } => {
                assert_eq!(tools.as_deref(), Some("list_validators"))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
