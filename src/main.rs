// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repograph CLI - a GitHub repository as a shareable node graph

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use repograph::commands::{self, annotate::AnnotateArgs, graph::Source, share::ShareArgs, Output};
use repograph::config;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repograph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "REPOGRAPH_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "REPOGRAPH_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    no_color: bool,

    /// Output in JSON format (graph, share open, annotate list, token status, config)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the branch/deployment graph of a repository
    Graph {
        /// Repository URL (https://github.com/<owner>/<repo>)
        #[arg(required_unless_present = "snapshot")]
        repo: Option<String>,

        /// Build from a saved snapshot instead of the live API
        #[arg(long, conflicts_with = "repo")]
        snapshot: Option<std::path::PathBuf>,

        /// Output format (dot, json, summary)
        #[arg(short, long, default_value = "dot")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Fetch and save the raw repository data
    Snapshot {
        /// Repository URL
        repo: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Create or open share links
    Share {
        /// Action: create, open
        action: String,

        /// Repository URL (create) or link/token (open)
        input: Option<String>,

        /// Selected node ID
        #[arg(long)]
        node: Option<String>,

        /// Viewport zoom
        #[arg(long)]
        zoom: Option<f64>,

        /// Viewport x position
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,

        /// Viewport y position
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,

        /// Print only the token, not the full link
        #[arg(long)]
        token_only: bool,
    },

    /// Manage node annotations
    Annotate {
        /// Action: set, remove, list
        action: String,

        /// Node ID
        node: Option<String>,

        /// Annotation text
        #[arg(long)]
        text: Option<String>,

        /// Text color
        #[arg(long)]
        text_color: Option<String>,

        /// Box color
        #[arg(long)]
        box_color: Option<String>,

        /// Horizontal offset from the node
        #[arg(long, allow_negative_numbers = true)]
        dx: Option<f64>,

        /// Vertical offset from the node
        #[arg(long, allow_negative_numbers = true)]
        dy: Option<f64>,

        /// Author (defaults to $USER)
        #[arg(long)]
        user: Option<String>,
    },

    /// Manage the stored GitHub token.
    ///
    /// When the API rejects a request, a token is asked for on the terminal.
    ///
    /// That prompt echoes the token as it is typed; use `token set` instead.
    Token {
        /// Action: set, clear, status
        action: String,

        /// Token value (set)
        value: Option<String>,
    },

    /// Show configuration
    Config {
        /// Configuration key (omit to show everything)
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: u8, quiet: bool, default_level: &str) {
    let level = match verbose {
        0 if quiet => "error",
        0 => default_level,
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    init_logging(cli.verbose, cli.quiet, &config.log_level);

    let out = Output {
        color: !cli.no_color && std::io::stdout().is_terminal(),
        json: cli.json,
    };

    // Execute command
    match cli.command {
        Commands::Graph { repo, snapshot, format, output } => {
            let source = match (snapshot, repo) {
                (Some(path), _) => Source::Snapshot(path),
                (None, Some(url)) => Source::Repo(url),
                (None, None) => anyhow::bail!("Either a repository URL or --snapshot is required"),
            };
            commands::graph::run(&config, out, source, &format, output)
        }
        Commands::Snapshot { repo, output } => {
            commands::snapshot::run(&config, &repo, output)
        }
        Commands::Share { action, input, node, zoom, x, y, token_only } => {
            let args = ShareArgs { node, zoom, x, y, token_only };
            commands::share::run(&config, out, &action, input, args)
        }
        Commands::Annotate { action, node, text, text_color, box_color, dx, dy, user } => {
            let args = AnnotateArgs { text, text_color, box_color, dx, dy, user };
            commands::annotate::run(&config, out, &action, node, args)
        }
        Commands::Token { action, value } => {
            commands::token::run(&config, out, &action, value)
        }
        Commands::Config { key } => {
            commands::config::run(&config, out, key.as_deref())
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}
