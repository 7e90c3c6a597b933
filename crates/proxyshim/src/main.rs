//! proxyshim - property-access rewriter
//!
//! CLI driver for rewriting JavaScript so that virtual objects work on
//! engines without a native `Proxy`.

mod commands;
mod config;
mod sources;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Property-access rewriter
#[derive(Parser, Debug)]
#[command(name = "proxyshim")]
#[command(author, version, about = "Rewrite property access into dispatch-runtime calls")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (default: ./proxyshim.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings shared by every command.
#[derive(Clone, Copy, Debug)]
pub struct Output {
    pub format: OutputFormat,
    pub use_color: bool,
    pub verbose: u8,
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite a file or directory
    Rewrite(commands::rewrite::RewriteArgs),

    /// Rewrite a script and run it on an engine without Proxy
    Run(commands::run::RunArgs),

    /// Report what a rewrite would do without writing anything
    Check(commands::check::CheckArgs),

    /// Write a default proxyshim.toml
    Init(commands::init::InitArgs),

    /// Explain a diagnostic code
    Explain(commands::explain::ExplainArgs),
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    // RUST_LOG still takes precedence
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // Determine if colors should be used
    let use_color = !cli.no_color && !cli.quiet && atty::is(atty::Stream::Stdout);
    let output = Output {
        format: cli.format,
        use_color,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Rewrite(args) => {
            let config = config::ProjectConfig::load(cli.config.as_deref())?;
            commands::rewrite::run(args, config, output)
        }
        Commands::Run(args) => {
            let config = config::ProjectConfig::load(cli.config.as_deref())?;
            commands::run::run(args, config, output)
        }
        Commands::Check(args) => {
            let config = config::ProjectConfig::load(cli.config.as_deref())?;
            commands::check::run(args, config, output)
        }
        Commands::Init(args) => commands::init::run(args, output),
        Commands::Explain(args) => commands::explain::run(args, output),
    }
}
