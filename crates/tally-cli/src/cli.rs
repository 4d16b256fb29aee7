use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "tally: an append-only record ledger with a reconciled history view",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run an embedded node through a scripted append-and-reconcile tour
    Demo(DemoArgs),
    /// Start the tally HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct DemoArgs {}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind, e.g. 127.0.0.1:9610
    #[arg(long)]
    pub bind: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Allow appends without credentials
    #[arg(long)]
    pub allow_anonymous_append: Option<bool>,
}
