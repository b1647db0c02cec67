//! CLI argument parsing with subcommand architecture.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "quill", version, about = "Quill blog web service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the web server (default when no subcommand is given)
    Run(RunArgs),
    /// Probe the configured backing store once and report readiness
    Probe(ProbeArgs),
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Listen host (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Log level (overrides LOG_LEVEL)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Probe timeout in milliseconds (overrides READINESS_TIMEOUT_MS)
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}
