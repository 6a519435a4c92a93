//! Command-line arguments for the trip planner server

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tripplanner")]
#[command(author, version, about = "AI travel planner with WhatsApp delivery", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, env = "TRIPPLANNER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on, overrides `server.port`
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
