use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediagrab")]
#[command(author, version, about = "Fetch media with yt-dlp and serve it as MP3 or MP4")]
pub struct Cli {
    /// Path to JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config and MEDIAGRAB_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check that yt-dlp and ffmpeg are available
    CheckTools,

    /// Validate the configuration and print the effective settings
    Validate,

    /// Show version information
    Version,
}
