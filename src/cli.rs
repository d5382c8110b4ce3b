use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pixly")]
#[command(author, version, about = "Image catalog with upload, search and edits")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "PIXLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Database URL, e.g. sqlite://pixly.db (overrides config)
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Database URL (overrides config)
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
