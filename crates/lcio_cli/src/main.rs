//! LCIO directory CLI
//!
//! Command-line tools for the random-access directory of an LCIO file.
//!
//! # Commands
//!
//! - `inspect` - Display the aggregate and every segment entry
//! - `find` - Locate the segment holding a run/event
//! - `verify` - Check the chain against the aggregate
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LCIO random-access directory tools.
#[derive(Parser)]
#[command(name = "lcio-dir")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the LCIO file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Offset of the aggregate directory entry
    #[arg(global = true, short, long, default_value = "0")]
    offset: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the aggregate and every segment entry
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Locate the segment whose range holds a run/event
    Find {
        /// Run number
        #[arg(short, long, allow_hyphen_values = true)]
        run: i32,

        /// Event number
        #[arg(short, long, allow_hyphen_values = true)]
        event: i32,
    },

    /// Check the chain against the aggregate
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("File path required for inspect")?;
            commands::inspect::run(&path, cli.offset, &format)?;
        }
        Commands::Find { run, event } => {
            let path = cli.path.ok_or("File path required for find")?;
            commands::find::run(&path, cli.offset, run, event)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("File path required for verify")?;
            commands::verify::run(&path, cli.offset)?;
        }
        Commands::Version => {
            println!("lcio-dir v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "{} block v{}",
                lcio_access::RANDOM_ACCESS_NAME,
                lcio_access::RANDOM_ACCESS_VERSION
            );
        }
    }

    Ok(())
}
