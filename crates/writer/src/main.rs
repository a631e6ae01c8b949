//! RTDB Writer - benchmarking harness for realtime / time-series databases
//!
//! # Usage
//!
//! ```bash
//! # Write static point descriptors
//! rtdb-writer static_write --plugin ./librtdb.so \
//!     --static_analog STATIC_ANALOG.csv --static_digital STATIC_DIGITAL.csv
//!
//! # Drain realtime files as fast as the sink accepts
//! rtdb-writer rt_fast_write --plugin ./librtdb.so \
//!     --rt_fast_analog FAST_A.csv --rt_fast_digital FAST_D.csv \
//!     --rt_normal_analog NORM_A.csv --rt_normal_digital NORM_D.csv
//!
//! # Paced realtime write with overload protection and fast cache
//! rtdb-writer rt_periodic_write ... --overload_protection --fast_cache
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// RTDB / TSDB write-performance testing tool
#[derive(Parser, Debug)]
#[command(name = "rtdb-writer")]
#[command(about, long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the version
    #[command(name = "version")]
    Version,

    /// Write STATIC_ANALOG.csv, STATIC_DIGITAL.csv
    #[command(name = "static_write")]
    StaticWrite(cmd::static_write::StaticWriteArgs),

    /// Fast write of realtime fast + normal point files
    #[command(name = "rt_fast_write")]
    RtFastWrite(cmd::rt_write::RtFastArgs),

    /// Periodic write of realtime fast + normal point files
    #[command(name = "rt_periodic_write")]
    RtPeriodicWrite(cmd::rt_write::RtPeriodicArgs),

    /// Fast write of history point files
    #[command(name = "his_fast_write")]
    HisFastWrite(cmd::his_write::HisArgs),

    /// Periodic write of history point files
    #[command(name = "his_periodic_write")]
    HisPeriodicWrite(cmd::his_write::HisArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // argument problems exit 1, same as fatal runtime errors
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(1);
    });

    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::StaticWrite(args) => cmd::static_write::run(args).await,
        Command::RtFastWrite(args) => cmd::rt_write::run_fast(args).await,
        Command::RtPeriodicWrite(args) => cmd::rt_write::run_periodic(args).await,
        Command::HisFastWrite(args) => cmd::his_write::run_fast(args).await,
        Command::HisPeriodicWrite(args) => cmd::his_write::run_periodic(args).await,
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
