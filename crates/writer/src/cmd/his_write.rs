//! `his_fast_write` / `his_periodic_write` - history section writes
//!
//! History runs carry only the normal point class.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rtdb_pipeline::{FastDrainWriter, PeriodicConfig, PeriodicWriter, WriteTarget};
use rtdb_stats::{print_class_summary, print_run_times};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::{PREFILL_DELAY, PluginArgs, class_input, closed_channel, connect, spawn_signal_observer};

#[derive(Args, Debug)]
pub struct HisArgs {
    #[command(flatten)]
    plugin: PluginArgs,

    /// History normal analog csv path
    #[arg(long = "his_normal_analog")]
    his_normal_analog: PathBuf,

    /// History normal digital csv path
    #[arg(long = "his_normal_digital")]
    his_normal_digital: PathBuf,

    /// Offset analog values per unit so units are distinguishable
    #[arg(long = "random_av")]
    random_av: bool,
}

pub async fn run_fast(args: HisArgs) -> Result<()> {
    let (dispatcher, guard) = connect(&args.plugin, args.random_av)?;
    let cancel = CancellationToken::new();
    let signal_task = spawn_signal_observer(cancel.clone());

    let normal = class_input(
        true,
        "normal",
        &args.his_normal_analog,
        &args.his_normal_digital,
        &cancel,
    )?;

    sleep(PREFILL_DELAY).await;

    let writer = FastDrainWriter::new(dispatcher, WriteTarget::History, cancel.clone());
    let report = writer.run(closed_channel(), normal.receiver).await;

    print_class_summary("history", &report.normal);
    print_run_times("his_fast", &report.times);

    if let Some(handle) = normal.handle {
        let _ = handle.await;
    }
    signal_task.abort();
    drop(guard);
    Ok(())
}

pub async fn run_periodic(args: HisArgs) -> Result<()> {
    let (dispatcher, guard) = connect(&args.plugin, args.random_av)?;
    let cancel = CancellationToken::new();
    let signal_task = spawn_signal_observer(cancel.clone());

    let normal = class_input(
        true,
        "normal",
        &args.his_normal_analog,
        &args.his_normal_digital,
        &cancel,
    )?;

    sleep(PREFILL_DELAY).await;

    let writer = PeriodicWriter::new(dispatcher, PeriodicConfig::history(), cancel.clone());
    let report = writer.run(normal.receiver).await;

    print_class_summary("history", &report.log);
    print_run_times("his_periodic", &report.times);

    if let Some(handle) = normal.handle {
        let _ = handle.await;
    }
    signal_task.abort();
    drop(guard);
    Ok(())
}
