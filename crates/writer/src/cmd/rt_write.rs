//! `rt_fast_write` / `rt_periodic_write` - realtime section writes

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rtdb_pipeline::{FastDrainWriter, PeriodicConfig, PeriodicWriter, WriteTarget};
use rtdb_stats::{print_class_summary, print_run_times};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::{
    Mode, PREFILL_DELAY, PluginArgs, class_input, closed_channel, connect, parse_mode,
    spawn_signal_observer,
};

#[derive(Args, Debug)]
pub struct RtFastArgs {
    #[command(flatten)]
    plugin: PluginArgs,

    /// Realtime fast analog csv path (unused with --mode 2)
    #[arg(long = "rt_fast_analog", default_value = "")]
    rt_fast_analog: PathBuf,

    /// Realtime fast digital csv path (unused with --mode 2)
    #[arg(long = "rt_fast_digital", default_value = "")]
    rt_fast_digital: PathBuf,

    /// Realtime normal analog csv path (unused with --mode 1)
    #[arg(long = "rt_normal_analog", default_value = "")]
    rt_normal_analog: PathBuf,

    /// Realtime normal digital csv path (unused with --mode 1)
    #[arg(long = "rt_normal_digital", default_value = "")]
    rt_normal_digital: PathBuf,

    /// Offset analog values per unit so units are distinguishable
    #[arg(long = "random_av")]
    random_av: bool,

    /// 0 = both classes, 1 = only fast points, 2 = only normal points
    #[arg(long = "mode", default_value = "0", value_parser = parse_mode)]
    mode: Mode,

    /// Drain the two classes with independent writers instead of one
    /// select loop
    #[arg(long = "parallel_writing")]
    parallel_writing: bool,
}

#[derive(Args, Debug)]
pub struct RtPeriodicArgs {
    #[command(flatten)]
    base: RtFastArgs,

    /// Throttle the first iterations to the overload-protection period
    #[arg(long = "overload_protection")]
    overload_protection: bool,

    /// Gather fast-class sections into batched list calls
    #[arg(long = "fast_cache")]
    fast_cache: bool,
}

pub async fn run_fast(args: RtFastArgs) -> Result<()> {
    let (dispatcher, guard) = connect(&args.plugin, args.random_av)?;
    let cancel = CancellationToken::new();
    let signal_task = spawn_signal_observer(cancel.clone());

    let fast = class_input(
        args.mode.fast_enabled(),
        "fast",
        &args.rt_fast_analog,
        &args.rt_fast_digital,
        &cancel,
    )?;
    let normal = class_input(
        args.mode.normal_enabled(),
        "normal",
        &args.rt_normal_analog,
        &args.rt_normal_digital,
        &cancel,
    )?;

    // let the readers prefill the channels
    sleep(PREFILL_DELAY).await;

    if args.parallel_writing {
        let fast_writer =
            FastDrainWriter::new(dispatcher.clone(), WriteTarget::Realtime, cancel.clone());
        let normal_writer =
            FastDrainWriter::new(dispatcher.clone(), WriteTarget::Realtime, cancel.clone());

        let (fast_report, normal_report) = tokio::join!(
            fast_writer.run(fast.receiver, closed_channel()),
            normal_writer.run(closed_channel(), normal.receiver),
        );

        print_class_summary("fast", &fast_report.fast);
        print_run_times("fast", &fast_report.times);
        print_class_summary("normal", &normal_report.normal);
        print_run_times("normal", &normal_report.times);
    } else {
        let writer = FastDrainWriter::new(dispatcher, WriteTarget::Realtime, cancel.clone());
        let report = writer.run(fast.receiver, normal.receiver).await;

        print_class_summary("fast", &report.fast);
        print_class_summary("normal", &report.normal);
        print_run_times("rt_fast", &report.times);
    }

    if let Some(handle) = fast.handle {
        let _ = handle.await;
    }
    if let Some(handle) = normal.handle {
        let _ = handle.await;
    }
    signal_task.abort();
    drop(guard);
    Ok(())
}

pub async fn run_periodic(args: RtPeriodicArgs) -> Result<()> {
    let base = args.base;
    let (dispatcher, guard) = connect(&base.plugin, base.random_av)?;
    let cancel = CancellationToken::new();
    let signal_task = spawn_signal_observer(cancel.clone());

    let fast = class_input(
        base.mode.fast_enabled(),
        "fast",
        &base.rt_fast_analog,
        &base.rt_fast_digital,
        &cancel,
    )?;
    let normal = class_input(
        base.mode.normal_enabled(),
        "normal",
        &base.rt_normal_analog,
        &base.rt_normal_digital,
        &cancel,
    )?;

    sleep(PREFILL_DELAY).await;

    let fast_writer = PeriodicWriter::new(
        dispatcher.clone(),
        PeriodicConfig::fast(args.fast_cache),
        cancel.clone(),
    );
    let normal_writer = PeriodicWriter::new(
        dispatcher,
        PeriodicConfig::normal(args.overload_protection),
        cancel.clone(),
    );

    let (fast_report, normal_report) = tokio::join!(
        fast_writer.run(fast.receiver),
        normal_writer.run(normal.receiver),
    );

    if base.mode.fast_enabled() {
        print_class_summary("fast", &fast_report.log);
        print_run_times("fast", &fast_report.times);
    }
    if base.mode.normal_enabled() {
        print_class_summary("normal", &normal_report.log);
        print_run_times("normal", &normal_report.times);
    }

    if let Some(handle) = fast.handle {
        let _ = handle.await;
    }
    if let Some(handle) = normal.handle {
        let _ = handle.await;
    }
    signal_task.abort();
    drop(guard);
    Ok(())
}
