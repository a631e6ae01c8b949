//! `static_write` - one-shot write of the static point descriptors

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rtdb_sink::StaticKind;
use rtdb_sources::{read_static_analog, read_static_digital};
use tokio::task;
use tokio::time::Instant;
use tracing::info;

use super::{PluginArgs, connect};

#[derive(Args, Debug)]
pub struct StaticWriteArgs {
    #[command(flatten)]
    plugin: PluginArgs,

    /// Static analog descriptor csv path
    #[arg(long = "static_analog")]
    static_analog: PathBuf,

    /// Static digital descriptor csv path
    #[arg(long = "static_digital")]
    static_digital: PathBuf,

    /// Point class: 0 = fast realtime, 1 = normal realtime, 2 = normal history
    #[arg(long = "type", default_value = "0", value_parser = parse_static_kind)]
    kind: StaticKind,
}

fn parse_static_kind(text: &str) -> std::result::Result<StaticKind, String> {
    let raw: i64 = text
        .parse()
        .map_err(|_| format!("invalid type {text:?}, expected 0, 1 or 2"))?;
    StaticKind::try_from(raw).map_err(|v| format!("unknown type {v}, expected 0, 1 or 2"))
}

pub async fn run(args: StaticWriteArgs) -> Result<()> {
    let (dispatcher, _guard) = connect(&args.plugin, false)?;

    let analog_path = args.static_analog.clone();
    let digital_path = args.static_digital.clone();
    let analog = task::spawn_blocking(move || read_static_analog(&analog_path))
        .await
        .context("static analog reader task failed")??;
    let digital = task::spawn_blocking(move || read_static_digital(&digital_path))
        .await
        .context("static digital reader task failed")??;

    info!(
        analog_points = analog.len(),
        digital_points = digital.len(),
        kind = ?args.kind,
        "static descriptors loaded"
    );

    let started = Instant::now();
    dispatcher.write_static_analog(analog, args.kind).await;
    dispatcher.write_static_digital(digital, args.kind).await;

    println!("static write | total: {:?}", started.elapsed());
    Ok(())
}
