//! Command implementations and the wiring shared between them

pub mod his_write;
pub mod rt_write;
pub mod static_write;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use rtdb_protocol::SectionPair;
use rtdb_sink::{LoginGuard, Randomize, SinkDispatcher, UnitOffset, WritePlugin};
use rtdb_sources::{PairedReader, spawn_paired_reader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Startup delay between spawning the readers and starting the writers, so
/// the bounded channels are prefilled and the first writes see no reader
/// jitter.
pub(crate) const PREFILL_DELAY: Duration = Duration::from_secs(2);

/// Flags shared by every write command.
#[derive(Args, Debug)]
pub struct PluginArgs {
    /// Sink plugin path
    #[arg(long = "plugin")]
    pub plugin: PathBuf,

    /// Number of simulated units to fan each section out to
    #[arg(long = "unit_number", default_value_t = 1)]
    pub unit_number: i64,

    /// 32-bit run tag stamped into the high GlobalId bits
    #[arg(long = "magic", default_value_t = 0)]
    pub magic: u32,

    /// Login parameter handed to the plugin
    #[arg(long = "param")]
    pub param: Option<String>,
}

/// Stream-class selection for the realtime commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Both,
    FastOnly,
    NormalOnly,
}

impl Mode {
    pub(crate) fn fast_enabled(self) -> bool {
        self != Mode::NormalOnly
    }

    pub(crate) fn normal_enabled(self) -> bool {
        self != Mode::FastOnly
    }
}

/// `--mode` parser: 0 = both classes, 1 = only fast, 2 = only normal.
pub(crate) fn parse_mode(text: &str) -> std::result::Result<Mode, String> {
    match text {
        "0" => Ok(Mode::Both),
        "1" => Ok(Mode::FastOnly),
        "2" => Ok(Mode::NormalOnly),
        other => Err(format!("unknown mode {other}, expected 0, 1 or 2")),
    }
}

/// Load the plugin, build the fan-out dispatcher and log in.
///
/// The returned guard logs out when it drops, which covers every exit path
/// of the calling command.
pub(crate) fn connect(
    args: &PluginArgs,
    randomize: bool,
) -> Result<(SinkDispatcher, LoginGuard)> {
    let plugin =
        WritePlugin::load(&args.plugin).context("failed to load the sink plugin")?;

    let strategy = randomize.then(|| Arc::new(UnitOffset) as Arc<dyn Randomize>);
    let dispatcher = SinkDispatcher::new(Arc::new(plugin), args.magic, args.unit_number, strategy)?;

    let guard = dispatcher
        .login(args.param.as_deref())
        .context("plugin login failed")?;
    info!(
        plugin = %args.plugin.display(),
        unit_number = args.unit_number,
        magic = args.magic,
        "logged in"
    );

    Ok((dispatcher, guard))
}

/// Observe SIGINT / SIGTERM and trip the cancellation token once.
///
/// The token is idempotent, so repeated signals are harmless. The task
/// never finishes on a signal-free run; callers abort it on shutdown.
pub(crate) fn spawn_signal_observer(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("shutdown signal received, draining...");
        cancel.cancel();
    })
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// A pre-closed section channel: the writer sees instant EOF on this side.
pub(crate) fn closed_channel() -> mpsc::Receiver<SectionPair> {
    let (_, receiver) = mpsc::channel(1);
    receiver
}

/// A running paired reader, or a pre-closed stand-in for a class the mode
/// excluded.
pub(crate) struct ClassInput {
    pub receiver: mpsc::Receiver<SectionPair>,
    pub handle: Option<JoinHandle<()>>,
}

/// Spawn the paired reader for one class, or hand back a closed channel
/// when the class is disabled so the writer sees instant EOF on that side.
pub(crate) fn class_input(
    enabled: bool,
    label: &'static str,
    analog_path: &Path,
    digital_path: &Path,
    cancel: &CancellationToken,
) -> Result<ClassInput> {
    if !enabled {
        return Ok(ClassInput {
            receiver: closed_channel(),
            handle: None,
        });
    }

    let PairedReader { receiver, handle } =
        spawn_paired_reader(label, analog_path, digital_path, cancel.clone())
            .with_context(|| format!("failed to start the {label} readers"))?;
    Ok(ClassInput {
        receiver,
        handle: Some(handle),
    })
}
