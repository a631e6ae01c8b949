//! Paired-stream coordinator
//!
//! The analog and digital files of one stream class are always consumed
//! pairwise. The coordinator runs both section readers into private
//! channels and zippers their outputs into a single [`SectionPair`]
//! channel, which keeps the downstream writer's select loop to one
//! receiver per class and preserves timestamp co-alignment to the extent
//! the sources agree.

use std::path::Path;

use rtdb_protocol::{Analog, AnalogSection, Digital, DigitalSection, SectionPair};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::CACHE_SIZE;
use crate::section_reader::spawn_section_reader;

/// A running pair of section readers plus the zippering task.
pub struct PairedReader {
    /// Merged section stream; closes when both inputs are exhausted
    pub receiver: mpsc::Receiver<SectionPair>,
    /// Joins the zipper task and both readers
    pub handle: JoinHandle<()>,
}

/// Start paired analog+digital readers for one stream class.
///
/// Fails fast if either file cannot be opened.
pub fn spawn_paired_reader(
    label: &'static str,
    analog_path: &Path,
    digital_path: &Path,
    cancel: CancellationToken,
) -> crate::Result<PairedReader> {
    let (analog_tx, analog_rx) = mpsc::channel::<AnalogSection>(CACHE_SIZE);
    let (digital_tx, digital_rx) = mpsc::channel::<DigitalSection>(CACHE_SIZE);
    let (pair_tx, pair_rx) = mpsc::channel::<SectionPair>(CACHE_SIZE);

    let analog_handle = spawn_section_reader::<Analog>(analog_path, analog_tx, cancel.clone())?;
    let digital_handle = spawn_section_reader::<Digital>(digital_path, digital_tx, cancel)?;

    let handle = tokio::spawn(async move {
        pair_sections(label, analog_rx, digital_rx, pair_tx).await;
        let _ = analog_handle.await;
        let _ = digital_handle.await;
    });

    Ok(PairedReader {
        receiver: pair_rx,
        handle,
    })
}

/// Zipper loop: read one element from each side per iteration, where a
/// closed channel contributes `None`; terminate when both are closed.
async fn pair_sections(
    label: &str,
    mut analog_rx: mpsc::Receiver<AnalogSection>,
    mut digital_rx: mpsc::Receiver<DigitalSection>,
    pair_tx: mpsc::Sender<SectionPair>,
) {
    let mut pairs = 0u64;
    loop {
        let analog = analog_rx.recv().await;
        let digital = digital_rx.recv().await;

        if analog.is_none() && digital.is_none() {
            break;
        }

        pairs += 1;
        if pair_tx.send(SectionPair { analog, digital }).await.is_err() {
            // writer shut down; stop pulling so the readers unblock and exit
            break;
        }
    }
    debug!(class = label, pairs, "coordinator finished");
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod coordinator_test;
