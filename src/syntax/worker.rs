//! Background rebuild worker
//!
//! Rebuilds run on a dedicated thread so rendering never waits on
//! tokenization. Requests carry the document revision; only the newest
//! pending request is built, and a build that falls behind a newer request
//! stops without publishing anything.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use super::cache::IndexUpdate;
use super::grammar::Grammar;
use super::index::LineTokenIndex;
use crate::error::HighlightError;

/// One document snapshot to index
#[derive(Debug, Clone)]
pub struct RebuildRequest {
    pub revision: u64,
    pub text: String,
    pub grammar: Option<Grammar>,
}

/// Handle to the rebuild thread
///
/// Dropping the handle closes the request channel and joins the thread.
pub struct HighlightWorker {
    tx: Option<Sender<RebuildRequest>>,
    rx: Receiver<IndexUpdate>,
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl HighlightWorker {
    /// Spawn the worker thread
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx_cmd) = crossbeam_channel::unbounded::<RebuildRequest>();
        let (tx_evt, rx) = crossbeam_channel::unbounded();
        let latest = Arc::new(AtomicU64::new(0));
        let newest = Arc::clone(&latest);

        let handle = thread::Builder::new()
            .name("hilite-rebuild".to_string())
            .spawn(move || {
                for req in rx_cmd.iter() {
                    let mut pending = req;
                    // Coalesce bursts so only the newest snapshot is built
                    while let Ok(next) = rx_cmd.try_recv() {
                        pending = next;
                    }
                    if let Some(update) = rebuild(pending, &newest) {
                        if tx_evt.send(update).is_err() {
                            break;
                        }
                    }
                }
            })?;

        Ok(Self {
            tx: Some(tx),
            rx,
            latest,
            handle: Some(handle),
        })
    }

    /// Queue a rebuild of `text` at `revision`
    ///
    /// Any build still running for an older revision is abandoned.
    pub fn request(&self, revision: u64, text: String, grammar: Option<Grammar>) {
        self.latest.fetch_max(revision, Ordering::SeqCst);
        let Some(tx) = &self.tx else {
            return;
        };
        if tx
            .send(RebuildRequest {
                revision,
                text,
                grammar,
            })
            .is_err()
        {
            warn!(target: "hilite::worker", revision, "rebuild worker has stopped");
        }
    }

    /// A finished index, if one is ready
    pub fn try_recv(&self) -> Option<IndexUpdate> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a finished index
    pub fn recv_timeout(&self, timeout: Duration) -> Option<IndexUpdate> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for HighlightWorker {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn rebuild(req: RebuildRequest, latest: &AtomicU64) -> Option<IndexUpdate> {
    let revision = req.revision;
    let Some(grammar) = &req.grammar else {
        return Some(IndexUpdate {
            revision,
            index: Arc::default(),
        });
    };

    let started = Instant::now();
    let built = LineTokenIndex::build_with(&req.text, grammar, |_| {
        latest.load(Ordering::SeqCst) > revision
    });
    let index = match built {
        Ok(index) => {
            debug!(
                target: "hilite::worker",
                grammar = grammar.name(),
                revision,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "rebuilt token index"
            );
            index
        }
        Err(HighlightError::RebuildAborted) => {
            debug!(target: "hilite::worker", revision, "rebuild superseded");
            return None;
        }
        Err(err) => {
            warn!(
                target: "hilite::worker",
                grammar = grammar.name(),
                revision,
                error = %err,
                "rebuild failed; rendering as plain text"
            );
            LineTokenIndex::default()
        }
    };
    Some(IndexUpdate {
        revision,
        index: Arc::new(index),
    })
}
