//! Display sinks: observers that receive a snapshot after every buffer change.
//!
//! The accumulator never renders anything itself; plotting front-ends, tests
//! and the CLI plug in here.

use crate::scan::ScanSnapshot;
use crossbeam_channel as xch;

pub trait DisplaySink {
    fn update(&mut self, snapshot: &ScanSnapshot);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn update(&mut self, _snapshot: &ScanSnapshot) {}
}

impl<F> DisplaySink for F
where
    F: FnMut(&ScanSnapshot),
{
    fn update(&mut self, snapshot: &ScanSnapshot) {
        self(snapshot);
    }
}

/// Forwards owned snapshot copies to another thread (e.g. a render loop).
///
/// A disconnected receiver is not an error for the scan; updates are dropped.
pub struct ChannelSink {
    tx: xch::Sender<ScanSnapshot>,
}

impl ChannelSink {
    /// Unbounded channel; the renderer decides whether to skip stale frames.
    pub fn unbounded() -> (Self, xch::Receiver<ScanSnapshot>) {
        let (tx, rx) = xch::unbounded();
        (Self { tx }, rx)
    }

    pub fn new(tx: xch::Sender<ScanSnapshot>) -> Self {
        Self { tx }
    }
}

impl DisplaySink for ChannelSink {
    fn update(&mut self, snapshot: &ScanSnapshot) {
        if self.tx.send(snapshot.clone()).is_err() {
            tracing::trace!("display receiver gone, dropping snapshot");
        }
    }
}
