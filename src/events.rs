//! Progress events emitted by a protocol run
//!
//! Events are diagnostics only: dropping every one of them does not change
//! the outcome of a run.

use crate::bundle::{BundleKind, Index};
use crate::phase::Phase;

/// Something observable happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A phase signal was handled
    PhaseStarted(Phase),
    /// This node pushed a bundle to the board
    Sent { kind: BundleKind, digest: String },
    /// The engine had nothing to send for this phase
    NothingToSend(Phase),
    /// An inbound envelope passed authentication and was buffered
    Accepted { kind: BundleKind, sender: Index },
    /// An inbound envelope failed authentication
    Dropped {
        kind: BundleKind,
        sender: Index,
        reason: String,
    },
    /// An inbound envelope arrived after its batch went to the engine
    Late { kind: BundleKind, sender: Index },
    /// The run delivered its outcome
    Finished { success: bool },
}

/// Subscriber for [`Event`]s
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event);
}

impl<F> Observer for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}
