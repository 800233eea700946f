//! Broadcast board connecting all participants of a run
//!
//! A board makes no promise about ordering, duplicates or completeness, and
//! a node may see its own broadcasts. Pushes are fire-and-forget and must
//! never block, so a node whose orchestrator has already finished cannot
//! stall its peers.

pub mod hub;

pub use hub::{BroadcastHub, HubBoard};

use crate::bundle::{AuthDealBundle, AuthJustificationBundle, AuthResponseBundle};
use tokio::sync::mpsc;

/// Inbound envelope streams, one per kind
pub struct Incoming<D, R, J> {
    pub deals: mpsc::UnboundedReceiver<AuthDealBundle<D>>,
    pub responses: mpsc::UnboundedReceiver<AuthResponseBundle<R>>,
    pub justifications: mpsc::UnboundedReceiver<AuthJustificationBundle<J>>,
}

/// Sending half matching an [`Incoming`]
pub struct Outgoing<D, R, J> {
    pub deals: mpsc::UnboundedSender<AuthDealBundle<D>>,
    pub responses: mpsc::UnboundedSender<AuthResponseBundle<R>>,
    pub justifications: mpsc::UnboundedSender<AuthJustificationBundle<J>>,
}

impl<D, R, J> Outgoing<D, R, J> {
    /// True once every receiver has been dropped
    pub fn is_closed(&self) -> bool {
        self.deals.is_closed() && self.responses.is_closed() && self.justifications.is_closed()
    }
}

/// Create a connected pair of inbound streams and their senders
pub fn incoming_channel<D, R, J>() -> (Outgoing<D, R, J>, Incoming<D, R, J>) {
    let (deal_tx, deal_rx) = mpsc::unbounded_channel();
    let (resp_tx, resp_rx) = mpsc::unbounded_channel();
    let (just_tx, just_rx) = mpsc::unbounded_channel();
    (
        Outgoing {
            deals: deal_tx,
            responses: resp_tx,
            justifications: just_tx,
        },
        Incoming {
            deals: deal_rx,
            responses: resp_rx,
            justifications: just_rx,
        },
    )
}

/// Push and receive primitives for the three envelope kinds
pub trait Board<D, R, J>: Send {
    fn push_deals(&self, bundle: AuthDealBundle<D>);

    fn push_responses(&self, bundle: AuthResponseBundle<R>);

    fn push_justifications(&self, bundle: AuthJustificationBundle<J>);

    /// Inbound streams for this participant
    fn incoming(&mut self) -> &mut Incoming<D, R, J>;
}
