//! In-process broadcast board
//!
//! Every [`HubBoard`] joined to a [`BroadcastHub`] receives every envelope
//! pushed by any member, its own included. Members that went away are pruned
//! on the next push.

use super::{incoming_channel, Board, Incoming, Outgoing};
use crate::bundle::{AuthDealBundle, AuthJustificationBundle, AuthResponseBundle};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Shared fan-out point for a set of local participants
pub struct BroadcastHub<D, R, J> {
    members: Arc<RwLock<Vec<Outgoing<D, R, J>>>>,
}

impl<D, R, J> Clone for BroadcastHub<D, R, J> {
    fn clone(&self) -> Self {
        Self {
            members: Arc::clone(&self.members),
        }
    }
}

impl<D, R, J> Default for BroadcastHub<D, R, J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, R, J> BroadcastHub<D, R, J> {
    pub fn new() -> Self {
        Self {
            members: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a new participant and return its board
    pub fn join(&self) -> HubBoard<D, R, J> {
        let (outgoing, incoming) = incoming_channel();
        self.write().push(outgoing);
        HubBoard {
            hub: self.clone(),
            incoming,
        }
    }

    /// Number of members still able to receive
    pub fn members(&self) -> usize {
        self.read().iter().filter(|m| !m.is_closed()).count()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Outgoing<D, R, J>>> {
        // A panic while holding the lock cannot leave the member list half
        // updated, so the poisoned guard is still usable.
        self.members
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Outgoing<D, R, J>>> {
        self.members
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Deliver to every member, dropping those whose receivers are gone
    fn broadcast<F>(&self, deliver: F)
    where
        F: Fn(&Outgoing<D, R, J>) -> bool,
    {
        let mut members = self.write();
        let before = members.len();
        members.retain(|member| deliver(member) || !member.is_closed());
        if members.len() != before {
            debug!("pruned {} departed board members", before - members.len());
        }
    }
}

/// One participant's view of a [`BroadcastHub`]
pub struct HubBoard<D, R, J> {
    hub: BroadcastHub<D, R, J>,
    incoming: Incoming<D, R, J>,
}

impl<D, R, J> HubBoard<D, R, J> {
    /// The hub this board is joined to. Cloning it lets more members join.
    pub fn hub(&self) -> &BroadcastHub<D, R, J> {
        &self.hub
    }
}

impl<D, R, J> Board<D, R, J> for HubBoard<D, R, J>
where
    D: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    J: Clone + Send + Sync + 'static,
{
    fn push_deals(&self, bundle: AuthDealBundle<D>) {
        self.hub
            .broadcast(|member| member.deals.send(bundle.clone()).is_ok());
    }

    fn push_responses(&self, bundle: AuthResponseBundle<R>) {
        self.hub
            .broadcast(|member| member.responses.send(bundle.clone()).is_ok());
    }

    fn push_justifications(&self, bundle: AuthJustificationBundle<J>) {
        self.hub
            .broadcast(|member| member.justifications.send(bundle.clone()).is_ok());
    }

    fn incoming(&mut self) -> &mut Incoming<D, R, J> {
        &mut self.incoming
    }
}
