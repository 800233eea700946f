//! Contract for the key-generation engine driven by the orchestrator
//!
//! The engine holds all of the secret-sharing state: polynomial commitments,
//! share verification and reconstruction. The orchestrator only decides
//! *when* each step runs and *which* authenticated bundles it sees.

use crate::bundle::Bundle;

/// Result of handing the response batch to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome<O, J> {
    /// Every deal was accepted; the run is complete
    Finished(O),
    /// Complaints remain. Broadcast the justification, if this node has one,
    /// and wait for the finish phase.
    Justify(Option<J>),
}

/// Stateful core of a distributed key generation.
pub trait KeyGenerator: Send + Sized + 'static {
    type Config;
    type Deal: Bundle;
    type Response: Bundle;
    type Justification: Bundle;
    /// Group public key material plus the local share
    type Output: Send + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    fn new(config: Self::Config) -> Result<Self, Self::Error>;

    /// Whether this node deals. Fixed for the lifetime of the engine.
    fn can_issue(&self) -> bool;

    /// This node's deal bundle. Called at most once, and only if
    /// [`can_issue`](Self::can_issue) holds.
    fn deals(&mut self) -> Result<Self::Deal, Self::Error>;

    /// Process the deals received so far. `None` means nothing to send.
    fn process_deals(
        &mut self,
        deals: Vec<Self::Deal>,
    ) -> Result<Option<Self::Response>, Self::Error>;

    fn process_responses(
        &mut self,
        responses: Vec<Self::Response>,
    ) -> Result<ResponseOutcome<Self::Output, Self::Justification>, Self::Error>;

    fn process_justifications(
        &mut self,
        justifications: Vec<Self::Justification>,
    ) -> Result<Self::Output, Self::Error>;
}
