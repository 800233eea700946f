//! Run configuration

use crate::auth::{NoAuth, Scheme};
use crate::engine::KeyGenerator;
use crate::error::ProtocolError;
use crate::roster::Roster;

/// Everything needed to start one protocol run
pub struct Config<G: KeyGenerator, S: Scheme = NoAuth> {
    /// Handed to [`KeyGenerator::new`]
    pub engine: G::Config,
    /// Current dealers; resolves deal and justification senders
    pub old_nodes: Roster<S::PublicKey>,
    /// Share holders after the run; resolves response senders. Defaults to
    /// `old_nodes` when absent.
    pub new_nodes: Option<Roster<S::PublicKey>>,
    /// Local long-term signing key
    pub longterm: S::PrivateKey,
    /// Scheme used to sign and verify envelopes. `None` disables
    /// authentication entirely.
    pub auth: Option<S>,
}

impl<G: KeyGenerator> Config<G, NoAuth> {
    /// Configuration without authentication
    pub fn unauthenticated(engine: G::Config) -> Self {
        Self {
            engine,
            old_nodes: Roster::empty(),
            new_nodes: None,
            longterm: (),
            auth: None,
        }
    }
}

impl<G: KeyGenerator, S: Scheme> Config<G, S> {
    pub(crate) fn validate(&self) -> Result<(), ProtocolError> {
        if S::ENABLED && self.auth.is_some() && self.old_nodes.is_empty() {
            return Err(ProtocolError::Config(
                "authentication is enabled but the old roster is empty".to_string(),
            ));
        }
        Ok(())
    }
}
