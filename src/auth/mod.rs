//! Authentication of board envelopes
//!
//! Every inbound envelope goes through [`Authenticator::verify`] before its
//! bundle reaches a buffer, and every outbound bundle through
//! [`Authenticator::sign`]. The gate is the only place that knows whether a
//! signature scheme is configured: with none (or [`NoAuth`]), verification
//! always passes and outbound envelopes carry an empty signature.

pub mod bls;

pub use bls::{BlsPrivateKey, BlsPublicKey, BlsScheme};

use crate::bundle::{Authenticated, Bundle, Envelope, RosterSide};
use crate::error::AuthError;
use crate::roster::Roster;

/// Signature scheme used to authenticate bundles
pub trait Scheme: Send + Sync + 'static {
    type PrivateKey: Send + Sync;
    type PublicKey: Send + Sync;

    /// `false` only for the null scheme. A disabled scheme is never asked
    /// to sign and its verification is skipped.
    const ENABLED: bool = true;

    fn sign(&self, private: &Self::PrivateKey, message: &[u8]) -> Result<Vec<u8>, AuthError>;

    fn verify(
        &self,
        public: &Self::PublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), AuthError>;
}

/// Null scheme for trusted transports and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl Scheme for NoAuth {
    type PrivateKey = ();
    type PublicKey = ();

    const ENABLED: bool = false;

    fn sign(&self, _private: &(), _message: &[u8]) -> Result<Vec<u8>, AuthError> {
        Ok(Vec::new())
    }

    fn verify(&self, _public: &(), _message: &[u8], _signature: &[u8]) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Signs outbound bundles and verifies inbound envelopes against the rosters
pub struct Authenticator<S: Scheme> {
    scheme: Option<S>,
    longterm: S::PrivateKey,
    old_nodes: Roster<S::PublicKey>,
    new_nodes: Option<Roster<S::PublicKey>>,
}

impl<S: Scheme> Authenticator<S> {
    /// `new_nodes` defaults to `old_nodes` when absent (no resharing)
    pub fn new(
        scheme: Option<S>,
        longterm: S::PrivateKey,
        old_nodes: Roster<S::PublicKey>,
        new_nodes: Option<Roster<S::PublicKey>>,
    ) -> Self {
        Self {
            scheme,
            longterm,
            old_nodes,
            new_nodes,
        }
    }

    pub fn is_enabled(&self) -> bool {
        S::ENABLED && self.scheme.is_some()
    }

    pub fn roster(&self, side: RosterSide) -> &Roster<S::PublicKey> {
        match side {
            RosterSide::Old => &self.old_nodes,
            RosterSide::New => self.new_nodes.as_ref().unwrap_or(&self.old_nodes),
        }
    }

    /// Check the envelope signature against the sender's roster entry.
    ///
    /// Deals and justifications are looked up by dealer index in the old
    /// roster, responses by share index in the new one.
    pub fn verify<D, R, J>(&self, envelope: &Envelope<D, R, J>) -> Result<(), AuthError>
    where
        D: Bundle,
        R: Bundle,
        J: Bundle,
    {
        let scheme = match &self.scheme {
            Some(scheme) if S::ENABLED => scheme,
            _ => return Ok(()),
        };

        let kind = envelope.kind();
        let index = envelope.sender_index();
        let public = self
            .roster(kind.roster_side())
            .find(index)
            .ok_or(AuthError::UnknownSender { kind, index })?;

        scheme.verify(public, &envelope.digest(), envelope.signature())
    }

    /// Wrap an outbound bundle, signing its digest when a scheme is configured
    pub fn sign<B: Bundle>(&self, bundle: B) -> Result<Authenticated<B>, AuthError> {
        match &self.scheme {
            Some(scheme) if S::ENABLED => {
                let signature = scheme.sign(&self.longterm, &bundle.digest())?;
                Ok(Authenticated { bundle, signature })
            }
            _ => Ok(Authenticated::unsigned(bundle)),
        }
    }
}

impl Authenticator<NoAuth> {
    /// Gate that accepts everything and signs nothing
    pub fn disabled() -> Self {
        Self::new(None, (), Roster::empty(), None)
    }
}
