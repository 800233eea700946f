//! Bundles and the authenticated envelopes carried over the board

use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant index inside a roster
pub type Index = u32;

/// Payload produced and consumed by the key-generation engine.
pub trait Bundle: Clone + Send + 'static {
    /// Deterministic digest of the bundle content. This is what gets signed.
    fn digest(&self) -> Vec<u8>;

    /// Dealer index for deals and justifications, share index for responses
    fn sender_index(&self) -> Index;
}

/// The three kinds of bundle exchanged during a run
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleKind {
    Deal,
    Response,
    Justification,
}

/// Which roster resolves the sender of a bundle kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterSide {
    /// Current dealers, indexed by dealer index
    Old,
    /// Share holders, indexed by share index
    New,
}

impl BundleKind {
    pub fn roster_side(self) -> RosterSide {
        match self {
            BundleKind::Deal | BundleKind::Justification => RosterSide::Old,
            BundleKind::Response => RosterSide::New,
        }
    }
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BundleKind::Deal => "deal",
            BundleKind::Response => "response",
            BundleKind::Justification => "justification",
        };
        f.write_str(name)
    }
}

/// A bundle with its detached signature.
///
/// The signature is empty when the run has no authentication scheme.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Authenticated<B> {
    pub bundle: B,
    pub signature: Vec<u8>,
}

impl<B> Authenticated<B> {
    /// Wrap a bundle without a signature
    pub fn unsigned(bundle: B) -> Self {
        Self {
            bundle,
            signature: Vec::new(),
        }
    }
}

pub type AuthDealBundle<D> = Authenticated<D>;
pub type AuthResponseBundle<R> = Authenticated<R>;
pub type AuthJustificationBundle<J> = Authenticated<J>;

/// Closed union over the three envelope kinds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Envelope<D, R, J> {
    Deal(AuthDealBundle<D>),
    Response(AuthResponseBundle<R>),
    Justification(AuthJustificationBundle<J>),
}

impl<D: Bundle, R: Bundle, J: Bundle> Envelope<D, R, J> {
    pub fn kind(&self) -> BundleKind {
        match self {
            Envelope::Deal(_) => BundleKind::Deal,
            Envelope::Response(_) => BundleKind::Response,
            Envelope::Justification(_) => BundleKind::Justification,
        }
    }

    pub fn sender_index(&self) -> Index {
        match self {
            Envelope::Deal(auth) => auth.bundle.sender_index(),
            Envelope::Response(auth) => auth.bundle.sender_index(),
            Envelope::Justification(auth) => auth.bundle.sender_index(),
        }
    }

    pub fn digest(&self) -> Vec<u8> {
        match self {
            Envelope::Deal(auth) => auth.bundle.digest(),
            Envelope::Response(auth) => auth.bundle.digest(),
            Envelope::Justification(auth) => auth.bundle.digest(),
        }
    }

    pub fn signature(&self) -> &[u8] {
        match self {
            Envelope::Deal(auth) => &auth.signature,
            Envelope::Response(auth) => &auth.signature,
            Envelope::Justification(auth) => &auth.signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Tagged(Index);

    impl Bundle for Tagged {
        fn digest(&self) -> Vec<u8> {
            self.0.to_le_bytes().to_vec()
        }

        fn sender_index(&self) -> Index {
            self.0
        }
    }

    type TestEnvelope = Envelope<Tagged, Tagged, Tagged>;

    #[test]
    fn test_roster_side_per_kind() {
        assert_eq!(BundleKind::Deal.roster_side(), RosterSide::Old);
        assert_eq!(BundleKind::Justification.roster_side(), RosterSide::Old);
        assert_eq!(BundleKind::Response.roster_side(), RosterSide::New);
    }

    #[test]
    fn test_envelope_accessors() {
        let env: TestEnvelope = Envelope::Response(Authenticated {
            bundle: Tagged(7),
            signature: vec![1, 2, 3],
        });
        assert_eq!(env.kind(), BundleKind::Response);
        assert_eq!(env.sender_index(), 7);
        assert_eq!(env.digest(), 7u32.to_le_bytes().to_vec());
        assert_eq!(env.signature(), &[1, 2, 3]);
    }

    #[test]
    fn test_unsigned_has_empty_signature() {
        let env: TestEnvelope = Envelope::Deal(Authenticated::unsigned(Tagged(1)));
        assert!(env.signature().is_empty());
    }
}
