//! Error types for the DKG protocol orchestrator

use crate::bundle::{BundleKind, Index};
use crate::phase::Phase;

/// Boxed error produced by the key-generation engine.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a protocol run: exactly one of the engine output or an error.
pub type Outcome<T> = Result<T, ProtocolError>;

/// Errors that end a protocol run, or prevent one from starting.
#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    /// The key-generation engine could not be constructed
    #[error("engine setup failed: {0}")]
    Setup(#[source] BoxError),

    /// The run configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// The engine rejected a batch or failed to produce a bundle
    #[error("engine failed during {phase} phase: {source}")]
    Engine {
        phase: Phase,
        #[source]
        source: BoxError,
    },

    /// Signing an outbound bundle failed
    #[error("failed to sign outbound {kind} bundle: {source}")]
    Signing {
        kind: BundleKind,
        #[source]
        source: AuthError,
    },

    /// The phase schedule emitted a phase other than the expected successor
    #[error("received {got} phase while expecting {expected}")]
    PhaseOutOfOrder { expected: Phase, got: Phase },

    /// The phase schedule went away before the finish phase
    #[error("phase schedule closed before the finish phase")]
    PhaserClosed,

    #[error("protocol run was cancelled")]
    Cancelled,

    #[error("protocol run timed out")]
    TimedOut,

    /// The run task ended without delivering an outcome
    #[error("protocol task ended without an outcome")]
    Aborted,
}

impl ProtocolError {
    pub(crate) fn engine<E>(phase: Phase, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ProtocolError::Engine {
            phase,
            source: Box::new(err),
        }
    }
}

/// Authentication failures, for both inbound verification and outbound signing
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no {kind} sender with index {index} in roster")]
    UnknownSender { kind: BundleKind, index: Index },

    #[error("signature does not match")]
    InvalidSignature,

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("hash to curve failed: {0}")]
    HashToCurve(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all for custom signature schemes
    #[error("signature scheme error: {0}")]
    Scheme(String),
}

/// Errors raised while building a roster
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("duplicate participant index {0}")]
    DuplicateIndex(Index),
}
