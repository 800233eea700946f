//! DKG Protocol Orchestrator
//!
//! This library drives one participant through a phase-based distributed key
//! generation (or resharing) run. It does not implement the secret-sharing
//! mathematics itself: that lives behind the [`KeyGenerator`] trait. The
//! orchestrator decides when each engine step runs, which authenticated
//! bundles it sees, and what gets broadcast.
//!
//! ## Overview
//!
//! A run is paced by a [`Phaser`] emitting Deal, Response, Justification and
//! Finish. Bundles travel over a [`Board`] wrapped in [`Authenticated`]
//! envelopes. Inbound envelopes are checked against the node rosters before
//! they are buffered; outbound bundles are signed with the node's long-term
//! key.
//!
//! ## Key Components
//!
//! - **Phases**: [`TimePhaser`] (fixed period) and [`ManualPhaser`] (external trigger)
//! - **Authentication**: [`Authenticator`] gate over a [`Scheme`], with BLS over BLS12-381
//! - **Board**: in-process fan-out via [`BroadcastHub`]
//! - **Orchestrator**: [`Protocol`], run inline or spawned behind a [`ProtocolHandle`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use dkg_protocol::{
//!     BlsScheme, BroadcastHub, Config, KeyGenerator, Node, Protocol, Roster, TimePhaser,
//! };
//!
//! # async fn run<G: KeyGenerator>(engine: G::Config) -> Result<(), Box<dyn std::error::Error>>
//! # where
//! #     G::Deal: Sync,
//! #     G::Response: Sync,
//! #     G::Justification: Sync,
//! # {
//! let (longterm, public) = BlsScheme::keypair_from_seed(b"node-0");
//! let roster = Roster::new(vec![Node::new(0, public)])?;
//!
//! let config = Config::<G, BlsScheme> {
//!     engine,
//!     old_nodes: roster,
//!     new_nodes: None,
//!     longterm,
//!     auth: Some(BlsScheme::default()),
//! };
//!
//! let hub = BroadcastHub::<G::Deal, G::Response, G::Justification>::new();
//! let mut phaser = TimePhaser::new(Duration::from_secs(10));
//! phaser.start();
//!
//! let output = Protocol::new(config, hub.join(), phaser)?.run().await?;
//! # let _ = output;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod board;
pub mod bundle;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod phase;
pub mod protocol;
pub mod roster;
pub mod security;

pub use auth::{Authenticator, BlsPrivateKey, BlsPublicKey, BlsScheme, NoAuth, Scheme};
pub use board::{Board, BroadcastHub, HubBoard, Incoming};
pub use bundle::{
    AuthDealBundle, AuthJustificationBundle, AuthResponseBundle, Authenticated, Bundle, BundleKind,
    Envelope, Index,
};
pub use config::Config;
pub use engine::{KeyGenerator, ResponseOutcome};
pub use error::{AuthError, Outcome, ProtocolError, RosterError};
pub use events::{Event, Observer};
pub use phase::{ManualPhaser, Phase, PhaseTrigger, Phaser, TimePhaser};
pub use protocol::{Protocol, ProtocolHandle};
pub use roster::{Node, Roster};
