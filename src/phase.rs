//! Phase schedule for a DKG run
//!
//! A run moves through four phases, each emitted exactly once and in order:
//! Deal, Response, Justification, Finish. The orchestrator never decides when
//! to advance; it reacts to whatever the [`Phaser`] emits. Two policies are
//! provided:
//!
//! - [`TimePhaser`]: sleeps a fixed period between phases
//! - [`ManualPhaser`]: advances when an external driver calls
//!   [`PhaseTrigger::advance`]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Capacity of every phase channel. Large enough that an emitter can push all
/// four phases without a reader.
pub const PHASE_CHANNEL_CAPACITY: usize = 4;

/// Phases of a DKG run, in protocol order
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Deal,
    Response,
    Justification,
    Finish,
}

impl Phase {
    /// All phases in emission order
    pub const ALL: [Phase; 4] = [
        Phase::Deal,
        Phase::Response,
        Phase::Justification,
        Phase::Finish,
    ];

    /// The phase that follows this one, if any
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Deal => Some(Phase::Response),
            Phase::Response => Some(Phase::Justification),
            Phase::Justification => Some(Phase::Finish),
            Phase::Finish => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Deal => "deal",
            Phase::Response => "response",
            Phase::Justification => "justification",
            Phase::Finish => "finish",
        };
        f.write_str(name)
    }
}

/// Source of phase signals consumed by the orchestrator.
///
/// Implementations must emit [`Phase::ALL`] once each, in order, on a channel
/// buffered deeply enough that emission never blocks on a reader that has
/// already stopped.
///
/// The orchestrator gives phase signals no priority over inbound envelopes.
/// If several phases are already queued when a run starts, envelopes waiting
/// on the board at that moment may be read only after their batch was handed
/// over, and are then dropped as late. Callers that need such traffic
/// delivered must not emit a phase before the previous one has been handled.
pub trait Phaser: Send {
    fn next_phase(&mut self) -> &mut mpsc::Receiver<Phase>;
}

type SleepFn = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Fixed-delay phase schedule: emit, sleep, emit, ...
pub struct TimePhaser {
    out: Option<mpsc::Sender<Phase>>,
    phases: mpsc::Receiver<Phase>,
    sleep: SleepFn,
}

impl TimePhaser {
    /// Sleep `period` between consecutive phases
    pub fn new(period: Duration) -> Self {
        Self::with_sleep(move || tokio::time::sleep(period))
    }

    /// Use a custom async sleep between phases. A sleep that completes
    /// immediately gives a no-delay schedule, which may queue every phase
    /// before the orchestrator reads any inbound traffic (see [`Phaser`]).
    pub fn with_sleep<F, Fut>(sleep: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (out, phases) = mpsc::channel(PHASE_CHANNEL_CAPACITY);
        Self {
            out: Some(out),
            phases,
            sleep: Arc::new(move || -> Pin<Box<dyn Future<Output = ()> + Send>> {
                Box::pin(sleep())
            }),
        }
    }

    /// Spawn the emission task. Only the first call emits anything.
    pub fn start(&mut self) -> JoinHandle<()> {
        let out = self.out.take();
        let sleep = Arc::clone(&self.sleep);
        tokio::spawn(async move {
            if let Some(out) = out {
                emit_schedule(out, sleep).await;
            }
        })
    }
}

impl Phaser for TimePhaser {
    fn next_phase(&mut self) -> &mut mpsc::Receiver<Phase> {
        &mut self.phases
    }
}

async fn emit_schedule(out: mpsc::Sender<Phase>, sleep: SleepFn) {
    for (i, phase) in Phase::ALL.into_iter().enumerate() {
        if i > 0 {
            sleep().await;
        }
        if out.send(phase).await.is_err() {
            debug!("phase receiver gone, stopping schedule at {phase}");
            return;
        }
        debug!("emitted {phase} phase");
    }
}

/// Phase schedule driven by an external [`PhaseTrigger`].
pub struct ManualPhaser {
    phases: mpsc::Receiver<Phase>,
}

/// Handle that advances a [`ManualPhaser`] one phase at a time.
pub struct PhaseTrigger {
    out: mpsc::Sender<Phase>,
    last: Option<Phase>,
}

impl ManualPhaser {
    pub fn new() -> (Self, PhaseTrigger) {
        let (out, phases) = mpsc::channel(PHASE_CHANNEL_CAPACITY);
        (Self { phases }, PhaseTrigger { out, last: None })
    }
}

impl Phaser for ManualPhaser {
    fn next_phase(&mut self) -> &mut mpsc::Receiver<Phase> {
        &mut self.phases
    }
}

impl PhaseTrigger {
    /// Emit the next phase. Returns `None` once Finish has been emitted.
    ///
    /// Never blocks: the channel holds all four phases.
    pub fn advance(&mut self) -> Option<Phase> {
        let phase = match self.last {
            None => Phase::Deal,
            Some(last) => last.next()?,
        };
        self.last = Some(phase);
        // A dropped orchestrator is not an error for the schedule.
        let _ = self.out.try_send(phase);
        Some(phase)
    }

    /// The most recently emitted phase
    pub fn current(&self) -> Option<Phase> {
        self.last
    }
}
