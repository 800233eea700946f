//! Phase-driven orchestrator for one DKG run.
//!
//! A single task owns the run. It waits on four sources at once: the phase
//! schedule and the three inbound envelope streams. Inbound envelopes are
//! authenticated and buffered as they arrive. Each phase signal hands the
//! buffered batch to the engine and broadcasts whatever it returns:
//!
//! ```text
//!  Deal           -> engine.deals()                   -> push deal
//!  Response       -> engine.process_deals(deals)      -> push response?
//!  Justification  -> engine.process_responses(resps)  -> push justification? | done
//!  Finish         -> engine.process_justifications(j) -> done
//! ```
//!
//! Phases never wait for a batch to be complete; missing peers are the
//! engine's problem. The run ends at Finish, on the first fatal engine or
//! signing error, or when cancelled, and delivers exactly one [`Outcome`].

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::auth::{Authenticator, Scheme};
use crate::board::Board;
use crate::bundle::{Authenticated, Bundle, BundleKind, Envelope};
use crate::config::Config;
use crate::engine::{KeyGenerator, ResponseOutcome};
use crate::error::{Outcome, ProtocolError};
use crate::events::{Event, Observer};
use crate::phase::{Phase, Phaser};

/// One participant's run of the protocol
pub struct Protocol<G, S, B, P>
where
    G: KeyGenerator,
    S: Scheme,
{
    board: B,
    phaser: P,
    session: Session<G, S>,
    timeout: Option<Duration>,
}

/// Engine and authentication state touched by the phase handlers
struct Session<G: KeyGenerator, S: Scheme> {
    dkg: G,
    auth: Authenticator<S>,
    can_issue: bool,
    observer: Option<Arc<dyn Observer>>,
}

/// Bundles collected for each phase. A slot becomes `None` once its batch
/// has been handed to the engine.
struct Batches<D, R, J> {
    deals: Option<Vec<D>>,
    responses: Option<Vec<R>>,
    justifications: Option<Vec<J>>,
}

impl<D, R, J> Batches<D, R, J> {
    fn new() -> Self {
        Self {
            deals: Some(Vec::new()),
            responses: Some(Vec::new()),
            justifications: Some(Vec::new()),
        }
    }

    fn is_open(&self, kind: BundleKind) -> bool {
        match kind {
            BundleKind::Deal => self.deals.is_some(),
            BundleKind::Response => self.responses.is_some(),
            BundleKind::Justification => self.justifications.is_some(),
        }
    }

    /// Append to the matching batch. Returns false if it was already handed over.
    fn accept(&mut self, envelope: Envelope<D, R, J>) -> bool {
        fn push<T>(slot: &mut Option<Vec<T>>, item: T) -> bool {
            match slot {
                Some(batch) => {
                    batch.push(item);
                    true
                }
                None => false,
            }
        }

        match envelope {
            Envelope::Deal(auth) => push(&mut self.deals, auth.bundle),
            Envelope::Response(auth) => push(&mut self.responses, auth.bundle),
            Envelope::Justification(auth) => push(&mut self.justifications, auth.bundle),
        }
    }
}

/// Which inbound streams can still produce envelopes
struct OpenStreams {
    deals: bool,
    responses: bool,
    justifications: bool,
}

impl<G, S, B, P> Protocol<G, S, B, P>
where
    G: KeyGenerator,
    S: Scheme,
    B: Board<G::Deal, G::Response, G::Justification>,
    P: Phaser,
{
    /// Build the engine and the authentication gate. Engine construction
    /// errors surface here, before any phase runs.
    pub fn new(config: Config<G, S>, board: B, phaser: P) -> Result<Self, ProtocolError> {
        config.validate()?;
        let Config {
            engine,
            old_nodes,
            new_nodes,
            longterm,
            auth,
        } = config;

        let dkg = G::new(engine).map_err(|e| ProtocolError::Setup(Box::new(e)))?;
        let can_issue = dkg.can_issue();

        Ok(Self {
            board,
            phaser,
            session: Session {
                dkg,
                auth: Authenticator::new(auth, longterm, old_nodes, new_nodes),
                can_issue,
                observer: None,
            },
            timeout: None,
        })
    }

    /// Subscribe to progress events
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.session.observer = Some(Arc::new(observer));
        self
    }

    /// End the run with [`ProtocolError::TimedOut`] if it has not finished
    /// within `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether this node deals, as reported by the engine at construction
    pub fn can_issue(&self) -> bool {
        self.session.can_issue
    }

    /// Drive the run to completion on the current task
    pub async fn run(self) -> Outcome<G::Output> {
        self.drive(std::future::pending()).await
    }

    /// Spawn the run on the tokio runtime
    pub fn start(self) -> ProtocolHandle<G::Output>
    where
        B: 'static,
        P: 'static,
    {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            // Resolves on an explicit cancel and when the handle is dropped.
            let cancelled = async move {
                let _ = cancel_rx.await;
            };
            let outcome = self.drive(cancelled).await;
            let _ = outcome_tx.send(outcome);
        });

        ProtocolHandle {
            outcome: outcome_rx,
            cancel: Some(cancel_tx),
            task,
        }
    }

    async fn drive<C>(self, cancel: C) -> Outcome<G::Output>
    where
        C: Future<Output = ()>,
    {
        let Protocol {
            mut board,
            mut phaser,
            mut session,
            timeout,
        } = self;

        let deadline = async move {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(cancel);
        tokio::pin!(deadline);

        let mut batches = Batches::new();
        let mut expected = Phase::Deal;
        let mut open = OpenStreams {
            deals: true,
            responses: true,
            justifications: true,
        };

        let outcome = loop {
            let incoming = board.incoming();
            tokio::select! {
                phase = phaser.next_phase().recv() => {
                    let Some(phase) = phase else {
                        break Err(ProtocolError::PhaserClosed);
                    };
                    if phase != expected {
                        warn!("phase {phase} arrived while expecting {expected}");
                        break Err(ProtocolError::PhaseOutOfOrder { expected, got: phase });
                    }
                    let step = session.on_phase(phase, &board, &mut batches);
                    if let ControlFlow::Break(outcome) = step {
                        break outcome;
                    }
                    // Finish always breaks, so a successor exists here.
                    expected = phase.next().unwrap_or(Phase::Finish);
                }
                deal = incoming.deals.recv(), if open.deals => match deal {
                    Some(deal) => session.on_envelope(Envelope::Deal(deal), &mut batches),
                    None => open.deals = false,
                },
                resp = incoming.responses.recv(), if open.responses => match resp {
                    Some(resp) => session.on_envelope(Envelope::Response(resp), &mut batches),
                    None => open.responses = false,
                },
                just = incoming.justifications.recv(), if open.justifications => match just {
                    Some(just) => session.on_envelope(Envelope::Justification(just), &mut batches),
                    None => open.justifications = false,
                },
                _ = &mut cancel => break Err(ProtocolError::Cancelled),
                _ = &mut deadline => break Err(ProtocolError::TimedOut),
            }
        };

        match &outcome {
            Ok(_) => info!("protocol run finished"),
            Err(e) => error!("protocol run failed: {e}"),
        }
        session.emit(Event::Finished {
            success: outcome.is_ok(),
        });
        outcome
    }
}

impl<G: KeyGenerator, S: Scheme> Session<G, S> {
    fn emit(&self, event: Event) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }

    fn on_phase<B>(
        &mut self,
        phase: Phase,
        board: &B,
        batches: &mut Batches<G::Deal, G::Response, G::Justification>,
    ) -> ControlFlow<Outcome<G::Output>>
    where
        B: Board<G::Deal, G::Response, G::Justification>,
    {
        info!("entering {phase} phase");
        self.emit(Event::PhaseStarted(phase));

        let step = match phase {
            Phase::Deal => self.send_deals(board).map(|()| None),
            Phase::Response => {
                let deals = batches.deals.take().unwrap_or_default();
                self.send_responses(board, deals).map(|()| None)
            }
            Phase::Justification => {
                let responses = batches.responses.take().unwrap_or_default();
                self.send_justifications(board, responses)
            }
            Phase::Finish => {
                let justifications = batches.justifications.take().unwrap_or_default();
                debug!("finalizing with {} justifications", justifications.len());
                let result = self
                    .dkg
                    .process_justifications(justifications)
                    .map_err(|e| ProtocolError::engine(Phase::Finish, e));
                return ControlFlow::Break(result);
            }
        };

        match step {
            Ok(None) => ControlFlow::Continue(()),
            Ok(Some(output)) => ControlFlow::Break(Ok(output)),
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    fn on_envelope(
        &mut self,
        envelope: Envelope<G::Deal, G::Response, G::Justification>,
        batches: &mut Batches<G::Deal, G::Response, G::Justification>,
    ) {
        let kind = envelope.kind();
        let sender = envelope.sender_index();

        if !batches.is_open(kind) {
            debug!("ignoring late {kind} from {sender}");
            self.emit(Event::Late { kind, sender });
            return;
        }

        if let Err(e) = self.auth.verify(&envelope) {
            warn!("dropping {kind} from {sender}: {e}");
            self.emit(Event::Dropped {
                kind,
                sender,
                reason: e.to_string(),
            });
            return;
        }

        batches.accept(envelope);
        debug!("buffered {kind} from {sender}");
        self.emit(Event::Accepted { kind, sender });
    }

    fn send_deals<B>(&mut self, board: &B) -> Result<(), ProtocolError>
    where
        B: Board<G::Deal, G::Response, G::Justification>,
    {
        if !self.can_issue {
            debug!("not a dealer in this run, no deal to send");
            return Ok(());
        }

        let bundle = self
            .dkg
            .deals()
            .map_err(|e| ProtocolError::engine(Phase::Deal, e))?;
        let auth = self.sign(BundleKind::Deal, bundle)?;
        self.sent(BundleKind::Deal, &auth);
        board.push_deals(auth);
        Ok(())
    }

    fn send_responses<B>(&mut self, board: &B, deals: Vec<G::Deal>) -> Result<(), ProtocolError>
    where
        B: Board<G::Deal, G::Response, G::Justification>,
    {
        debug!("processing {} deals", deals.len());
        let response = self
            .dkg
            .process_deals(deals)
            .map_err(|e| ProtocolError::engine(Phase::Response, e))?;

        match response {
            Some(bundle) => {
                let auth = self.sign(BundleKind::Response, bundle)?;
                self.sent(BundleKind::Response, &auth);
                board.push_responses(auth);
            }
            None => self.emit(Event::NothingToSend(Phase::Response)),
        }
        Ok(())
    }

    /// `Ok(Some(_))` means the engine finished without needing justifications
    fn send_justifications<B>(
        &mut self,
        board: &B,
        responses: Vec<G::Response>,
    ) -> Result<Option<G::Output>, ProtocolError>
    where
        B: Board<G::Deal, G::Response, G::Justification>,
    {
        debug!("processing {} responses", responses.len());
        let outcome = self
            .dkg
            .process_responses(responses)
            .map_err(|e| ProtocolError::engine(Phase::Justification, e))?;

        match outcome {
            ResponseOutcome::Finished(output) => {
                info!("all deals certified, skipping justifications");
                Ok(Some(output))
            }
            ResponseOutcome::Justify(Some(bundle)) => {
                let auth = self.sign(BundleKind::Justification, bundle)?;
                self.sent(BundleKind::Justification, &auth);
                board.push_justifications(auth);
                Ok(None)
            }
            ResponseOutcome::Justify(None) => {
                self.emit(Event::NothingToSend(Phase::Justification));
                Ok(None)
            }
        }
    }

    fn sign<T: Bundle>(
        &self,
        kind: BundleKind,
        bundle: T,
    ) -> Result<Authenticated<T>, ProtocolError> {
        self.auth
            .sign(bundle)
            .map_err(|source| ProtocolError::Signing { kind, source })
    }

    fn sent<T: Bundle>(&self, kind: BundleKind, auth: &Authenticated<T>) {
        let digest = hex::encode(auth.bundle.digest());
        debug!("pushing {kind} bundle {digest}");
        self.emit(Event::Sent { kind, digest });
    }
}

/// Handle to a run spawned with [`Protocol::start`].
///
/// Dropping the handle cancels the run.
pub struct ProtocolHandle<T> {
    outcome: oneshot::Receiver<Outcome<T>>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl<T> ProtocolHandle<T> {
    /// Ask the run to stop. It ends with [`ProtocolError::Cancelled`] unless
    /// it already finished.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// True once the run task has exited and its outcome is ready
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the single outcome of the run
    pub async fn wait_end(self) -> Outcome<T> {
        let ProtocolHandle {
            outcome,
            cancel: _cancel,
            ..
        } = self;
        outcome.await.unwrap_or_else(|_| Err(ProtocolError::Aborted))
    }
}
