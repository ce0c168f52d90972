//! The wake-and-poll state machine.
//!
//! One session per trigger: start the machine once, check readiness
//! immediately, then poll on a fixed cadence until the machine is ready or
//! the session is cancelled or times out. Progress flows to the [`Notifier`];
//! only start failures are surfaced to the requester verbatim, because a
//! failed start is the one condition with no path to eventual success.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::registry::SessionRegistry;
use super::remarks::pick_patience_remark;
use crate::machines::{ControlPlaneError, MachinesApi};
use crate::notifier::Notifier;
use crate::readiness::{evaluate, Verdict, WaitReason};

/// Poll on which the single patience remark is posted. The immediate first
/// check counts as poll 1, so this fires on the fifth timed iteration.
pub const PATIENCE_POLL: u32 = 6;

const PROGRESS_CHECKING: &str = "🪄 The wake call went through! The machine is stirring. \
     Peeking at its health checks now...";
const SUCCESS: &str =
    "🎉 The machine is awake and every check is green. Ready when you are!";
const ABANDON_MAX_WAIT: &str = "🕰️ I have waited as long as I am allowed and the machine \
     still is not ready. Giving up on this attempt; try again later?";
const DUPLICATE_SESSION: &str = "⚠️ A wake for this machine is already in progress. \
     Hang tight, no need to start another.";

fn start_failure_text(err: &ControlPlaneError) -> String {
    format!("😿 The wake call did not go through: {err}\n\nMight be worth trying again in a minute.")
}

/// Cadence and bound for the poll loop.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Delay between status queries.
    pub interval: Duration,
    /// Give up after this much total wall time. `None` polls until ready or
    /// cancelled, which is the default: waking infrastructure may
    /// legitimately take several minutes, and a false "give up" is worse
    /// than a long wait.
    pub max_wait: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_wait: None,
        }
    }
}

/// What the trigger knew about its requester.
#[derive(Debug, Clone, Default)]
pub struct WakeRequest {
    /// Addressable mention for the requester, already formatted by the
    /// front end (`<@id>` on Discord, a plain name on a terminal).
    pub requester: Option<String>,
}

/// Phase of one wake session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakePhase {
    Acknowledged,
    Starting,
    AwaitingFirstCheck,
    Polling,
    Succeeded,
    Failed,
    Abandoned,
}

/// Mutable state of one orchestration run. Owned exclusively by the session
/// task and discarded when the loop exits.
#[derive(Debug)]
pub struct WakeSession {
    pub machine_id: String,
    pub started_at: Instant,
    pub polls: u32,
    pub phase: WakePhase,
}

impl WakeSession {
    fn new(machine_id: String) -> Self {
        Self {
            machine_id,
            started_at: Instant::now(),
            polls: 0,
            phase: WakePhase::Acknowledged,
        }
    }
}

/// Terminal result of a session.
#[derive(Debug)]
pub enum WakeOutcome {
    /// The machine reported ready after `polls` status queries.
    Succeeded { polls: u32 },
    /// The start call failed; no status query was ever issued.
    Failed(ControlPlaneError),
    /// Cancelled, or the configured maximum wait elapsed.
    Abandoned,
    /// Another session for the same machine was already in flight.
    Rejected,
}

/// Drives one wake session from trigger to terminal phase.
pub struct WakeOrchestrator {
    client: Arc<dyn MachinesApi>,
    notifier: Arc<dyn Notifier>,
    registry: Arc<SessionRegistry>,
    machine_id: String,
    settings: PollSettings,
}

impl WakeOrchestrator {
    pub fn new(
        client: Arc<dyn MachinesApi>,
        notifier: Arc<dyn Notifier>,
        registry: Arc<SessionRegistry>,
        machine_id: String,
        settings: PollSettings,
    ) -> Self {
        Self {
            client,
            notifier,
            registry,
            machine_id,
            settings,
        }
    }

    /// Launch the session as an independent task. The trigger handler's own
    /// response path must never wait on the wake, so this is the expected
    /// entry point; `run` is public for callers that manage their own tasks.
    pub fn spawn(
        self,
        request: WakeRequest,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<WakeOutcome> {
        tokio::spawn(async move { self.run(request, cancel).await })
    }

    pub async fn run(self, request: WakeRequest, cancel: CancellationToken) -> WakeOutcome {
        let mut session = WakeSession::new(self.machine_id.clone());

        let Some(_claim) = self.registry.claim(&session.machine_id) else {
            info!(machine_id = %session.machine_id, "duplicate wake trigger rejected");
            self.notify_update(DUPLICATE_SESSION).await;
            return WakeOutcome::Rejected;
        };

        // Starting: exactly one attempt, never retried. A machine that fails
        // to start has no path to eventual success, so the error goes to the
        // requester verbatim.
        session.phase = WakePhase::Starting;
        let started = tokio::select! {
            () = cancel.cancelled() => return self.abandon(&mut session, None).await,
            result = self.client.start() => result,
        };
        if let Err(err) = started {
            error!(machine_id = %session.machine_id, error = %err, "machine start failed");
            self.notify_update(&start_failure_text(&err)).await;
            session.phase = WakePhase::Failed;
            return WakeOutcome::Failed(err);
        }
        self.notify_update(PROGRESS_CHECKING).await;

        // First check happens immediately so a warm machine reports success
        // without an artificial interval wait.
        session.phase = WakePhase::AwaitingFirstCheck;
        session.polls = 1;
        let verdict = tokio::select! {
            () = cancel.cancelled() => return self.abandon(&mut session, None).await,
            verdict = self.poll_once(&session) => verdict,
        };
        if verdict == Verdict::Ready {
            info!(machine_id = %session.machine_id, polls = session.polls, "machine ready on first check");
            self.notify_update(SUCCESS).await;
            session.phase = WakePhase::Succeeded;
            return WakeOutcome::Succeeded {
                polls: session.polls,
            };
        }

        session.phase = WakePhase::Polling;
        loop {
            tokio::select! {
                () = cancel.cancelled() => return self.abandon(&mut session, None).await,
                () = tokio::time::sleep(self.settings.interval) => {}
            }

            if let Some(max_wait) = self.settings.max_wait {
                if session.started_at.elapsed() >= max_wait {
                    warn!(
                        machine_id = %session.machine_id,
                        polls = session.polls,
                        "maximum wait elapsed without readiness"
                    );
                    return self.abandon(&mut session, Some(ABANDON_MAX_WAIT)).await;
                }
            }

            session.polls += 1;
            if session.polls == PATIENCE_POLL {
                // One reassurance per session, regardless of this round's
                // verdict, so a long wake never goes silent.
                self.notify_update(pick_patience_remark()).await;
            }

            let verdict = tokio::select! {
                () = cancel.cancelled() => return self.abandon(&mut session, None).await,
                verdict = self.poll_once(&session) => verdict,
            };
            if verdict == Verdict::Ready {
                info!(machine_id = %session.machine_id, polls = session.polls, "machine ready");
                // Success after polling goes out as a fresh message: the
                // acknowledgment may be far up the scrollback by now.
                if let Err(err) = self
                    .notifier
                    .follow_up(SUCCESS, request.requester.as_deref())
                    .await
                {
                    warn!(error = %err, "failed to deliver success follow-up");
                }
                session.phase = WakePhase::Succeeded;
                return WakeOutcome::Succeeded {
                    polls: session.polls,
                };
            }
        }
    }

    /// One describe + evaluate round. Transport, status, and decode failures
    /// are logged and folded into a waiting verdict: a flaky status check
    /// must not abandon an otherwise successful wake.
    async fn poll_once(&self, session: &WakeSession) -> Verdict {
        match self.client.describe().await {
            Ok(machine) => {
                let verdict = evaluate(&machine);
                match &verdict {
                    Verdict::Ready => {}
                    Verdict::NotStarted { state } => {
                        info!(machine_id = %session.machine_id, state = %state, "machine not started yet");
                    }
                    Verdict::Waiting {
                        reason: WaitReason::FailingChecks(failing),
                    } => {
                        for check in failing {
                            info!(
                                machine_id = %session.machine_id,
                                check = %check.name,
                                status = %check.status,
                                output = %check.output,
                                "health check not passing"
                            );
                        }
                    }
                    Verdict::Waiting { reason } => {
                        info!(machine_id = %session.machine_id, reason = %reason, "machine not ready");
                    }
                }
                verdict
            }
            Err(err) => {
                warn!(
                    machine_id = %session.machine_id,
                    error = %err,
                    "status query failed, treating as still waiting"
                );
                Verdict::Waiting {
                    reason: WaitReason::StatusUnavailable,
                }
            }
        }
    }

    async fn abandon(&self, session: &mut WakeSession, notice: Option<&str>) -> WakeOutcome {
        info!(
            machine_id = %session.machine_id,
            polls = session.polls,
            "wake session abandoned"
        );
        if let Some(text) = notice {
            self.notify_update(text).await;
        }
        session.phase = WakePhase::Abandoned;
        WakeOutcome::Abandoned
    }

    /// Notifier failures never terminate a session.
    async fn notify_update(&self, text: &str) {
        if let Err(err) = self.notifier.update(text).await {
            warn!(error = %err, "failed to deliver progress update");
        }
    }
}
