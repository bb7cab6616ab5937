/// Monitoring session: the reel-change state machine
///
/// Stopped --start--> Running(identity)
/// Running(a) --tick sees b != a--> Running(b) and a pass fires
/// Running --stop / unload--> Stopped
///
/// Every start hands out a new generation. Ticks carry the generation they
/// were armed with, so a tick scheduled before `stop` is recognised as stale
/// and dropped even if the browser still delivers it.
use futures::channel::oneshot;

use crate::identity::ContentIdentity;
use crate::runtime::IntervalHandle;

#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    Stopped,
    Running {
        identity: Option<ContentIdentity>,
        timer: Option<IntervalHandle>,
    },
}

/// Result of one timer tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Session stopped, or the tick belongs to an earlier run
    Inactive,
    /// A pass is still running; try again on the next tick
    Deferred,
    Unchanged,
    /// New identity stored; the caller owns the pass it must now run
    Changed(ContentIdentity),
}

#[derive(Debug)]
pub struct MonitoringSession {
    state: SessionState,
    generation: u64,
    pass_in_flight: bool,
    pass_waiters: Vec<oneshot::Sender<()>>,
    stop_requests: u64,
}

impl MonitoringSession {
    pub fn new() -> Self {
        MonitoringSession {
            state: SessionState::Stopped,
            generation: 0,
            pass_in_flight: false,
            pass_waiters: Vec::new(),
            stop_requests: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Running { .. })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_identity(&self) -> Option<&ContentIdentity> {
        match &self.state {
            SessionState::Running { identity, .. } => identity.as_ref(),
            SessionState::Stopped => None,
        }
    }

    /// Begin monitoring from `identity`. Returns the generation to arm the
    /// timer with, or `None` when already running.
    pub fn start(&mut self, identity: Option<ContentIdentity>) -> Option<u64> {
        if self.is_active() {
            return None;
        }

        self.generation += 1;
        self.state = SessionState::Running { identity, timer: None };
        Some(self.generation)
    }

    /// Record the timer armed for `generation`. A handle for a generation
    /// that is no longer current is handed back so the caller can clear it.
    pub fn attach_timer(&mut self, generation: u64, handle: IntervalHandle) -> Option<IntervalHandle> {
        match &mut self.state {
            SessionState::Running { timer, .. } if generation == self.generation => {
                *timer = Some(handle);
                None
            }
            _ => Some(handle),
        }
    }

    /// Stop monitoring and forget the identity. Returns the timer to clear;
    /// a no-op when already stopped.
    pub fn stop(&mut self) -> Option<IntervalHandle> {
        self.stop_requests += 1;
        match std::mem::replace(&mut self.state, SessionState::Stopped) {
            SessionState::Running { timer, .. } => {
                self.generation += 1;
                timer
            }
            SessionState::Stopped => None,
        }
    }

    /// Compare the identity seen on a tick with the stored one
    pub fn observe(&mut self, generation: u64, observed: Option<ContentIdentity>) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Inactive;
        }
        let SessionState::Running { identity, .. } = &mut self.state else {
            return TickOutcome::Inactive;
        };
        if self.pass_in_flight {
            return TickOutcome::Deferred;
        }

        match observed {
            Some(new_identity) if identity.as_ref() != Some(&new_identity) => {
                *identity = Some(new_identity.clone());
                TickOutcome::Changed(new_identity)
            }
            _ => TickOutcome::Unchanged,
        }
    }

    /// Mark a pass as running. Returns false when one already is.
    pub fn begin_pass(&mut self) -> bool {
        if self.pass_in_flight {
            false
        } else {
            self.pass_in_flight = true;
            true
        }
    }

    /// Resolves once the running pass finishes. Whoever wakes up must still
    /// win `begin_pass`; another waiter may have taken the slot first.
    pub fn wait_for_pass(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        if self.pass_in_flight {
            self.pass_waiters.push(tx);
        } else {
            let _ = tx.send(());
        }
        rx
    }

    pub fn finish_pass(&mut self) {
        self.pass_in_flight = false;
        for waiter in self.pass_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    /// Counts every `stop` call, including ones made while already stopped
    pub fn stop_requests(&self) -> u64 {
        self.stop_requests
    }

    pub fn pass_in_flight(&self) -> bool {
        self.pass_in_flight
    }
}

impl Default for MonitoringSession {
    fn default() -> Self {
        Self::new()
    }
}
