/// Content-script orchestration: extraction → analysis → panel, plus the
/// reel-change monitor that re-runs the pipeline after navigation.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::FutureExt;
use log::{debug, error, info, warn};

use crate::analysis::AnalysisBackend;
use crate::channel::{Ack, Command};
use crate::config::Config;
use crate::extractor::{extract, CommentSource, RetryPolicy};
use crate::identity::{content_identity, ContentIdentity};
use crate::panel::{PanelSink, PanelState};
use crate::runtime::Runtime;
use crate::session::{MonitoringSession, TickOutcome};

pub const ALERT_TITLE: &str = "Error";
pub const ALERT_MESSAGE: &str = "failed server connection";

/// Current page address
pub trait PageLocation {
    fn href(&self) -> String;
}

/// User-visible alert, separate from the panel
pub trait Notifier {
    fn alert(&self, title: &str, message: &str);
}

/// The collaborators one orchestrator drives
pub struct Collaborators {
    pub source: Rc<dyn CommentSource>,
    pub location: Rc<dyn PageLocation>,
    pub backend: Rc<dyn AnalysisBackend>,
    pub panel: Rc<dyn PanelSink>,
    pub notifier: Rc<dyn Notifier>,
    pub runtime: Rc<dyn Runtime>,
}

pub struct Orchestrator {
    config: Config,
    deps: Collaborators,
    session: RefCell<MonitoringSession>,
}

impl Orchestrator {
    pub fn new(config: Config, deps: Collaborators) -> Rc<Self> {
        Rc::new(Orchestrator {
            config,
            deps,
            session: RefCell::new(MonitoringSession::new()),
        })
    }

    fn current_identity(&self) -> Option<ContentIdentity> {
        content_identity(&self.deps.location.href())
    }

    pub fn is_monitoring(&self) -> bool {
        self.session.borrow().is_active()
    }

    fn render(&self, state: &PanelState) {
        self.deps.panel.render(state);
    }

    /// One full pass. Always ends in a rendered panel state, which is returned.
    pub async fn run_analysis_pass(&self) -> PanelState {
        self.render(&PanelState::Loading);

        let policy = RetryPolicy::from_config(&self.config);
        let batch = extract(self.deps.source.as_ref(), self.deps.runtime.as_ref(), policy).await;

        let state = if batch.is_empty() {
            info!("no comments found");
            PanelState::NoData
        } else {
            match self.deps.backend.analyze(&batch).await {
                Ok(summary) => PanelState::Result(summary),
                Err(e) => {
                    error!("analysis failed: {}", e);
                    if e.should_alert() {
                        self.deps.notifier.alert(ALERT_TITLE, ALERT_MESSAGE);
                    }
                    PanelState::NoData
                }
            }
        };

        self.render(&state);
        state
    }

    /// Run a pass while holding the session's in-flight flag. When another
    /// pass is running, wait for it to finish first.
    async fn guarded_pass(&self) -> PanelState {
        loop {
            let waiter = {
                let mut session = self.session.borrow_mut();
                if session.begin_pass() {
                    break;
                }
                session.wait_for_pass()
            };
            debug!("analysis in flight, waiting for it to finish");
            let _ = waiter.await;
        }

        let state = self.run_analysis_pass().await;
        self.session.borrow_mut().finish_pass();
        state
    }

    /// Arm the reel-change timer. No-op when already monitoring.
    pub fn start_monitoring(self: &Rc<Self>) {
        let identity = self.current_identity();
        let Some(generation) = self.session.borrow_mut().start(identity.clone()) else {
            debug!("monitor already running");
            return;
        };

        let weak: Weak<Orchestrator> = Rc::downgrade(self);
        let runtime = self.deps.runtime.clone();
        let tick = Box::new(move || {
            if let Some(orchestrator) = weak.upgrade() {
                runtime.spawn(async move { orchestrator.on_tick(generation).await }.boxed_local());
            }
        });

        let handle = self.deps.runtime.set_interval(self.config.poll_interval(), tick);
        if let Some(stale) = self.session.borrow_mut().attach_timer(generation, handle) {
            self.deps.runtime.clear_interval(stale);
        }

        info!(
            "monitoring started at {}",
            identity.as_ref().map(ContentIdentity::as_str).unwrap_or("<no reel>")
        );
    }

    /// Disarm the timer. Ticks already queued observe the stop and do nothing.
    pub fn stop_monitoring(&self) {
        let timer = self.session.borrow_mut().stop();
        if let Some(handle) = timer {
            self.deps.runtime.clear_interval(handle);
            info!("monitoring stopped");
        }
    }

    async fn on_tick(&self, generation: u64) {
        let observed = self.current_identity();
        let outcome = self.session.borrow_mut().observe(generation, observed);

        match outcome {
            TickOutcome::Changed(identity) => {
                info!("reel changed to {}", identity);
                if !self.session.borrow_mut().begin_pass() {
                    return;
                }
                self.run_analysis_pass().await;
                self.session.borrow_mut().finish_pass();
            }
            TickOutcome::Deferred => debug!("analysis in flight, deferring tick"),
            TickOutcome::Unchanged | TickOutcome::Inactive => {}
        }
    }

    pub async fn handle_start(self: &Rc<Self>) -> Ack {
        let stops = self.session.borrow().stop_requests();
        self.guarded_pass().await;

        if self.session.borrow().stop_requests() != stops {
            info!("stopped while the pass ran, not arming the monitor");
        } else {
            self.start_monitoring();
        }
        Ack::ok()
    }

    pub fn handle_stop(&self) -> Ack {
        self.stop_monitoring();
        Ack::ok()
    }

    pub async fn handle_command(self: &Rc<Self>, command: Command) -> Ack {
        debug!("command received: {:?}", command);
        match command {
            Command::AnalyzeReel => self.handle_start().await,
            Command::StopAnalysis => self.handle_stop(),
        }
    }

    /// Start monitoring on its own when the page already shows a reel
    pub fn schedule_autostart(self: &Rc<Self>) -> bool {
        if self.current_identity().is_none() {
            return false;
        }

        let weak = Rc::downgrade(self);
        let settle = self.deps.runtime.sleep(self.config.settle_delay());
        self.deps.runtime.spawn(
            async move {
                settle.await;
                match weak.upgrade() {
                    Some(orchestrator) => orchestrator.start_monitoring(),
                    None => warn!("page torn down before autostart"),
                }
            }
            .boxed_local(),
        );
        true
    }
}
