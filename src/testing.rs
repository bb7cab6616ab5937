/// Fakes shared by the unit tests
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::executor::LocalSpawner;
use futures::future::{self, FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;

use crate::analysis::{AnalysisBackend, SentimentSummary};
use crate::channel::{Command, Transport};
use crate::comments::CommentBatch;
use crate::error::AnalysisError;
use crate::extractor::CommentSource;
use crate::orchestrator::{Notifier, PageLocation};
use crate::panel::{PanelSink, PanelState};
use crate::runtime::{IntervalHandle, Runtime};

type Tick = Rc<RefCell<Box<dyn FnMut()>>>;

/// Sleeps resolve at once (and are recorded); intervals only fire when the
/// test says so; spawned tasks go to a `LocalPool`
pub struct ManualRuntime {
    spawner: LocalSpawner,
    sleeps: RefCell<Vec<Duration>>,
    intervals: RefCell<Vec<(IntervalHandle, Duration, Tick)>>,
    cleared: RefCell<Vec<IntervalHandle>>,
    next_handle: Cell<i32>,
    armed: Cell<usize>,
}

impl ManualRuntime {
    pub fn new(spawner: LocalSpawner) -> Self {
        ManualRuntime {
            spawner,
            sleeps: RefCell::new(Vec::new()),
            intervals: RefCell::new(Vec::new()),
            cleared: RefCell::new(Vec::new()),
            next_handle: Cell::new(1),
            armed: Cell::new(0),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    /// Periods of the intervals still armed
    pub fn live_intervals(&self) -> Vec<Duration> {
        self.intervals.borrow().iter().map(|(_, period, _)| *period).collect()
    }

    pub fn intervals_armed(&self) -> usize {
        self.armed.get()
    }

    pub fn cleared(&self) -> Vec<IntervalHandle> {
        self.cleared.borrow().clone()
    }

    /// Deliver one tick to every armed interval
    pub fn fire_intervals(&self) {
        let ticks: Vec<Tick> = self.intervals.borrow().iter().map(|(_, _, tick)| tick.clone()).collect();
        for tick in ticks {
            (&mut *tick.borrow_mut())();
        }
    }
}

impl Runtime for ManualRuntime {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        self.sleeps.borrow_mut().push(duration);
        future::ready(()).boxed_local()
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawner.spawn_local(task).expect("local pool is alive");
    }

    fn set_interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> IntervalHandle {
        let handle = IntervalHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.armed.set(self.armed.get() + 1);
        self.intervals.borrow_mut().push((handle, period, Rc::new(RefCell::new(tick))));
        handle
    }

    fn clear_interval(&self, handle: IntervalHandle) {
        self.intervals.borrow_mut().retain(|(h, _, _)| *h != handle);
        self.cleared.borrow_mut().push(handle);
    }
}

/// Returns one scripted snapshot per read; the last one repeats
pub struct ScriptedSource {
    snapshots: RefCell<VecDeque<Vec<String>>>,
    reads: Cell<usize>,
}

impl ScriptedSource {
    pub fn new(snapshots: Vec<Vec<String>>) -> Self {
        ScriptedSource {
            snapshots: RefCell::new(snapshots.into()),
            reads: Cell::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![vec![]])
    }

    pub fn repeating(texts: Vec<String>) -> Self {
        Self::new(vec![texts])
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl CommentSource for ScriptedSource {
    fn visible_texts(&self) -> Vec<String> {
        self.reads.set(self.reads.get() + 1);
        let mut snapshots = self.snapshots.borrow_mut();
        if snapshots.len() > 1 {
            snapshots.pop_front().unwrap_or_default()
        } else {
            snapshots.front().cloned().unwrap_or_default()
        }
    }
}

pub struct FakeLocation {
    href: RefCell<String>,
}

impl FakeLocation {
    pub fn new(href: &str) -> Self {
        FakeLocation { href: RefCell::new(href.to_string()) }
    }

    pub fn set(&self, href: &str) {
        *self.href.borrow_mut() = href.to_string();
    }
}

impl PageLocation for FakeLocation {
    fn href(&self) -> String {
        self.href.borrow().clone()
    }
}

/// Answers every call the same way; `hold_next` parks the next call until
/// the returned sender fires
pub struct FakeBackend {
    response: Result<SentimentSummary, AnalysisError>,
    batches: RefCell<Vec<Vec<String>>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl FakeBackend {
    pub fn succeeding(summary: SentimentSummary) -> Self {
        Self::with_response(Ok(summary))
    }

    pub fn failing(error: AnalysisError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<SentimentSummary, AnalysisError>) -> Self {
        FakeBackend {
            response,
            batches: RefCell::new(Vec::new()),
            gate: RefCell::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.batches.borrow().len()
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.borrow().clone()
    }

    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }
}

impl AnalysisBackend for FakeBackend {
    fn analyze<'a>(&'a self, batch: &'a CommentBatch) -> LocalBoxFuture<'a, Result<SentimentSummary, AnalysisError>> {
        self.batches
            .borrow_mut()
            .push(batch.texts().into_iter().map(str::to_string).collect());
        let gate = self.gate.borrow_mut().take();

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.response.clone()
        }
        .boxed_local()
    }
}

#[derive(Default)]
pub struct RecordingPanel {
    states: RefCell<Vec<PanelState>>,
}

impl RecordingPanel {
    pub fn states(&self) -> Vec<PanelState> {
        self.states.borrow().clone()
    }

    pub fn last(&self) -> Option<PanelState> {
        self.states.borrow().last().cloned()
    }
}

impl PanelSink for RecordingPanel {
    fn render(&self, state: &PanelState) {
        self.states.borrow_mut().push(state.clone());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    alerts: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, title: &str, message: &str) {
        self.alerts.borrow_mut().push((title.to_string(), message.to_string()));
    }
}

pub enum ScriptedTransport {
    Reply(serde_json::Value),
    Undeliverable(String),
    Hang,
}

impl ScriptedTransport {
    pub fn replying(reply: serde_json::Value) -> Self {
        ScriptedTransport::Reply(reply)
    }

    pub fn undeliverable(reason: &str) -> Self {
        ScriptedTransport::Undeliverable(reason.to_string())
    }

    pub fn hanging() -> Self {
        ScriptedTransport::Hang
    }
}

impl Transport for ScriptedTransport {
    fn deliver(&self, _command: Command) -> LocalBoxFuture<'_, Result<serde_json::Value, String>> {
        match self {
            ScriptedTransport::Reply(reply) => future::ready(Ok(reply.clone())).boxed_local(),
            ScriptedTransport::Undeliverable(reason) => future::ready(Err(reason.clone())).boxed_local(),
            ScriptedTransport::Hang => future::pending().boxed_local(),
        }
    }
}
