/// Timer and task seam between the pipeline and the browser event loop
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use futures::future::{self, Either, FutureExt, LocalBoxFuture};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

/// Identifies an armed interval so it can be cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalHandle(pub i32);

/// Everything in here runs on one thread; futures need not be `Send`
pub trait Runtime {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    fn set_interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> IntervalHandle;

    /// Clearing an unknown handle is a no-op
    fn clear_interval(&self, handle: IntervalHandle);
}

/// Resolves to `Err(limit)` when `work` has not finished within `limit`
pub async fn with_timeout<T, F>(runtime: &dyn Runtime, limit: Duration, work: F) -> Result<T, Duration>
where
    F: Future<Output = T>,
{
    let work = std::pin::pin!(work);
    match future::select(work, runtime.sleep(limit)).await {
        Either::Left((value, _)) => Ok(value),
        Either::Right(((), _)) => Err(limit),
    }
}

// Timer globals exist on both windows and service workers
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = setTimeout)]
    fn js_set_timeout(handler: &js_sys::Function, timeout: i32) -> JsValue;

    #[wasm_bindgen(js_name = setInterval)]
    fn js_set_interval(handler: &js_sys::Function, timeout: i32) -> JsValue;

    #[wasm_bindgen(js_name = clearInterval)]
    fn js_clear_interval(handle: &JsValue);
}

/// The JS event loop of whichever extension context loaded the module
#[derive(Default)]
pub struct BrowserRuntime {
    intervals: RefCell<HashMap<i32, (JsValue, Closure<dyn FnMut()>)>>,
    next_handle: std::cell::Cell<i32>,
}

impl BrowserRuntime {
    pub fn new() -> Self {
        Self::default()
    }
}

fn millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

impl Runtime for BrowserRuntime {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let delay = millis(duration);
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            js_set_timeout(&resolve, delay);
        });

        async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local()
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        spawn_local(task);
    }

    fn set_interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> IntervalHandle {
        let closure = Closure::wrap(tick);
        let js_handle = js_set_interval(closure.as_ref().unchecked_ref(), millis(period));

        let handle = IntervalHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.intervals.borrow_mut().insert(handle.0, (js_handle, closure));
        handle
    }

    fn clear_interval(&self, handle: IntervalHandle) {
        // The closure is dropped only after the browser forgot the timer
        if let Some((js_handle, _closure)) = self.intervals.borrow_mut().remove(&handle.0) {
            js_clear_interval(&js_handle);
        }
    }
}
