/// Content-script glue: the real page behind the orchestrator's traits
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::Window;

use crate::analysis::{legacy_analysis, AnalysisBackend};
use crate::channel::{parse_command, BackgroundRequest};
use crate::orchestrator::{Notifier, Orchestrator, PageLocation};

// Import JS bridge functions
#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    /// `handler` returns a Promise resolving to the reply, or `undefined`
    /// when the message is not for this context
    fn registerMessageListener(handler: &Closure<dyn FnMut(JsValue) -> JsValue>);

    fn showNotification(title: &str, message: &str);
}

pub struct BrowserLocation {
    window: Window,
}

impl BrowserLocation {
    pub fn new(window: Window) -> Self {
        BrowserLocation { window }
    }
}

impl PageLocation for BrowserLocation {
    fn href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }
}

/// `chrome.notifications` when the context has it, `alert()` otherwise
pub struct BrowserNotifier;

impl Notifier for BrowserNotifier {
    fn alert(&self, title: &str, message: &str) {
        showNotification(title, message);
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize reply: {}", e)))
}

fn message_json(message: JsValue) -> Option<serde_json::Value> {
    serde_wasm_bindgen::from_value(message).ok()
}

/// Answer ANALYZE_REEL / STOP_ANALYSIS from the popup
pub fn listen_for_commands(orchestrator: Rc<Orchestrator>) {
    let handler = Closure::wrap(Box::new(move |message: JsValue| {
        let Some(command) = message_json(message).as_ref().and_then(parse_command) else {
            return JsValue::UNDEFINED;
        };

        let orchestrator = orchestrator.clone();
        let reply = async move {
            let ack = orchestrator.handle_command(command).await;
            to_js(&ack)
        };
        future_to_promise(reply).into()
    }) as Box<dyn FnMut(JsValue) -> JsValue>);

    registerMessageListener(&handler);
    handler.forget();
}

/// Answer the legacy `analyze_sentiment` request in the background script
pub fn listen_for_analysis_requests(backend: Rc<dyn AnalysisBackend>) {
    let handler = Closure::wrap(Box::new(move |message: JsValue| {
        let request = match serde_wasm_bindgen::from_value::<BackgroundRequest>(message) {
            Ok(request) => request,
            Err(_) => return JsValue::UNDEFINED,
        };

        let backend = backend.clone();
        let reply = async move {
            let BackgroundRequest::AnalyzeSentiment { comments } = request;
            let body = legacy_analysis(backend.as_ref(), comments).await;
            to_js(&body)
        };
        future_to_promise(reply).into()
    }) as Box<dyn FnMut(JsValue) -> JsValue>);

    registerMessageListener(&handler);
    handler.forget();
}

/// Stop monitoring when the page goes away
pub fn stop_on_unload(window: &Window, orchestrator: &Rc<Orchestrator>) -> Result<(), JsValue> {
    let weak = Rc::downgrade(orchestrator);
    let on_unload = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        if let Some(orchestrator) = weak.upgrade() {
            orchestrator.stop_monitoring();
        }
    }) as Box<dyn FnMut(web_sys::Event)>);

    window.add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref())?;
    on_unload.forget();
    Ok(())
}
