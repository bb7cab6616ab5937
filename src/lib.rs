/// Reel Sentiment - Chrome Extension for live comment sentiment
/// Built with Rust + WASM + Yew

pub mod analysis;
pub mod channel;
pub mod comments;
pub mod config;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod orchestrator;
pub mod page;
pub mod panel;
pub mod runtime;
pub mod session;
pub mod ui;

#[cfg(test)]
mod testing;

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use wasm_bindgen::prelude::*;

use crate::analysis::{AnalysisBackend, HttpAnalysisClient};
use crate::config::Config;
use crate::extractor::DomCommentSource;
use crate::orchestrator::{Collaborators, Orchestrator};
use crate::page::{BrowserLocation, BrowserNotifier};
use crate::runtime::{BrowserRuntime, Runtime};
use crate::ui::panel::YewPanel;

thread_local! {
    // One orchestrator per page, however often the script is injected
    static CONTENT: RefCell<Option<Rc<Orchestrator>>> = const { RefCell::new(None) };
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

// Re-export identity parsing for JavaScript access
#[wasm_bindgen]
pub fn extract_content_identity(url: &str) -> Option<String> {
    identity::content_identity(url).map(|identity| identity.to_string())
}

/// Attach to the page: mount the panel, answer popup commands, stop on
/// unload, and start monitoring by itself when a reel is already open
#[wasm_bindgen]
pub fn start_content_script(config: JsValue) -> Result<(), JsValue> {
    if CONTENT.with(|content| content.borrow().is_some()) {
        info!("content script already attached");
        return Ok(());
    }

    let config = Config::from_js(config).map_err(js_error)?;
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window.document().ok_or_else(|| js_error("no document"))?;

    let runtime: Rc<dyn Runtime> = Rc::new(BrowserRuntime::new());
    let panel = YewPanel::mount(&document).map_err(js_error)?;

    let orchestrator = Orchestrator::new(
        config.clone(),
        Collaborators {
            source: Rc::new(DomCommentSource::new(document, config.comment_selector.clone())),
            location: Rc::new(BrowserLocation::new(window.clone())),
            backend: Rc::new(HttpAnalysisClient::from_config(&config, runtime.clone())),
            panel: Rc::new(panel),
            notifier: Rc::new(BrowserNotifier),
            runtime,
        },
    );

    page::listen_for_commands(orchestrator.clone());
    page::stop_on_unload(&window, &orchestrator)?;
    if orchestrator.schedule_autostart() {
        info!("reel open at load, monitoring starts in {} ms", config.settle_delay_ms);
    }

    CONTENT.with(|content| *content.borrow_mut() = Some(orchestrator));
    Ok(())
}

/// Serve the legacy `analyze_sentiment` request from the background script
#[wasm_bindgen]
pub fn start_background(config: JsValue) -> Result<(), JsValue> {
    let config = Config::from_js(config).map_err(js_error)?;
    let runtime: Rc<dyn Runtime> = Rc::new(BrowserRuntime::new());
    let backend: Rc<dyn AnalysisBackend> = Rc::new(HttpAnalysisClient::from_config(&config, runtime));

    page::listen_for_analysis_requests(backend);
    info!("background listening, endpoint {}", config.endpoint);
    Ok(())
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
