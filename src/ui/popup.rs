/// Popup UI: start/stop auto-analysis on the active tab

use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use patternfly_yew::prelude::*;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::components::StatusText;
use crate::channel::{Command, ControlChannel, StatusLine, Transport};

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendToActiveTab(message: JsValue, inject: bool) -> Result<JsValue, JsValue>;
}

/// `chrome.tabs.sendMessage` to the active tab of the current window
pub struct ActiveTabTransport;

impl Transport for ActiveTabTransport {
    fn deliver(&self, command: Command) -> LocalBoxFuture<'_, Result<serde_json::Value, String>> {
        async move {
            let message = command
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(|e| format!("Failed to serialize: {:?}", e))?;

            // The content script may not be on the page yet; starting injects it
            let inject = matches!(command, Command::AnalyzeReel);
            let reply = sendToActiveTab(message, inject)
                .await
                .map_err(|e| e.as_string().unwrap_or_else(|| format!("{:?}", e)))?;

            if reply.is_undefined() || reply.is_null() {
                return Ok(serde_json::Value::Null);
            }
            serde_wasm_bindgen::from_value(reply).map_err(|e| format!("Failed to parse reply: {:?}", e))
        }
        .boxed_local()
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let status = use_state(|| None::<StatusLine>);
    let busy = use_state(|| false);
    let channel = use_memo((), |_| ControlChannel::new(ActiveTabTransport));

    let send = {
        let status = status.clone();
        let busy = busy.clone();

        Callback::from(move |command: Command| {
            let status = status.clone();
            let busy = busy.clone();
            let channel: Rc<ControlChannel<ActiveTabTransport>> = channel.clone();

            status.set(Some(StatusLine::pending(command)));
            busy.set(true);

            spawn_local(async move {
                let result = channel.send(command).await;
                if let Err(e) = &result {
                    log::warn!("{:?} failed: {}", command, e);
                }
                status.set(Some(StatusLine::outcome(command, &result)));
                busy.set(false);
            });
        })
    };

    let on_start = {
        let send = send.clone();
        Callback::from(move |_| send.emit(Command::AnalyzeReel))
    };

    let on_stop = {
        let send = send.clone();
        Callback::from(move |_| send.emit(Command::StopAnalysis))
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Reel Sentiment"}</h1>

            <div class="flex-column-gap">
                <Button onclick={on_start} disabled={*busy} variant={ButtonVariant::Primary} block={true}>
                    {"Analyze Reel"}
                </Button>
                <Button onclick={on_stop} disabled={*busy} variant={ButtonVariant::Danger} block={true}>
                    {"Stop Auto-Analysis"}
                </Button>
            </div>

            if let Some(line) = (*status).clone() {
                <StatusText status={line} />
            }
        </div>
    }
}
