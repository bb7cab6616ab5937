/// Overlay panel injected into the host page

use std::cell::RefCell;

use yew::prelude::*;
use yew::AppHandle;
use web_sys::Document;

use super::components::{PanelMessage, SentimentBar};
use crate::panel::{PanelSink, PanelState, PanelView};

pub const PANEL_HOST_ID: &str = "reel-sentiment-dashboard";

const PANEL_STYLE: &str = "position: fixed; right: 20px; top: 50%; transform: translateY(-50%); \
    width: 160px; background: rgba(255,255,255,0.96); backdrop-filter: blur(10px); \
    border-radius: 12px; padding: 15px; z-index: 2147483647; \
    box-shadow: 0 4px 20px rgba(0,0,0,0.15); font-family: Arial, sans-serif;";

#[derive(Properties, PartialEq)]
pub struct SentimentPanelProps {
    pub view: PanelView,
}

#[function_component(SentimentPanel)]
pub fn sentiment_panel(props: &SentimentPanelProps) -> Html {
    let display = if props.view.is_visible() { "block" } else { "none" };

    let body = match &props.view {
        PanelView::Hidden => html! {},
        PanelView::Busy => html! {
            <PanelMessage icon="⏳" message="Loading comments..." />
        },
        PanelView::Empty => html! {
            <PanelMessage icon="💬" message="Open comments to analyze" />
        },
        PanelView::Summary { mood, score_label, segments, processed_label } => html! {
            <div style="text-align: center;">
                <div style="font-size: 28px;">{mood.emoji()}</div>
                <div style="font-size: 14px; color: #555; margin: 8px 0;">{score_label}</div>
                <SentimentBar segments={*segments} />
                <div style="font-size: 11px; color: #888; margin-top: 12px;">{processed_label}</div>
            </div>
        },
    };

    html! {
        <div style={format!("{} display: {};", PANEL_STYLE, display)}>
            {body}
        </div>
    }
}

/// Pushes panel states into a mounted [`SentimentPanel`]
pub struct YewPanel {
    handle: RefCell<AppHandle<SentimentPanel>>,
}

impl YewPanel {
    /// Append a host element to the page body and mount the panel, hidden
    pub fn mount(document: &Document) -> Result<YewPanel, String> {
        let body = document.body().ok_or("page has no body")?;
        let host = document
            .create_element("div")
            .map_err(|e| format!("Failed to create panel host: {:?}", e))?;
        host.set_id(PANEL_HOST_ID);
        body.append_child(&host)
            .map_err(|e| format!("Failed to attach panel host: {:?}", e))?;

        let handle = yew::Renderer::<SentimentPanel>::with_root_and_props(
            host,
            SentimentPanelProps { view: PanelView::Hidden },
        )
        .render();

        Ok(YewPanel { handle: RefCell::new(handle) })
    }
}

impl PanelSink for YewPanel {
    fn render(&self, state: &PanelState) {
        self.handle.borrow_mut().update(SentimentPanelProps { view: PanelView::from(state) });
    }
}
