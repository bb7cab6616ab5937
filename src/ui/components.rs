/// Reusable UI components

use yew::prelude::*;

use crate::channel::{StatusLine, StatusTone};
use crate::panel::BarSegment;

#[derive(Properties, PartialEq)]
pub struct SentimentBarProps {
    pub segments: [BarSegment; 3],
}

/// Three stacked segments: positive, neutral, negative
#[function_component(SentimentBar)]
pub fn sentiment_bar(props: &SentimentBarProps) -> Html {
    html! {
        <div style="height: 6px; background: #eee; border-radius: 3px; overflow: hidden; margin: 0 auto; max-width: 80%; position: relative;">
            {for props.segments.iter().map(|segment| html! {
                <div style={format!(
                    "width: {}%; height: 100%; background: {}; position: absolute; left: {}%;",
                    segment.width, segment.color, segment.offset
                )}></div>
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PanelMessageProps {
    pub icon: AttrValue,
    pub message: AttrValue,
}

#[function_component(PanelMessage)]
pub fn panel_message(props: &PanelMessageProps) -> Html {
    html! {
        <div style="text-align: center;">
            <div style="font-size: 24px;">{&props.icon}</div>
            <div style="font-size: 13px; color: #555;">{&props.message}</div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusTextProps {
    pub status: StatusLine,
}

#[function_component(StatusText)]
pub fn status_text(props: &StatusTextProps) -> Html {
    let color = match props.status.tone {
        StatusTone::Pending => "#555",
        StatusTone::Success => "green",
        StatusTone::Error => "red",
    };

    html! {
        <div style={format!("margin-top: 10px; font-size: 13px; text-align: center; color: {};", color)}>
            {&props.status.text}
        </div>
    }
}
