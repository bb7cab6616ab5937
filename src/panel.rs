/// Panel states and the pure mapping to what the overlay shows
use crate::analysis::SentimentSummary;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Idle,
    Loading,
    NoData,
    Result(SentimentSummary),
}

/// Emoji bucket for the compound score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Positive,
    Neutral,
    Negative,
}

impl Mood {
    pub fn from_compound(compound: f64) -> Mood {
        if compound >= 0.5 {
            Mood::Positive
        } else if compound <= -0.5 {
            Mood::Negative
        } else {
            Mood::Neutral
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Positive => "😊",
            Mood::Neutral => "😐",
            Mood::Negative => "😠",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub color: &'static str,
    /// Percent of the bar width from the left edge
    pub offset: f64,
    /// Percent of the bar width
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    Hidden,
    Busy,
    Empty,
    Summary {
        mood: Mood,
        score_label: String,
        /// positive, neutral, negative, left to right
        segments: [BarSegment; 3],
        processed_label: String,
    },
}

pub const POSITIVE_COLOR: &str = "#4CAF50";
pub const NEUTRAL_COLOR: &str = "#FFC107";
pub const NEGATIVE_COLOR: &str = "#F44336";

impl PanelView {
    pub fn is_visible(&self) -> bool {
        !matches!(self, PanelView::Hidden)
    }

    fn summary(summary: &SentimentSummary) -> PanelView {
        if !summary.is_well_formed() {
            log::warn!("malformed sentiment summary, showing empty state: {:?}", summary);
            return PanelView::Empty;
        }

        let positive = summary.positive * 100.0;
        let neutral = summary.neutral * 100.0;
        let negative = summary.negative * 100.0;

        PanelView::Summary {
            mood: Mood::from_compound(summary.compound),
            score_label: format!("{:.1}% Sentiment", summary.compound * 100.0),
            segments: [
                BarSegment { color: POSITIVE_COLOR, offset: 0.0, width: positive },
                BarSegment { color: NEUTRAL_COLOR, offset: positive, width: neutral },
                BarSegment { color: NEGATIVE_COLOR, offset: positive + neutral, width: negative },
            ],
            processed_label: format!("{} comments analyzed", summary.processed_comments),
        }
    }
}

impl From<&PanelState> for PanelView {
    fn from(state: &PanelState) -> Self {
        match state {
            PanelState::Idle => PanelView::Hidden,
            PanelState::Loading => PanelView::Busy,
            PanelState::NoData => PanelView::Empty,
            PanelState::Result(summary) => PanelView::summary(summary),
        }
    }
}

/// Whatever displays panel states; the browser one drives a Yew component
pub trait PanelSink {
    fn render(&self, state: &PanelState);
}
