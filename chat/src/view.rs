//! Rendering contract: what a front end must be able to derive from state.
//!
//! Front ends paint these view models however they like; they never read
//! the store directly. Everything here is a pure function of the session.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use crate::message::{Message, MoreInfoResult, ResultDetails};
use crate::session::ChatSession;

pub const MORE_INFO_LABEL: &str = "Get More Information";
pub const MORE_INFO_LOADING_LABEL: &str = "Loading More Info...";

/// State of the "Get More Information" affordance on one answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrillDownControl {
    /// Answer is not eligible.
    Hidden,
    Enabled,
    /// A drill-down is in flight.
    Disabled,
}

impl DrillDownControl {
    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Hidden => None,
            Self::Enabled => Some(MORE_INFO_LABEL),
            Self::Disabled => Some(MORE_INFO_LOADING_LABEL),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetailsView {
    pub search_method: String,
    pub table_used: String,
    /// Pretty-printed raw results for the disclosure panel.
    pub raw_results: String,
    /// Pretty-printed rows behind the drill-down summaries, once fetched.
    pub additional_results: Option<String>,
    pub drill_down: DrillDownControl,
    pub more_info: Option<MoreInfoResult>,
    pub more_info_error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MessageView {
    User {
        index: usize,
        text: String,
    },
    /// Indeterminate activity indicator for the pending query.
    Activity {
        index: usize,
    },
    Bot {
        index: usize,
        /// Markdown source.
        text: String,
        details: Option<DetailsView>,
    },
}

impl MessageView {
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::User { index, .. } | Self::Activity { index } | Self::Bot { index, .. } => *index,
        }
    }
}

impl ChatSession {
    /// Project the conversation into view models, in arrival order.
    #[must_use]
    pub fn view(&self) -> Vec<MessageView> {
        let more_info_loading = self.more_info_loading();
        self.store()
            .iter()
            .enumerate()
            .map(|(index, message)| match message {
                Message::User { text } => MessageView::User { index, text: text.clone() },
                Message::Loading => MessageView::Activity { index },
                Message::Bot { text, details } => MessageView::Bot {
                    index,
                    text: text.clone(),
                    details: details.as_ref().map(|d| details_view(d, more_info_loading)),
                },
            })
            .collect()
    }

    /// Control state for the answer at `index`.
    #[must_use]
    pub fn drill_down_control(&self, index: usize) -> DrillDownControl {
        self.store()
            .details(index)
            .map_or(DrillDownControl::Hidden, |d| control_for(d, self.more_info_loading()))
    }
}

fn control_for(details: &ResultDetails, more_info_loading: bool) -> DrillDownControl {
    if !details.is_drill_down_eligible() {
        DrillDownControl::Hidden
    } else if more_info_loading {
        DrillDownControl::Disabled
    } else {
        DrillDownControl::Enabled
    }
}

fn details_view(details: &ResultDetails, more_info_loading: bool) -> DetailsView {
    DetailsView {
        search_method: details.search_method.clone(),
        table_used: details.table_used.clone(),
        raw_results: pretty(&details.raw_results),
        additional_results: details
            .more_info
            .as_ref()
            .map(|m| &m.additional_results)
            .filter(|v| !v.is_null())
            .map(pretty),
        drill_down: control_for(details, more_info_loading),
        more_info: details.more_info.clone(),
        more_info_error: details.more_info_error.clone(),
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
