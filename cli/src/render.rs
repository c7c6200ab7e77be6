//! Terminal rendering of session view models.
//!
//! Markdown is walked with the same event stream the browser renders from
//! (raw HTML already dropped) and flattened to text. Numeric tokens outside
//! code are bold, as are headings and strong spans. With color off the
//! output is plain text.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use chat::markdown::{Segment, events, split_numbers};
use chat::{DetailsView, DrillDownControl, MessageView, MoreInfoResult};
use colored::Colorize;
use pulldown_cmark::{Event, Tag, TagEnd};

pub const BOT_NAME: &str = "Gemini";

#[derive(Clone, Copy, Debug)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Render one transcript entry.
    pub fn message(&self, view: &MessageView) -> String {
        match view {
            MessageView::User { text, .. } => format!("{} {text}\n", self.label("you>")),
            MessageView::Activity { .. } => format!("{} {}\n", self.label(&format!("{BOT_NAME}>")), self.dim("thinking...")),
            MessageView::Bot { text, details, .. } => {
                let mut out = format!("{}\n{}", self.label(&format!("{BOT_NAME}>")), self.markdown(text));
                if let Some(details) = details {
                    out.push_str(&self.details(view.index(), details));
                }
                out
            }
        }
    }

    fn details(&self, index: usize, details: &DetailsView) -> String {
        let mut out = self.dim(&format!(
            "  Search Method: {} | Table Used: {}\n",
            details.search_method, details.table_used
        ));
        match details.drill_down {
            DrillDownControl::Hidden => {}
            DrillDownControl::Enabled => {
                out.push_str(&format!("  [{}] type /more {index}\n", details.drill_down.label().unwrap_or_default()));
            }
            DrillDownControl::Disabled => {
                out.push_str(&format!("  [{}]\n", details.drill_down.label().unwrap_or_default()));
            }
        }
        if let Some(error) = &details.more_info_error {
            out.push_str(&self.error(&format!("  {error}\n")));
        }
        if let Some(info) = &details.more_info {
            out.push_str(&self.more_info(info));
        }
        out
    }

    /// Render drill-down summaries.
    pub fn more_info(&self, info: &MoreInfoResult) -> String {
        let mut out = format!("{}\n{}", self.heading("Overall Summary:"), self.markdown(&info.overall_summary));
        if !info.concern_code_summaries.is_empty() {
            out.push_str(&format!("{}\n", self.heading("Concern Code Summaries:")));
            for (code, summary) in &info.concern_code_summaries {
                out.push_str(&format!("{}\n{}", self.heading(&format!("Code {code}:")), self.markdown(summary)));
            }
        }
        out
    }

    /// Pretty JSON payload for the `/raw` command.
    pub fn raw(&self, details: &DetailsView) -> String {
        let mut out = format!("{}\n{}\n", self.heading("Raw Results:"), details.raw_results);
        if let Some(rows) = &details.additional_results {
            out.push_str(&format!("{}\n{rows}\n", self.heading("Additional Results:")));
        }
        out
    }

    /// Flatten markdown to terminal text.
    pub fn markdown(&self, markdown: &str) -> String {
        let mut out = String::new();
        let mut bold = 0_usize;
        let mut in_code_block = false;
        let mut list_depth = 0_usize;

        for event in events(markdown) {
            match event {
                Event::Start(Tag::Heading { .. } | Tag::Strong) => bold += 1,
                Event::End(TagEnd::Heading(_)) => {
                    bold = bold.saturating_sub(1);
                    out.push_str("\n\n");
                }
                Event::End(TagEnd::Strong) => bold = bold.saturating_sub(1),
                Event::End(TagEnd::Paragraph) => {
                    out.push('\n');
                    if list_depth == 0 {
                        out.push('\n');
                    }
                }
                Event::Start(Tag::List(_)) => {
                    if list_depth > 0 && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    list_depth += 1;
                }
                Event::End(TagEnd::List(_)) => {
                    list_depth = list_depth.saturating_sub(1);
                    if list_depth == 0 {
                        out.push('\n');
                    }
                }
                Event::Start(Tag::Item) => {
                    out.push_str(&"  ".repeat(list_depth));
                    out.push_str("• ");
                }
                Event::End(TagEnd::Item) => {
                    if !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    out.push('\n');
                }
                Event::Text(text) if in_code_block => {
                    for line in text.lines() {
                        out.push_str("    ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                Event::Text(text) => self.push_text(&mut out, &text, bold > 0),
                Event::Code(code) => out.push_str(&code),
                Event::SoftBreak => out.push(' '),
                Event::HardBreak => out.push('\n'),
                Event::Rule => out.push_str("---\n\n"),
                _ => {}
            }
        }

        let mut trimmed = out.trim_end().to_owned();
        trimmed.push('\n');
        trimmed
    }

    fn push_text(&self, out: &mut String, text: &str, bold: bool) {
        if !self.color {
            out.push_str(text);
            return;
        }
        for segment in split_numbers(text) {
            match segment {
                Segment::Number(n) => out.push_str(&n.bold().to_string()),
                Segment::Plain(s) if bold => out.push_str(&s.bold().to_string()),
                Segment::Plain(s) => out.push_str(s),
            }
        }
    }

    fn label(&self, text: &str) -> String {
        if self.color { text.bold().cyan().to_string() } else { text.to_owned() }
    }

    fn heading(&self, text: &str) -> String {
        if self.color { text.bold().to_string() } else { text.to_owned() }
    }

    fn dim(&self, text: &str) -> String {
        if self.color { text.dimmed().to_string() } else { text.to_owned() }
    }

    pub fn error(&self, text: &str) -> String {
        if self.color { text.red().to_string() } else { text.to_owned() }
    }
}
