//! Markdown rendering for bot text.
//!
//! Bot answers are markdown. Raw HTML from the backend is dropped, and
//! numeric tokens in prose are emphasized so counts and costs stand out.
//! A token is numeric when, split on spaces, it matches `-?\d*\.?\d+`.

#[cfg(test)]
#[path = "markdown_test.rs"]
mod markdown_test;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

/// A run of text, tagged by whether it should be emphasized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Number(&'a str),
}

#[must_use]
pub fn is_numeric_token(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match digits.split_once('.') {
        Some((int, frac)) => all_digits(int) && !frac.is_empty() && all_digits(frac),
        None => !digits.is_empty() && all_digits(digits),
    }
}

/// Split `text` into plain and numeric segments, preserving every byte.
#[must_use]
pub fn split_numbers(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut offset = 0;
    for word in text.split(' ') {
        let end = offset + word.len();
        if is_numeric_token(word) {
            if plain_start < offset {
                segments.push(Segment::Plain(&text[plain_start..offset]));
            }
            segments.push(Segment::Number(word));
            plain_start = end;
        }
        offset = end + 1;
    }
    if plain_start < text.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }
    segments
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Markdown events with raw HTML removed.
pub fn events(markdown: &str) -> impl Iterator<Item = Event<'_>> {
    Parser::new_ext(markdown, parser_options()).filter(|event| !matches!(event, Event::Html(_) | Event::InlineHtml(_)))
}

/// Render markdown to HTML, wrapping numeric tokens outside code in
/// `<strong class="numeric">`.
#[must_use]
pub fn render_html(markdown: &str) -> String {
    let mut in_code_block = false;
    let mut out_events: Vec<Event<'_>> = Vec::new();
    for event in events(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                out_events.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                out_events.push(event);
            }
            Event::Text(text) if !in_code_block => push_highlighted(&mut out_events, text),
            other => out_events.push(other),
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, out_events.into_iter());
    out
}

fn push_highlighted<'a>(out: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    let has_number = split_numbers(&text).iter().any(|s| matches!(s, Segment::Number(_)));
    if !has_number {
        out.push(Event::Text(text));
        return;
    }
    for segment in split_numbers(&text) {
        match segment {
            Segment::Plain(s) => out.push(Event::Text(CowStr::from(s.to_owned()))),
            // Numeric tokens contain only digits, '-' and '.', so no escaping is needed.
            Segment::Number(n) => out.push(Event::InlineHtml(CowStr::from(format!(
                "<strong class=\"numeric\">{n}</strong>"
            )))),
        }
    }
}
