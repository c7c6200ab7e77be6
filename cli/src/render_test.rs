use super::*;
use chat::{ChatSession, QueryResponse};
use serde_json::json;

fn plain() -> Renderer {
    Renderer::new(false)
}

fn answered_session() -> ChatSession {
    let mut session = ChatSession::default();
    let ticket = session.begin_query("sunroof").unwrap();
    let body: QueryResponse = serde_json::from_value(json!({
        "answer": "Found **3** concerns",
        "search_method": "vector_search",
        "table_name": "warranty_embedding",
        "results": { "codes": ["A1"] }
    }))
    .unwrap();
    session.settle_query(ticket, Ok(body)).unwrap();
    session
}

// =============================================================
// markdown
// =============================================================

#[test]
fn paragraph_is_flattened() {
    assert_eq!(plain().markdown("About 42 units\naffected"), "About 42 units affected\n");
}

#[test]
fn lists_become_bullets() {
    assert_eq!(plain().markdown("* Leaks: 12 claims\n* Noise"), "  • Leaks: 12 claims\n  • Noise\n");
}

#[test]
fn headings_are_separated_from_body() {
    assert_eq!(plain().markdown("# Summary\n\nMostly seals"), "Summary\n\nMostly seals\n");
}

#[test]
fn code_blocks_are_indented_verbatim() {
    assert_eq!(plain().markdown("```\nlimit 8\n```"), "    limit 8\n");
}

#[test]
fn raw_html_is_dropped() {
    let out = plain().markdown("hello <b>there</b> world");
    assert!(!out.contains("<b>"));
    assert!(out.contains("there"));
}

#[test]
fn color_mode_bolds_numbers() {
    colored::control::set_override(true);
    let out = Renderer::new(true).markdown("About 42 units");
    assert!(out.contains(&"42".bold().to_string()));
    assert!(out.contains("About "));
}

// =============================================================
// message
// =============================================================

#[test]
fn answer_shows_details_and_more_hint() {
    let session = answered_session();
    let views = session.view();

    assert_eq!(plain().message(&views[0]), "you> sunroof\n");
    let bot = plain().message(&views[1]);
    assert!(bot.starts_with("Gemini>\nFound 3 concerns\n"));
    assert!(bot.contains("Search Method: vector_search | Table Used: warranty_embedding"));
    assert!(bot.contains("[Get More Information] type /more 1"));
}

#[test]
fn pending_drill_down_shows_loading_label() {
    let mut session = answered_session();
    session.begin_more_info(1).unwrap();

    let bot = plain().message(&session.view()[1]);

    assert!(bot.contains("[Loading More Info...]"));
    assert!(!bot.contains("/more"));
}

#[test]
fn placeholder_renders_activity() {
    let mut session = ChatSession::default();
    session.begin_query("q").unwrap();
    assert_eq!(plain().message(&session.view()[1]), "Gemini> thinking...\n");
}

#[test]
fn more_info_lists_codes_in_order() {
    let info = MoreInfoResult {
        overall_summary: "Mostly seals".to_owned(),
        concern_code_summaries: [("B2".to_owned(), "drain".to_owned()), ("A1".to_owned(), "seal".to_owned())]
            .into_iter()
            .collect(),
        additional_results: serde_json::Value::Null,
    };

    let out = plain().more_info(&info);

    let a1 = out.find("Code A1:").unwrap();
    let b2 = out.find("Code B2:").unwrap();
    assert!(out.starts_with("Overall Summary:\nMostly seals\n"));
    assert!(a1 < b2);
}
