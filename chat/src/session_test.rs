use super::*;
use serde_json::json;

fn vector_answer(codes: &[&str]) -> QueryResponse {
    serde_json::from_value(json!({
        "answer": "42 units affected",
        "search_method": "vector_search",
        "table_name": "warranty_embedding",
        "results": { "codes": codes }
    }))
    .expect("decode")
}

fn sql_answer() -> QueryResponse {
    serde_json::from_value(json!({
        "answer": "There were 12 claims.",
        "search_method": "text2sql",
        "table_name": "warranty_embedding",
        "results": [{ "cnt": 12 }]
    }))
    .expect("decode")
}

fn more_info(summary: &str) -> MoreInfoResponse {
    serde_json::from_value(json!({
        "overall_summary": summary,
        "concern_code_summaries": { "A1": "x" }
    }))
    .expect("decode")
}

fn ask(session: &mut ChatSession, text: &str, outcome: Result<QueryResponse, ApiError>) -> usize {
    let ticket = session.begin_query(text).expect("begin");
    session.settle_query(ticket, outcome).expect("settle")
}

// =============================================================
// begin_query
// =============================================================

#[test]
fn begin_query_appends_user_and_placeholder() {
    let mut session = ChatSession::default();
    let ticket = session.begin_query("  sunroof leaks  ").expect("begin");

    assert_eq!(ticket.query(), "sunroof leaks");
    assert_eq!(session.messages(), &[Message::user("sunroof leaks"), Message::Loading]);
    assert!(session.is_loading());
    assert!(!session.can_submit());
}

#[test]
fn blank_input_leaves_session_unchanged() {
    let mut session = ChatSession::default();
    for input in ["", "   ", "\n\t"] {
        assert_eq!(session.begin_query(input), Err(SubmitError::EmptyQuery));
        assert!(session.messages().is_empty());
        assert_eq!(session.request_state(RequestKind::Query), &RequestState::Idle);
    }
}

#[test]
fn second_query_while_pending_is_refused() {
    let mut session = ChatSession::default();
    session.begin_query("first").expect("begin");
    assert_eq!(session.begin_query("second"), Err(SubmitError::Busy));
    assert_eq!(session.messages().len(), 2);
}

// =============================================================
// settle_query
// =============================================================

#[test]
fn successful_answer_replaces_placeholder() {
    let mut session = ChatSession::default();
    let index = ask(&mut session, "sunroof", Ok(vector_answer(&["A1", "B2"])));

    assert_eq!(index, 1);
    assert_eq!(session.messages().len(), 2);
    let details = session.store().details(1).expect("details");
    assert_eq!(details.search_method, "vector_search");
    assert_eq!(details.codes, vec!["A1", "B2"]);
    assert!(!session.store().has_placeholder());
    assert_eq!(session.request_state(RequestKind::Query), &RequestState::Succeeded);
    assert!(session.can_submit());
}

#[test]
fn http_500_becomes_error_message() {
    let mut session = ChatSession::default();
    ask(&mut session, "sunroof", Err(ApiError::HttpStatus(500)));

    assert_eq!(
        session.messages()[1],
        Message::bot("Error: HTTP error! status: 500. Please try again.", None)
    );
    assert!(matches!(session.request_state(RequestKind::Query), RequestState::Failed { .. }));
    assert!(session.can_submit());
}

#[test]
fn backend_reported_error_becomes_error_message() {
    let mut session = ChatSession::default();
    let body: QueryResponse = serde_json::from_value(json!({ "error": "quota exceeded" })).expect("decode");
    ask(&mut session, "q", Ok(body));
    assert_eq!(session.messages()[1], Message::bot("Error: quota exceeded. Please try again.", None));
}

#[test]
fn every_submission_leaves_one_user_and_one_bot_message() {
    let outcomes: Vec<Result<QueryResponse, ApiError>> = vec![
        Ok(vector_answer(&["A1"])),
        Err(ApiError::Network("connection refused".into())),
        Ok(sql_answer()),
        Err(ApiError::Decode("expected value".into())),
        Err(ApiError::Timeout { secs: 60 }),
    ];
    let mut session = ChatSession::default();
    for (n, outcome) in outcomes.into_iter().enumerate() {
        ask(&mut session, &format!("question {n}"), outcome);
        assert_eq!(session.messages().len(), (n + 1) * 2);
        assert!(!session.store().has_placeholder());
    }
    for pair in session.messages().chunks(2) {
        assert!(matches!(pair[0], Message::User { .. }));
        assert!(matches!(pair[1], Message::Bot { .. }));
    }
}

#[test]
fn stale_ticket_is_rejected_without_mutation() {
    let mut session = ChatSession::default();
    let first = session.begin_query("one").expect("begin");
    let stale = first.clone();
    session.settle_query(first, Ok(sql_answer())).expect("settle");
    let before = session.messages().to_vec();

    let err = session.settle_query(stale.clone(), Ok(sql_answer())).expect_err("stale");
    assert_eq!(err, SettleError::Stale(stale.id()));
    assert_eq!(session.messages(), before.as_slice());
}

#[test]
fn legacy_contract_reads_legacy_codes() {
    let config = SessionConfig { contract: crate::wire::BackendContract::Legacy, ..SessionConfig::default() };
    let mut session = ChatSession::new(config);
    let body: QueryResponse = serde_json::from_value(json!({
        "answer": "a",
        "search_method": "vector_search",
        "table_name": "warranty_embedding",
        "results": { "vector_results": [], "cust_conc_cds": ["C10"] }
    }))
    .expect("decode");
    ask(&mut session, "q", Ok(body));
    assert_eq!(session.store().details(1).map(|d| d.codes.clone()), Some(vec!["C10".to_owned()]));
}

// =============================================================
// Drill-down
// =============================================================

#[test]
fn drill_down_offered_only_for_eligible_answers() {
    let mut session = ChatSession::default();
    ask(&mut session, "a", Ok(vector_answer(&["A1"])));
    ask(&mut session, "b", Ok(sql_answer()));
    ask(&mut session, "c", Ok(vector_answer(&[])));

    assert!(session.offers_more_info(1));
    assert!(!session.offers_more_info(3));
    assert!(!session.offers_more_info(5));
    assert!(!session.offers_more_info(0));
    assert_eq!(session.begin_more_info(3), Err(DrillDownError::NotEligible(3)));
    assert_eq!(session.begin_more_info(5), Err(DrillDownError::NotEligible(5)));
    assert_eq!(session.begin_more_info(42), Err(DrillDownError::NoSuchMessage(42)));
}

#[test]
fn drill_down_does_not_append_placeholder() {
    let mut session = ChatSession::default();
    ask(&mut session, "a", Ok(vector_answer(&["A1", "B2"])));
    let ticket = session.begin_more_info(1).expect("begin");

    assert_eq!(ticket.request().table_name, "warranty_embedding");
    assert_eq!(ticket.request().codes, vec!["A1", "B2"]);
    assert_eq!(session.messages().len(), 2);
    assert!(session.more_info_loading());
    assert!(!session.is_loading());
    assert_eq!(session.begin_more_info(1), Err(DrillDownError::Busy));
}

#[test]
fn drill_down_updates_every_eligible_answer_by_default() {
    let mut session = ChatSession::default();
    ask(&mut session, "a", Ok(vector_answer(&["A1"])));
    ask(&mut session, "b", Ok(sql_answer()));
    ask(&mut session, "c", Ok(vector_answer(&["B2"])));

    let ticket = session.begin_more_info(5).expect("begin");
    let updated = session.settle_more_info(ticket, Ok(more_info("S"))).expect("settle");

    assert_eq!(updated, 2);
    for index in [1, 5] {
        let info = session.store().details(index).and_then(|d| d.more_info.clone()).expect("more info");
        assert_eq!(info.overall_summary, "S");
        assert_eq!(info.concern_code_summaries.get("A1").map(String::as_str), Some("x"));
    }
    assert!(session.store().details(3).is_some_and(|d| d.more_info.is_none()));
    assert!(!session.more_info_loading());
}

#[test]
fn triggering_scope_updates_only_target() {
    let config = SessionConfig { drill_down_scope: DrillDownScope::Triggering, ..SessionConfig::default() };
    let mut session = ChatSession::new(config);
    ask(&mut session, "a", Ok(vector_answer(&["A1"])));
    ask(&mut session, "b", Ok(vector_answer(&["B2"])));

    let ticket = session.begin_more_info(3).expect("begin");
    assert_eq!(session.settle_more_info(ticket, Ok(more_info("S"))), Ok(1));
    assert!(session.store().details(1).is_some_and(|d| d.more_info.is_none()));
    assert!(session.store().details(3).is_some_and(|d| d.more_info.is_some()));
}

#[test]
fn repeated_drill_down_overwrites() {
    let mut session = ChatSession::default();
    ask(&mut session, "a", Ok(vector_answer(&["A1"])));

    for summary in ["first", "second", "second"] {
        let ticket = session.begin_more_info(1).expect("begin");
        session.settle_more_info(ticket, Ok(more_info(summary))).expect("settle");
    }

    let info = session.store().details(1).and_then(|d| d.more_info.clone()).expect("more info");
    assert_eq!(info.overall_summary, "second");
    assert_eq!(info.concern_code_summaries.len(), 1);
}

#[test]
fn failed_drill_down_sets_inline_error_and_releases_control() {
    let mut session = ChatSession::default();
    ask(&mut session, "a", Ok(vector_answer(&["A1"])));

    let ticket = session.begin_more_info(1).expect("begin");
    assert!(session.more_info_loading());
    let updated = session.settle_more_info(ticket, Err(ApiError::HttpStatus(502))).expect("settle");

    assert_eq!(updated, 0);
    assert!(!session.more_info_loading());
    let details = session.store().details(1).expect("details");
    assert_eq!(
        details.more_info_error.as_deref(),
        Some("Error fetching more information: HTTP error! status: 502. Please try again.")
    );
    assert!(details.more_info.is_none());

    let ticket = session.begin_more_info(1).expect("retry allowed");
    session.settle_more_info(ticket, Ok(more_info("S"))).expect("settle");
    let details = session.store().details(1).expect("details");
    assert!(details.more_info_error.is_none());
    assert!(details.more_info.is_some());
}

#[test]
fn query_and_drill_down_can_overlap() {
    let mut session = ChatSession::default();
    ask(&mut session, "a", Ok(vector_answer(&["A1"])));

    let drill = session.begin_more_info(1).expect("drill");
    let query = session.begin_query("b").expect("query");
    session.settle_more_info(drill, Ok(more_info("S"))).expect("settle drill");
    session.settle_query(query, Ok(sql_answer())).expect("settle query");

    assert_eq!(session.messages().len(), 4);
    assert!(session.store().details(1).is_some_and(|d| d.more_info.is_some()));
    assert!(matches!(session.messages()[3], Message::Bot { .. }));
}

// =============================================================
// close
// =============================================================

#[test]
fn close_discards_placeholder_and_ignores_late_settlement() {
    let mut session = ChatSession::default();
    let ticket = session.begin_query("q").expect("begin");
    session.close();

    assert_eq!(session.messages(), &[Message::user("q")]);
    assert!(!session.is_loading());
    assert_eq!(session.settle_query(ticket, Ok(sql_answer())), Err(SettleError::Closed));
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.begin_query("again"), Err(SubmitError::Closed));
}

#[test]
fn close_refuses_drill_down() {
    let mut session = ChatSession::default();
    ask(&mut session, "a", Ok(vector_answer(&["A1"])));
    session.close();
    assert_eq!(session.begin_more_info(1), Err(DrillDownError::Closed));
}
