use super::*;
use crate::message::VECTOR_SEARCH;

fn answer(method: &str) -> Message {
    Message::bot(
        "answer",
        Some(ResultDetails {
            search_method: method.to_owned(),
            table_used: "warranty_embedding".to_owned(),
            raw_results: serde_json::json!({ "codes": ["A1"] }),
            codes: vec!["A1".to_owned()],
            more_info: None,
            more_info_error: None,
        }),
    )
}

// =============================================================
// append
// =============================================================

#[test]
fn append_returns_positions_in_order() {
    let mut store = ConversationStore::new();
    assert_eq!(store.append(Message::user("a")), Ok(0));
    assert_eq!(store.append(Message::user("b")), Ok(1));
    assert_eq!(store.len(), 2);
}

#[test]
fn append_rejects_second_placeholder() {
    let mut store = ConversationStore::new();
    store.append(Message::Loading).expect("first placeholder");
    assert_eq!(store.append(Message::Loading), Err(StoreError::PlaceholderPending));
    assert_eq!(store.len(), 1);
}

// =============================================================
// replace_last
// =============================================================

#[test]
fn replace_last_swaps_placeholder() {
    let mut store = ConversationStore::new();
    store.append(Message::user("q")).expect("user");
    store.append(Message::Loading).expect("placeholder");
    let index = store.replace_last(Message::bot("done", None)).expect("replace");
    assert_eq!(index, 1);
    assert_eq!(store.last(), Some(&Message::bot("done", None)));
    assert!(!store.has_placeholder());
}

#[test]
fn replace_last_guards_non_placeholder() {
    let mut store = ConversationStore::new();
    store.append(Message::user("q")).expect("user");
    assert_eq!(store.replace_last(Message::bot("x", None)), Err(StoreError::NoPlaceholder));
    assert_eq!(store.last(), Some(&Message::user("q")));
}

#[test]
fn replace_last_on_empty_store_errors() {
    let mut store = ConversationStore::new();
    assert_eq!(store.replace_last(Message::bot("x", None)), Err(StoreError::NoPlaceholder));
    assert!(store.is_empty());
}

// =============================================================
// update_where
// =============================================================

#[test]
fn update_where_touches_every_match() {
    let mut store = ConversationStore::new();
    store.append(answer(VECTOR_SEARCH)).expect("append");
    store.append(Message::user("q")).expect("append");
    store.append(answer("text2sql")).expect("append");
    store.append(answer(VECTOR_SEARCH)).expect("append");

    let updated = store.update_where(
        |_, d| d.search_method == VECTOR_SEARCH,
        |d| d.table_used = "touched".to_owned(),
    );

    assert_eq!(updated, 2);
    assert_eq!(store.details(0).map(|d| d.table_used.as_str()), Some("touched"));
    assert_eq!(store.details(2).map(|d| d.table_used.as_str()), Some("warranty_embedding"));
    assert_eq!(store.details(3).map(|d| d.table_used.as_str()), Some("touched"));
}

#[test]
fn update_where_can_target_by_index() {
    let mut store = ConversationStore::new();
    store.append(answer(VECTOR_SEARCH)).expect("append");
    store.append(answer(VECTOR_SEARCH)).expect("append");

    let updated = store.update_where(|i, _| i == 1, |d| d.codes.clear());

    assert_eq!(updated, 1);
    assert_eq!(store.details(0).map(|d| d.codes.len()), Some(1));
    assert_eq!(store.details(1).map(|d| d.codes.len()), Some(0));
}

#[test]
fn update_where_skips_bot_messages_without_details() {
    let mut store = ConversationStore::new();
    store.append(Message::query_error("boom")).expect("append");
    assert_eq!(store.update_where(|_, _| true, |_| {}), 0);
}

#[test]
fn discard_placeholder_only_pops_trailing_placeholder() {
    let mut store = ConversationStore::new();
    store.append(Message::user("q")).expect("append");
    assert!(!store.discard_placeholder());
    store.append(Message::Loading).expect("append");
    assert!(store.discard_placeholder());
    assert_eq!(store.len(), 1);
}
