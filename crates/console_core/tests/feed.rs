use std::sync::Once;

use console_core::{
    update, AppState, Effect, ErrorKind, FeedState, FilterKey, Msg, PageOutcome, PageRequest,
    StreamRecord, TransportType,
};
use pretty_assertions::assert_eq;

const PAGE_SIZE: u32 = 3;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(console_logging::initialize_for_tests);
}

fn record(id: i64) -> StreamRecord {
    StreamRecord {
        id,
        name: format!("stream-{id}"),
        transport_path: format!("clip{id}.mp4"),
        transport_type: TransportType::File,
        description: None,
        created_at: 1_700_000_000 + id,
        scenario_id: Some(1),
        scenario_name: Some("security".to_string()),
    }
}

fn records(ids: std::ops::RangeInclusive<i64>) -> Vec<StreamRecord> {
    ids.map(record).collect()
}

fn fetch_request(effects: &[Effect]) -> PageRequest {
    match effects {
        [Effect::FetchPage(request)] => request.clone(),
        other => panic!("expected a single FetchPage effect, got {other:?}"),
    }
}

fn loaded(request: &PageRequest, records: Vec<StreamRecord>, total: u64) -> Msg {
    Msg::PageLoaded {
        epoch: request.epoch,
        page: request.page,
        records,
        total,
    }
}

fn ids(state: &AppState) -> Vec<i64> {
    state.items().iter().map(|r| r.id).collect()
}

#[test]
fn filter_change_resets_and_requests_first_page() {
    init_logging();
    let state = AppState::with_page_size(PAGE_SIZE);
    let key = FilterKey::category(2).with_keyword("gate");

    let (state, effects) = update(state, Msg::FilterChanged(key.clone()));

    let request = fetch_request(&effects);
    assert_eq!(request.page, 1);
    assert_eq!(request.page_size, PAGE_SIZE);
    assert_eq!(request.filter, key);
    assert!(state.feed().in_flight());
    assert!(state.feed().has_more());
    assert!(state.items().is_empty());
}

#[test]
fn same_filter_is_a_noop() {
    init_logging();
    let (state, _) = update(
        AppState::with_page_size(PAGE_SIZE),
        Msg::FilterChanged(FilterKey::category(1)),
    );
    let epoch = state.feed().epoch();

    let (state, effects) = update(state, Msg::FilterChanged(FilterKey::category(1)));

    assert!(effects.is_empty());
    assert_eq!(state.feed().epoch(), epoch);
}

#[test]
fn blank_keyword_equals_no_keyword() {
    assert_eq!(FilterKey::new(Some(4), Some("   ")), FilterKey::category(4));
    assert_eq!(
        FilterKey::new(None, Some("  lobby ")).keyword(),
        Some("lobby")
    );
}

#[test]
fn first_page_replaces_and_later_pages_append_in_server_order() {
    init_logging();
    let (state, effects) = update(
        AppState::with_page_size(PAGE_SIZE),
        Msg::FilterChanged(FilterKey::all()),
    );
    let first = fetch_request(&effects);
    let (state, _) = update(state, loaded(&first, records(1..=3), 5));
    assert_eq!(ids(&state), vec![1, 2, 3]);
    assert!(state.feed().has_more());

    let (state, effects) = update(state, Msg::LoadMore);
    let second = fetch_request(&effects);
    assert_eq!(second.page, 2);
    let (state, _) = update(state, loaded(&second, vec![record(9), record(4)], 5));

    assert_eq!(ids(&state), vec![1, 2, 3, 9, 4]);
    assert_eq!(state.feed().page(), 2);
    assert!(!state.feed().has_more());
    assert!(!state.feed().in_flight());
}

#[test]
fn has_more_follows_server_total() {
    init_logging();
    let size = u64::from(PAGE_SIZE);
    for total in [0, size - 1, size, size * 3 + 1] {
        let mut feed = FeedState::new(PAGE_SIZE);
        let request = feed.set_filter(FilterKey::all()).expect("first page");
        // A short page never decides on its own; only the total does.
        let outcome = feed.apply_page(request.epoch, 1, records(1..=1), total);

        assert_eq!(outcome, PageOutcome::Replaced);
        assert_eq!(
            feed.has_more(),
            size < total,
            "total={total} page_size={size}"
        );
    }
}

#[test]
fn has_more_uses_the_fresh_total_of_each_response() {
    let mut feed = FeedState::new(PAGE_SIZE);
    let first = feed.set_filter(FilterKey::all()).expect("first page");
    feed.apply_page(first.epoch, 1, records(1..=3), 10);
    assert!(feed.has_more());

    let second = feed.load_more().expect("second page");
    // Rows were deleted on the server meanwhile.
    feed.apply_page(second.epoch, 2, records(4..=6), 6);

    assert_eq!(feed.total(), 6);
    assert!(!feed.has_more());
    assert_eq!(feed.load_more(), None);
}

#[test]
fn load_more_while_in_flight_issues_nothing() {
    init_logging();
    let (state, effects) = update(
        AppState::with_page_size(PAGE_SIZE),
        Msg::FilterChanged(FilterKey::all()),
    );
    let mut requests = effects.len();

    let (state, effects) = update(state, Msg::LoadMore);
    requests += effects.len();
    let (state, effects) = update(state, Msg::LoadMore);
    requests += effects.len();

    assert_eq!(requests, 1);
    assert!(state.feed().in_flight());
}

#[test]
fn load_more_without_filter_or_data_is_a_noop() {
    let (state, effects) = update(AppState::new(), Msg::LoadMore);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::FilterChanged(FilterKey::all()));
    let request = fetch_request(&effects);
    let (state, _) = update(state, loaded(&request, Vec::new(), 0));
    let (_state, effects) = update(state, Msg::LoadMore);
    assert!(effects.is_empty());
}

#[test]
fn stale_epoch_response_is_discarded() {
    init_logging();
    let state = AppState::with_page_size(PAGE_SIZE);
    let (state, effects) = update(state, Msg::FilterChanged(FilterKey::category(1)));
    let old = fetch_request(&effects);
    let (state, effects) = update(state, Msg::FilterChanged(FilterKey::category(2)));
    let new = fetch_request(&effects);
    assert_ne!(old.epoch, new.epoch);

    // The newer filter's page lands first, then the old one resolves late.
    let (state, _) = update(state, loaded(&new, records(20..=22), 3));
    let (state, _) = update(state, loaded(&old, records(10..=12), 3));

    assert_eq!(ids(&state), vec![20, 21, 22]);
    assert_eq!(state.feed().filter(), Some(&FilterKey::category(2)));
}

#[test]
fn stale_response_does_not_release_the_new_epochs_fetch() {
    init_logging();
    let state = AppState::with_page_size(PAGE_SIZE);
    let (state, effects) = update(state, Msg::FilterChanged(FilterKey::category(1)));
    let old = fetch_request(&effects);
    let (state, _) = update(state, Msg::FilterChanged(FilterKey::category(2)));

    let (state, _) = update(state, loaded(&old, records(10..=12), 9));
    assert!(state.items().is_empty());
    assert!(state.feed().in_flight());

    let (state, effects) = update(
        state,
        Msg::PageFailed {
            epoch: old.epoch,
            page: old.page,
            message: "boom".to_string(),
        },
    );
    let mut state = state;
    assert!(effects.is_empty());
    assert!(state.feed().in_flight());
    assert!(state.take_notifications().is_empty());
}

#[test]
fn failed_page_keeps_cursor_and_allows_identical_retry() {
    init_logging();
    let (state, effects) = update(
        AppState::with_page_size(PAGE_SIZE),
        Msg::FilterChanged(FilterKey::all()),
    );
    let first = fetch_request(&effects);
    let (state, _) = update(state, loaded(&first, records(1..=3), 7));
    let (state, effects) = update(state, Msg::LoadMore);
    let second = fetch_request(&effects);

    let (mut state, effects) = update(
        state,
        Msg::PageFailed {
            epoch: second.epoch,
            page: second.page,
            message: "connection reset".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.feed().page(), 1);
    assert_eq!(ids(&state), vec![1, 2, 3]);
    assert!(state.feed().has_more());
    assert!(!state.feed().in_flight());
    let notifications = state.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, ErrorKind::Fetch);

    let (_state, effects) = update(state, Msg::LoadMore);
    assert_eq!(fetch_request(&effects), second);
}

#[test]
fn failed_first_page_is_retried_as_page_one() {
    let mut feed = FeedState::new(PAGE_SIZE);
    let first = feed.set_filter(FilterKey::all()).expect("first page");
    assert_eq!(feed.apply_failure(first.epoch, 1), PageOutcome::Failed);

    assert!(feed.has_more());
    let retry = feed.load_more().expect("retry");
    assert_eq!(retry.page, 1);
    assert_eq!(retry.epoch, first.epoch);
}

#[test]
fn refresh_reloads_current_filter_in_new_epoch() {
    init_logging();
    let (state, effects) = update(
        AppState::with_page_size(PAGE_SIZE),
        Msg::FilterChanged(FilterKey::category(3)),
    );
    let first = fetch_request(&effects);
    let (state, _) = update(state, loaded(&first, records(1..=3), 3));

    let (state, effects) = update(state, Msg::Refresh);
    let again = fetch_request(&effects);

    assert_eq!(again.page, 1);
    assert_eq!(again.filter, FilterKey::category(3));
    assert!(again.epoch > first.epoch);
    assert!(state.items().is_empty());
}
