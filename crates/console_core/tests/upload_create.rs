use std::path::PathBuf;
use std::sync::Once;

use console_core::{
    infer_transport_type, update, AppState, CreateForm, Effect, ErrorKind, FilterKey, FormField,
    Msg, TransportType,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(console_logging::initialize_for_tests);
}

fn select_file(state: AppState, path: &str) -> (AppState, u64) {
    let (state, effects) = update(state, Msg::UploadSelected(PathBuf::from(path)));
    match effects.as_slice() {
        [Effect::UploadAsset { ticket, source }] => {
            assert_eq!(source, &PathBuf::from(path));
            (state, *ticket)
        }
        other => panic!("expected UploadAsset, got {other:?}"),
    }
}

fn fill_form(state: AppState) -> AppState {
    let (state, _) = update(state, Msg::FormEdited(FormField::Name("Gate".to_string())));
    let (state, _) = update(state, Msg::FormEdited(FormField::ScenarioId(Some(2))));
    state
}

#[test]
fn transport_type_is_inferred_from_path_shape() {
    assert_eq!(infer_transport_type("rtsp://host/live"), TransportType::Stream);
    assert_eq!(infer_transport_type("clip01.mp4"), TransportType::File);
    assert_eq!(
        infer_transport_type("uploads/2024/clip01.mp4"),
        TransportType::Stream
    );
    // Known approximation: a bare hostname has no separator.
    assert_eq!(infer_transport_type("camera-01.local"), TransportType::File);
}

#[test]
fn completed_upload_populates_form_path() {
    init_logging();
    let (state, ticket) = select_file(AppState::new(), "/tmp/clip01.mp4");
    assert!(state.view().uploading);

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            ticket,
            result: Ok("clip01.mp4".to_string()),
        },
    );

    let view = state.view();
    assert!(effects.is_empty());
    assert!(!view.uploading);
    assert_eq!(view.resolved_path.as_deref(), Some("clip01.mp4"));
    assert_eq!(view.form.path, "clip01.mp4");
}

#[test]
fn upload_failure_and_empty_path_surface_upload_errors() {
    init_logging();
    let (state, ticket) = select_file(AppState::new(), "/tmp/a.mp4");
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            ticket,
            result: Err("http status 500".to_string()),
        },
    );
    let (state, ticket) = select_file(state, "/tmp/b.mp4");
    let (mut state, _) = update(
        state,
        Msg::UploadFinished {
            ticket,
            result: Ok("  ".to_string()),
        },
    );

    assert!(!state.view().uploading);
    assert_eq!(state.view().form.path, "");
    let kinds: Vec<_> = state.take_notifications().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::Upload, ErrorKind::Upload]);
}

#[test]
fn later_writer_wins_between_manual_edit_and_upload() {
    init_logging();
    let (state, ticket) = select_file(AppState::new(), "/tmp/clip.mp4");
    let (state, _) = update(
        state,
        Msg::FormEdited(FormField::Path("rtsp://cam/1".to_string())),
    );
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            ticket,
            result: Ok("clip.mp4".to_string()),
        },
    );
    assert_eq!(state.view().form.path, "clip.mp4");

    let (state, _) = update(
        state,
        Msg::FormEdited(FormField::Path("rtsp://cam/2".to_string())),
    );
    assert_eq!(state.view().form.path, "rtsp://cam/2");
}

#[test]
fn superseded_upload_result_is_ignored() {
    init_logging();
    let (state, first) = select_file(AppState::new(), "/tmp/one.mp4");
    let (state, second) = select_file(state, "/tmp/two.mp4");

    let (state, _) = update(
        state,
        Msg::UploadFinished {
            ticket: first,
            result: Ok("one.mp4".to_string()),
        },
    );
    assert!(state.view().uploading);
    assert_eq!(state.view().form.path, "");

    let (state, _) = update(
        state,
        Msg::UploadFinished {
            ticket: second,
            result: Ok("two.mp4".to_string()),
        },
    );
    assert_eq!(state.view().form.path, "two.mp4");
}

#[test]
fn create_with_missing_fields_fails_before_any_request() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::CreateSubmitted);

    assert!(effects.is_empty());
    assert!(!state.view().creating);
    let notifications = state.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, ErrorKind::Validation);
    assert!(notifications[0].message.contains("name, path, scenario"));
}

#[test]
fn validation_builds_request_with_inferred_type() {
    let form = CreateForm {
        name: " Lobby ".to_string(),
        description: "  ".to_string(),
        path: "rtsp://10.0.0.5/main".to_string(),
        scenario_id: Some(3),
        algo_id: Some(8),
    };

    let request = form.validate().expect("valid form");

    assert_eq!(request.name, "Lobby");
    assert_eq!(request.description, None);
    assert_eq!(request.stream_type, TransportType::Stream);
    assert_eq!(request.scenario_id, 3);
    assert_eq!(request.algo_id, Some(8));
}

#[test]
fn successful_create_resets_form_and_refreshes_feed() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FilterChanged(FilterKey::category(2)));
    let epoch = state.feed().epoch();
    let state = fill_form(state);
    let (state, _) = update(
        state,
        Msg::FormEdited(FormField::Path("clip.mp4".to_string())),
    );

    let (state, effects) = update(state, Msg::CreateSubmitted);
    let ticket = match effects.as_slice() {
        [Effect::CreateStream { ticket, request }] => {
            assert_eq!(request.stream_type, TransportType::File);
            assert_eq!(request.stream_path, "clip.mp4");
            *ticket
        }
        other => panic!("expected CreateStream, got {other:?}"),
    };
    assert!(state.view().creating);

    // Double submit while the first is pending is dropped.
    let (state, effects) = update(state, Msg::CreateSubmitted);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::CreateFinished {
            ticket,
            result: Ok(41),
        },
    );

    let view = state.view();
    assert_eq!(view.last_created, Some(41));
    assert_eq!(view.form, CreateForm::default());
    assert!(!view.creating);
    match effects.as_slice() {
        [Effect::FetchPage(request)] => {
            assert_eq!(request.page, 1);
            assert_eq!(request.filter, FilterKey::category(2));
            assert!(request.epoch > epoch);
        }
        other => panic!("expected FetchPage, got {other:?}"),
    }
}

#[test]
fn failed_create_keeps_form_and_feed() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FilterChanged(FilterKey::all()));
    let epoch = state.feed().epoch();
    let state = fill_form(state);
    let (state, _) = update(
        state,
        Msg::FormEdited(FormField::Path("clip.mp4".to_string())),
    );
    let (state, effects) = update(state, Msg::CreateSubmitted);
    let ticket = match effects.as_slice() {
        [Effect::CreateStream { ticket, .. }] => *ticket,
        other => panic!("expected CreateStream, got {other:?}"),
    };

    let (mut state, effects) = update(
        state,
        Msg::CreateFinished {
            ticket,
            result: Err("http status 502".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.feed().epoch(), epoch);
    assert_eq!(state.view().form.name, "Gate");
    assert!(!state.view().creating);
    assert_eq!(state.take_notifications()[0].kind, ErrorKind::Create);
}
