use std::sync::Once;

use console_core::{
    update, AnalysisObserver, AnalysisSession, AppState, ChannelEvent, Effect, ErrorKind, Frame,
    Msg, ReadyState, SessionPhase, Transition,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(console_logging::initialize_for_tests);
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Recorder {
    calls: Vec<String>,
}

impl AnalysisObserver for Recorder {
    fn on_message(&mut self, payload: &str) {
        self.calls.push(format!("message:{payload}"));
    }

    fn on_complete(&mut self) {
        self.calls.push("complete".to_string());
    }

    fn on_error(&mut self, message: &str) {
        self.calls.push(format!("error:{message}"));
    }
}

fn data(payload: &str) -> ChannelEvent {
    ChannelEvent::Frame(Frame::Data(payload.to_string()))
}

fn done() -> ChannelEvent {
    ChannelEvent::Frame(Frame::Done)
}

#[test]
fn messages_then_sentinel_complete_exactly_once() {
    let mut session = AnalysisSession::open(1, 7);
    let mut recorder = Recorder::default();

    let transitions: Vec<_> = [data("a"), data("b"), done(), data("late"), done()]
        .into_iter()
        .map(|event| session.handle(event, &mut recorder))
        .collect();

    assert_eq!(
        recorder.calls,
        vec!["message:a", "message:b", "complete"]
    );
    assert_eq!(
        transitions,
        vec![
            Transition::Continue,
            Transition::Continue,
            Transition::Close(SessionPhase::Completed),
            Transition::Continue,
            Transition::Continue,
        ]
    );
    assert_eq!(session.phase(), SessionPhase::Completed);
}

#[test]
fn cancel_silences_buffered_events() {
    let mut session = AnalysisSession::open(1, 7);
    let mut recorder = Recorder::default();
    session.handle(data("first"), &mut recorder);

    assert!(session.cancel());
    assert!(!session.cancel(), "close happens once");

    for event in [
        data("buffered"),
        done(),
        ChannelEvent::Error {
            ready_state: ReadyState::Open,
            message: "reset".to_string(),
        },
        ChannelEvent::Closed,
    ] {
        assert_eq!(session.handle(event, &mut recorder), Transition::Continue);
    }

    assert_eq!(recorder.calls, vec!["message:first"]);
    assert_eq!(session.phase(), SessionPhase::Cancelled);
}

#[test]
fn error_while_open_fires_on_error_once() {
    let mut session = AnalysisSession::open(3, 9);
    let mut recorder = Recorder::default();

    let first = session.handle(
        ChannelEvent::Error {
            ready_state: ReadyState::Open,
            message: "connection reset".to_string(),
        },
        &mut recorder,
    );
    let second = session.handle(
        ChannelEvent::Error {
            ready_state: ReadyState::Open,
            message: "again".to_string(),
        },
        &mut recorder,
    );

    assert_eq!(first, Transition::Close(SessionPhase::Errored));
    assert_eq!(second, Transition::Continue);
    assert_eq!(recorder.calls, vec!["error:connection reset"]);
}

#[test]
fn error_on_closed_channel_ends_quietly() {
    let mut session = AnalysisSession::open(4, 9);
    let mut recorder = Recorder::default();
    session.handle(data("only"), &mut recorder);

    let transition = session.handle(
        ChannelEvent::Error {
            ready_state: ReadyState::Closed,
            message: "eof".to_string(),
        },
        &mut recorder,
    );

    assert_eq!(transition, Transition::Close(SessionPhase::Closed));
    assert_eq!(recorder.calls, vec!["message:only"]);
    assert_eq!(session.phase(), SessionPhase::Closed);
}

#[test]
fn channel_closing_without_sentinel_is_not_a_completion() {
    let mut session = AnalysisSession::open(5, 9);
    let mut recorder = Recorder::default();

    let transition = session.handle(ChannelEvent::Closed, &mut recorder);
    let late = session.handle(done(), &mut recorder);

    assert_eq!(transition, Transition::Close(SessionPhase::Closed));
    assert_eq!(late, Transition::Continue);
    assert!(recorder.calls.is_empty());
    assert_ne!(session.phase(), SessionPhase::Completed);
    assert!(session.phase().is_terminal());
}

#[test]
fn app_collects_transcript_and_closes_channel_on_done() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::AnalyzeRequested { stream_id: 12 });
    let session = match effects.as_slice() {
        [Effect::OpenAnalysis { session, stream_id }] => {
            assert_eq!(*stream_id, 12);
            *session
        }
        other => panic!("expected OpenAnalysis, got {other:?}"),
    };

    let (state, _) = update(state, Msg::AnalysisEvent { session, event: data("person at gate") });
    let (state, effects) = update(state, Msg::AnalysisEvent { session, event: done() });

    assert_eq!(effects, vec![Effect::CloseAnalysis { session }]);
    let analysis = state.view().analysis.expect("analysis view");
    assert_eq!(analysis.phase, SessionPhase::Completed);
    assert_eq!(analysis.transcript, vec!["person at gate"]);
}

#[test]
fn server_close_without_sentinel_ends_closed_not_completed() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::AnalyzeRequested { stream_id: 12 });
    let session = match effects.as_slice() {
        [Effect::OpenAnalysis { session, .. }] => *session,
        other => panic!("expected OpenAnalysis, got {other:?}"),
    };

    let (state, _) = update(state, Msg::AnalysisEvent { session, event: data("partial") });
    let (mut state, effects) = update(state, Msg::AnalysisEvent { session, event: ChannelEvent::Closed });

    assert_eq!(effects, vec![Effect::CloseAnalysis { session }]);
    let analysis = state.view().analysis.expect("analysis view");
    assert_eq!(analysis.phase, SessionPhase::Closed);
    assert_eq!(analysis.transcript, vec!["partial"]);
    assert!(state.take_notifications().is_empty());
}

#[test]
fn new_analysis_cancels_previous_and_ignores_its_events() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::AnalyzeRequested { stream_id: 1 });
    let first = match effects.as_slice() {
        [Effect::OpenAnalysis { session, .. }] => *session,
        other => panic!("expected OpenAnalysis, got {other:?}"),
    };

    let (state, effects) = update(state, Msg::AnalyzeRequested { stream_id: 2 });
    let second = match effects.as_slice() {
        [Effect::CloseAnalysis { session: closed }, Effect::OpenAnalysis { session, stream_id: 2 }] => {
            assert_eq!(*closed, first);
            *session
        }
        other => panic!("expected CloseAnalysis + OpenAnalysis, got {other:?}"),
    };

    let (state, effects) = update(
        state,
        Msg::AnalysisEvent {
            session: first,
            event: data("stale"),
        },
    );
    assert!(effects.is_empty());

    let analysis = state.view().analysis.expect("analysis view");
    assert_eq!(analysis.session, second);
    assert!(analysis.transcript.is_empty());
}

#[test]
fn cancelled_analysis_gets_no_more_output() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::AnalyzeRequested { stream_id: 5 });
    let session = match effects.as_slice() {
        [Effect::OpenAnalysis { session, .. }] => *session,
        other => panic!("expected OpenAnalysis, got {other:?}"),
    };

    let (state, effects) = update(state, Msg::AnalysisCancelled);
    assert_eq!(effects, vec![Effect::CloseAnalysis { session }]);
    let (state, effects) = update(state, Msg::AnalysisCancelled);
    assert!(effects.is_empty());

    let (mut state, _) = update(
        state,
        Msg::AnalysisEvent {
            session,
            event: ChannelEvent::Error {
                ready_state: ReadyState::Open,
                message: "reset".to_string(),
            },
        },
    );
    let analysis = state.view().analysis.expect("analysis view");
    assert_eq!(analysis.phase, SessionPhase::Cancelled);
    assert!(analysis.transcript.is_empty());
    assert!(state.take_notifications().is_empty());
}

#[test]
fn transport_failure_surfaces_notification() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::AnalyzeRequested { stream_id: 5 });
    let session = match effects.as_slice() {
        [Effect::OpenAnalysis { session, .. }] => *session,
        other => panic!("expected OpenAnalysis, got {other:?}"),
    };

    let (mut state, effects) = update(
        state,
        Msg::AnalysisEvent {
            session,
            event: ChannelEvent::Error {
                ready_state: ReadyState::Connecting,
                message: "http status 503".to_string(),
            },
        },
    );

    assert_eq!(effects, vec![Effect::CloseAnalysis { session }]);
    let notifications = state.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, ErrorKind::StreamTransport);
}
