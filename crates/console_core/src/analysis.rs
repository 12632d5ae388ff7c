//! Live analysis session over a server-push channel.
//!
//! ```text
//!  Idle -> Open -> Completed   (sentinel frame)
//!               -> Closed      (server ended the channel without a sentinel)
//!               -> Errored     (transport failure while connecting/open)
//!               -> Cancelled   (caller closed the session)
//! ```
//!
//! The session only decides what the caller sees; the transport itself lives
//! in the engine. Once a terminal phase is reached no observer method is
//! called again, whatever the channel still delivers.

use crate::StreamId;

pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Open,
    Completed,
    /// Ended by the server without a sentinel. No observer callback.
    Closed,
    Errored,
    Cancelled,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionPhase::Completed
                | SessionPhase::Closed
                | SessionPhase::Errored
                | SessionPhase::Cancelled
        )
    }
}

/// A decoded channel payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data(String),
    /// Completion sentinel.
    Done,
}

/// Readiness of the underlying channel when it reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Frame(Frame),
    Error {
        ready_state: ReadyState,
        message: String,
    },
    /// The server ended the channel without a sentinel.
    Closed,
}

/// Receives a session's output. Only `on_message` is mandatory.
/// `on_complete` fires only for the sentinel.
pub trait AnalysisObserver {
    fn on_message(&mut self, payload: &str);

    fn on_complete(&mut self) {}

    fn on_error(&mut self, _message: &str) {}
}

/// Result of feeding one channel event into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Still open (or the event was ignored).
    Continue,
    /// The session just became terminal; the channel must be closed now.
    Close(SessionPhase),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSession {
    id: SessionId,
    stream_id: StreamId,
    phase: SessionPhase,
}

impl AnalysisSession {
    pub fn open(id: SessionId, stream_id: StreamId) -> Self {
        Self {
            id,
            stream_id,
            phase: SessionPhase::Open,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == SessionPhase::Open
    }

    pub fn handle(
        &mut self,
        event: ChannelEvent,
        observer: &mut dyn AnalysisObserver,
    ) -> Transition {
        if !self.is_open() {
            return Transition::Continue;
        }

        match event {
            ChannelEvent::Frame(Frame::Data(payload)) => {
                observer.on_message(&payload);
                Transition::Continue
            }
            ChannelEvent::Frame(Frame::Done) => {
                self.phase = SessionPhase::Completed;
                observer.on_complete();
                Transition::Close(SessionPhase::Completed)
            }
            // An error on a closed channel is a side effect of a normal close.
            ChannelEvent::Closed
            | ChannelEvent::Error {
                ready_state: ReadyState::Closed,
                ..
            } => {
                self.phase = SessionPhase::Closed;
                Transition::Close(SessionPhase::Closed)
            }
            ChannelEvent::Error { message, .. } => {
                self.phase = SessionPhase::Errored;
                observer.on_error(&message);
                Transition::Close(SessionPhase::Errored)
            }
        }
    }

    /// Close the session from the caller's side. Returns `true` if this call
    /// ended the session and the channel still has to be closed.
    pub fn cancel(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.phase = SessionPhase::Cancelled;
        true
    }
}
