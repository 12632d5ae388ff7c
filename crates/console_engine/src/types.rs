use std::fmt;

use console_core::{
    CatalogEntry, ChannelEvent, PageRequest, SessionId, StreamId, StreamRecord, SystemSnapshot,
    Ticket,
};

/// One page of the stream listing as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamPage {
    pub records: Vec<StreamRecord>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PageLoaded {
        request: PageRequest,
        result: Result<StreamPage, ApiError>,
    },
    CatalogLoaded(Result<Vec<CatalogEntry>, ApiError>),
    UploadFinished {
        ticket: Ticket,
        result: Result<String, ApiError>,
    },
    StreamCreated {
        ticket: Ticket,
        result: Result<StreamId, ApiError>,
    },
    Analysis {
        session: SessionId,
        event: ChannelEvent,
    },
    PlaybackResolved {
        stream_id: StreamId,
        result: Result<String, ApiError>,
    },
    SystemSample(Result<SystemSnapshot, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// The envelope carried a non-success `code`.
    Backend { code: i64 },
    Decode,
    /// A success envelope without the expected `data`.
    MissingData,
    Io,
    TooLarge { max_bytes: u64, actual: u64 },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Backend { code } => write!(f, "backend error {code}"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::MissingData => write!(f, "response without data"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "too large (max {max_bytes} bytes, got {actual})")
            }
        }
    }
}
