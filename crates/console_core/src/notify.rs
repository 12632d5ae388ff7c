use std::fmt;

/// User-facing failure categories. All of them are recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Loading a feed page, the catalog, a playback URL or a monitor sample failed.
    Fetch,
    Upload,
    /// Local check before any request was made.
    Validation,
    Create,
    /// The analysis channel failed mid-session.
    StreamTransport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Fetch => write!(f, "failed to load data"),
            ErrorKind::Upload => write!(f, "upload failed"),
            ErrorKind::Validation => write!(f, "invalid input"),
            ErrorKind::Create => write!(f, "failed to create stream"),
            ErrorKind::StreamTransport => write!(f, "analysis stream failed"),
        }
    }
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: ErrorKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
