use std::path::PathBuf;
use std::time::Duration;

use crate::{CreateRequest, PageRequest, SessionId, StreamId, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage(PageRequest),
    FetchCatalog,
    UploadAsset { ticket: Ticket, source: PathBuf },
    CreateStream { ticket: Ticket, request: CreateRequest },
    OpenAnalysis { session: SessionId, stream_id: StreamId },
    /// Close an analysis channel. Closing an already closed session is a no-op.
    CloseAnalysis { session: SessionId },
    ResolvePlayback { stream_id: StreamId },
    StartMonitor { interval: Duration },
    StopMonitor,
}
