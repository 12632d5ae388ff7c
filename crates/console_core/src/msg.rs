use std::path::PathBuf;
use std::time::Duration;

use crate::{
    CatalogEntry, ChannelEvent, Epoch, FilterKey, FormField, SessionId, StreamId, StreamRecord,
    SystemSnapshot, Ticket,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a category tab or submitted a keyword.
    FilterChanged(FilterKey),
    /// The list was scrolled near its end.
    LoadMore,
    /// Reload the current filter from page 1.
    Refresh,
    /// Engine delivered a page of the feed.
    PageLoaded {
        epoch: Epoch,
        page: u32,
        records: Vec<StreamRecord>,
        total: u64,
    },
    /// Engine failed to load a page of the feed.
    PageFailed {
        epoch: Epoch,
        page: u32,
        message: String,
    },
    CatalogRequested,
    CatalogLoaded(Vec<CatalogEntry>),
    CatalogFailed(String),
    /// User selected a local file to upload.
    UploadSelected(PathBuf),
    /// Engine finished an upload; `Ok` carries the server-assigned path.
    UploadFinished {
        ticket: Ticket,
        result: Result<String, String>,
    },
    /// User edited a create-form field.
    FormEdited(FormField),
    /// User submitted the create form.
    CreateSubmitted,
    /// Engine finished a create request; `Ok` carries the new stream id.
    CreateFinished {
        ticket: Ticket,
        result: Result<StreamId, String>,
    },
    /// User asked for a live analysis of a stream.
    AnalyzeRequested { stream_id: StreamId },
    /// User closed the analysis panel.
    AnalysisCancelled,
    /// Engine relayed an event from an analysis channel.
    AnalysisEvent {
        session: SessionId,
        event: ChannelEvent,
    },
    PlaybackRequested { stream_id: StreamId },
    PlaybackResolved {
        stream_id: StreamId,
        result: Result<String, String>,
    },
    MonitorStart { interval: Duration },
    MonitorStop,
    MonitorSample(Result<SystemSnapshot, String>),
    /// Idle tick from the app loop.
    Tick,
}
