//! Console core: pure state machine for the stream feed, the upload/create
//! pipeline, live analysis sessions and the system monitor.
mod analysis;
mod effect;
mod feed;
mod filter;
mod monitor;
mod msg;
mod notify;
mod record;
mod state;
mod update;
mod upload;
mod view_model;

pub use analysis::{
    AnalysisObserver, AnalysisSession, ChannelEvent, Frame, ReadyState, SessionId, SessionPhase,
    Transition,
};
pub use effect::Effect;
pub use feed::{Epoch, FeedState, PageOutcome, PageRequest, DEFAULT_PAGE_SIZE};
pub use filter::FilterKey;
pub use monitor::{
    MonitorState, MonitorStatus, SampleOutcome, MONITOR_INTERVAL, MONITOR_MAX_FAILURES,
};
pub use msg::Msg;
pub use notify::{ErrorKind, Notification};
pub use record::{
    infer_transport_type, CatalogEntry, GpuLoad, StreamId, StreamRecord, SystemSnapshot,
    TransportType,
};
pub use state::AppState;
pub use update::update;
pub use upload::{CreateForm, CreateRequest, FormField, Ticket, UploadOutcome, UploadSession};
pub use view_model::{AnalysisView, AppViewModel, StreamRowView};
