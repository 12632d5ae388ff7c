use crate::{
    CatalogEntry, CreateForm, FilterKey, MonitorStatus, Notification, SessionId, SessionPhase,
    StreamId, StreamRecord, SystemSnapshot, TransportType,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub filter: Option<FilterKey>,
    pub rows: Vec<StreamRowView>,
    pub page: u32,
    pub total: u64,
    pub has_more: bool,
    pub loading: bool,
    pub catalog: Vec<CatalogEntry>,
    pub uploading: bool,
    pub resolved_path: Option<String>,
    pub form: CreateForm,
    pub creating: bool,
    pub last_created: Option<StreamId>,
    pub analysis: Option<AnalysisView>,
    pub playback: Vec<(StreamId, String)>,
    pub monitor_status: MonitorStatus,
    pub monitor_failures: u32,
    pub system: Option<SystemSnapshot>,
    pub notifications: Vec<Notification>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRowView {
    pub id: StreamId,
    pub name: String,
    pub transport: TransportType,
    pub path: String,
    pub scenario: Option<String>,
    pub created_at: i64,
}

impl From<&StreamRecord> for StreamRowView {
    fn from(record: &StreamRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            transport: record.transport_type,
            path: record.transport_path.clone(),
            scenario: record.scenario_name.clone(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisView {
    pub session: SessionId,
    pub stream_id: StreamId,
    pub phase: SessionPhase,
    pub transcript: Vec<String>,
}
