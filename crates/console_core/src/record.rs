/// Identifier of a stream as assigned by the backend.
pub type StreamId = i64;

/// How a stream's media is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportType {
    /// A stored media file (upload or bare file name).
    #[default]
    File,
    /// A network stream (RTSP, HTTP and similar URIs).
    Stream,
}

impl TransportType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportType::File => "file",
            TransportType::Stream => "stream",
        }
    }

    /// Parses the backend's `stream_type` tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "file" => Some(TransportType::File),
            "stream" => Some(TransportType::Stream),
            _ => None,
        }
    }
}

/// Classify a transport path by its shape.
///
/// Anything containing `/` is treated as a stream URI, everything else as a
/// file name. This is a textual heuristic: a bare hostname such as
/// `camera-01.local` classifies as a file.
pub fn infer_transport_type(path: &str) -> TransportType {
    if path.contains('/') {
        TransportType::Stream
    } else {
        TransportType::File
    }
}

/// One media stream as listed by the backend. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    pub id: StreamId,
    pub name: String,
    pub transport_path: String,
    pub transport_type: TransportType,
    pub description: Option<String>,
    /// Creation time in unix seconds.
    pub created_at: i64,
    pub scenario_id: Option<i64>,
    pub scenario_name: Option<String>,
}

/// A filter category with the number of streams it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub category_id: i64,
    pub category_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GpuLoad {
    pub name: String,
    pub load_percent: f64,
    pub memory_percent: f64,
}

/// One sample of the platform host's health.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SystemSnapshot {
    pub hostname: String,
    pub cpu_percent: f64,
    pub cpu_cores: u32,
    pub load_avg: Vec<f64>,
    pub memory_percent: f64,
    pub memory_used_gb: f64,
    pub memory_total_gb: f64,
    pub gpus: Vec<GpuLoad>,
}
