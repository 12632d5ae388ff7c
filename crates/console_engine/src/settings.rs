use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Backend root, e.g. `http://localhost:8000`. Paths are appended to it.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Deadline for every REST call. The analysis channel is exempt.
    pub request_timeout: Duration,
    pub max_upload_bytes: u64,
    /// Upper bound for one buffered analysis event, line ends included.
    pub max_event_bytes: usize,
    /// Give up on an analysis channel that stays silent this long.
    pub stream_idle_timeout: Option<Duration>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_upload_bytes: 512 * 1024 * 1024,
            max_event_bytes: 1024 * 1024,
            stream_idle_timeout: None,
        }
    }
}
