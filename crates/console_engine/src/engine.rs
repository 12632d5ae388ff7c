use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use console_core::{CreateRequest, PageRequest, SessionId, StreamId, Ticket};
use console_logging::{console_debug, console_info};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::analysis::stream_analysis;
use crate::monitor::poll_system;
use crate::{
    ApiClient, ApiError, ApiSettings, ChannelEventSink, EngineEvent, EventSink, FailureKind,
    StreamApi,
};

enum EngineCommand {
    FetchPage(PageRequest),
    FetchCatalog,
    Upload { ticket: Ticket, source: PathBuf },
    Create { ticket: Ticket, request: CreateRequest },
    OpenAnalysis { session: SessionId, stream_id: StreamId },
    CloseAnalysis { session: SessionId },
    ResolvePlayback { stream_id: StreamId },
    StartMonitor { interval: Duration },
    StopMonitor,
}

/// Runs backend IO on a dedicated thread with its own tokio runtime.
/// Commands go in through the handle, results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let idle_timeout = settings.stream_idle_timeout;
        let api = Arc::new(ApiClient::new(settings)?);
        Self::with_api(api, idle_timeout)
    }

    /// Drive the engine with any [`StreamApi`] implementation.
    pub fn with_api(
        api: Arc<dyn StreamApi>,
        idle_timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let runtime =
            Runtime::new().map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            let mut worker = Worker {
                api,
                sink,
                idle_timeout,
                sessions: HashMap::new(),
                monitor: None,
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(&runtime, command);
            }
            worker.shutdown();
            console_debug!("engine thread exiting");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch_page(&self, request: PageRequest) {
        self.send(EngineCommand::FetchPage(request));
    }

    pub fn fetch_catalog(&self) {
        self.send(EngineCommand::FetchCatalog);
    }

    pub fn upload(&self, ticket: Ticket, source: PathBuf) {
        self.send(EngineCommand::Upload { ticket, source });
    }

    pub fn create(&self, ticket: Ticket, request: CreateRequest) {
        self.send(EngineCommand::Create { ticket, request });
    }

    pub fn open_analysis(&self, session: SessionId, stream_id: StreamId) {
        self.send(EngineCommand::OpenAnalysis { session, stream_id });
    }

    pub fn close_analysis(&self, session: SessionId) {
        self.send(EngineCommand::CloseAnalysis { session });
    }

    pub fn resolve_playback(&self, stream_id: StreamId) {
        self.send(EngineCommand::ResolvePlayback { stream_id });
    }

    pub fn start_monitor(&self, interval: Duration) {
        self.send(EngineCommand::StartMonitor { interval });
    }

    pub fn stop_monitor(&self) {
        self.send(EngineCommand::StopMonitor);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

/// State owned by the engine thread.
struct Worker {
    api: Arc<dyn StreamApi>,
    sink: Arc<dyn EventSink>,
    idle_timeout: Option<Duration>,
    sessions: HashMap<SessionId, CancellationToken>,
    monitor: Option<CancellationToken>,
}

impl Worker {
    fn handle(&mut self, runtime: &Runtime, command: EngineCommand) {
        let api = self.api.clone();
        let sink = self.sink.clone();
        match command {
            EngineCommand::FetchPage(request) => {
                runtime.spawn(async move {
                    let result = api
                        .list_streams(request.page, request.page_size, &request.filter)
                        .await;
                    sink.emit(EngineEvent::PageLoaded { request, result });
                });
            }
            EngineCommand::FetchCatalog => {
                runtime.spawn(async move {
                    sink.emit(EngineEvent::CatalogLoaded(api.list_catalog().await));
                });
            }
            EngineCommand::Upload { ticket, source } => {
                runtime.spawn(async move {
                    let result = api.upload_asset(&source).await;
                    sink.emit(EngineEvent::UploadFinished { ticket, result });
                });
            }
            EngineCommand::Create { ticket, request } => {
                runtime.spawn(async move {
                    let result = api.create_stream(&request).await;
                    sink.emit(EngineEvent::StreamCreated { ticket, result });
                });
            }
            EngineCommand::OpenAnalysis { session, stream_id } => {
                let cancel = CancellationToken::new();
                if let Some(previous) = self.sessions.insert(session, cancel.clone()) {
                    previous.cancel();
                }
                console_info!("opening analysis session {} for stream {}", session, stream_id);
                runtime.spawn(stream_analysis(
                    api,
                    session,
                    stream_id,
                    self.idle_timeout,
                    cancel,
                    sink,
                ));
            }
            EngineCommand::CloseAnalysis { session } => {
                if let Some(cancel) = self.sessions.remove(&session) {
                    console_debug!("closing analysis session {}", session);
                    cancel.cancel();
                }
            }
            EngineCommand::ResolvePlayback { stream_id } => {
                runtime.spawn(async move {
                    let result = api.resolve_playback_url(stream_id).await;
                    sink.emit(EngineEvent::PlaybackResolved { stream_id, result });
                });
            }
            EngineCommand::StartMonitor { interval } => {
                if let Some(previous) = self.monitor.take() {
                    previous.cancel();
                }
                let cancel = CancellationToken::new();
                self.monitor = Some(cancel.clone());
                runtime.spawn(poll_system(api, interval, cancel, sink));
            }
            EngineCommand::StopMonitor => {
                if let Some(cancel) = self.monitor.take() {
                    cancel.cancel();
                }
            }
        }
    }

    fn shutdown(&mut self) {
        for (_, cancel) in self.sessions.drain() {
            cancel.cancel();
        }
        if let Some(cancel) = self.monitor.take() {
            cancel.cancel();
        }
    }
}
