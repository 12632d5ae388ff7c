use std::time::Duration;

use console_core::{Effect, Msg};
use console_engine::{ApiError, ApiSettings, EngineEvent, EngineHandle};
use console_logging::{console_debug, console_info, console_warn};

/// Hands core effects to the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        console_info!("backend at {}", settings.base_url);
        Ok(Self {
            engine: EngineHandle::new(settings)?,
        })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            console_debug!("effect {:?}", effect);
            match effect {
                Effect::FetchPage(request) => self.engine.fetch_page(request),
                Effect::FetchCatalog => self.engine.fetch_catalog(),
                Effect::UploadAsset { ticket, source } => self.engine.upload(ticket, source),
                Effect::CreateStream { ticket, request } => self.engine.create(ticket, request),
                Effect::OpenAnalysis { session, stream_id } => {
                    self.engine.open_analysis(session, stream_id)
                }
                Effect::CloseAnalysis { session } => self.engine.close_analysis(session),
                Effect::ResolvePlayback { stream_id } => self.engine.resolve_playback(stream_id),
                Effect::StartMonitor { interval } => self.engine.start_monitor(interval),
                Effect::StopMonitor => self.engine.stop_monitor(),
            }
        }
    }

    /// Wait up to `timeout` for the next engine result.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(event_to_msg)
    }
}

pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PageLoaded { request, result } => match result {
            Ok(page) => Msg::PageLoaded {
                epoch: request.epoch,
                page: request.page,
                records: page.records,
                total: page.total,
            },
            Err(err) => Msg::PageFailed {
                epoch: request.epoch,
                page: request.page,
                message: err.to_string(),
            },
        },
        EngineEvent::CatalogLoaded(result) => match result {
            Ok(entries) => Msg::CatalogLoaded(entries),
            Err(err) => Msg::CatalogFailed(err.to_string()),
        },
        EngineEvent::UploadFinished { ticket, result } => Msg::UploadFinished {
            ticket,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::StreamCreated { ticket, result } => Msg::CreateFinished {
            ticket,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::Analysis { session, event } => Msg::AnalysisEvent { session, event },
        EngineEvent::PlaybackResolved { stream_id, result } => Msg::PlaybackResolved {
            stream_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::SystemSample(result) => Msg::MonitorSample(result.map_err(|err| {
            console_warn!("system info poll failed: {}", err);
            err.to_string()
        })),
    }
}
