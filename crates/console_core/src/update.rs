use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilterChanged(key) => state
            .set_filter(key)
            .map(Effect::FetchPage)
            .into_iter()
            .collect(),
        Msg::LoadMore => state
            .load_more()
            .map(Effect::FetchPage)
            .into_iter()
            .collect(),
        Msg::Refresh => state
            .refresh_feed()
            .map(Effect::FetchPage)
            .into_iter()
            .collect(),
        Msg::PageLoaded {
            epoch,
            page,
            records,
            total,
        } => {
            state.apply_page(epoch, page, records, total);
            Vec::new()
        }
        Msg::PageFailed {
            epoch,
            page,
            message,
        } => {
            state.apply_page_failure(epoch, page, message);
            Vec::new()
        }
        Msg::CatalogRequested => vec![Effect::FetchCatalog],
        Msg::CatalogLoaded(entries) => {
            state.set_catalog(entries);
            Vec::new()
        }
        Msg::CatalogFailed(message) => {
            state.catalog_failed(message);
            Vec::new()
        }
        Msg::UploadSelected(source) => {
            let ticket = state.begin_upload(source.clone());
            vec![Effect::UploadAsset { ticket, source }]
        }
        Msg::UploadFinished { ticket, result } => {
            state.finish_upload(ticket, result);
            Vec::new()
        }
        Msg::FormEdited(field) => {
            state.edit_form(field);
            Vec::new()
        }
        Msg::CreateSubmitted => state
            .submit_create()
            .map(|(ticket, request)| Effect::CreateStream { ticket, request })
            .into_iter()
            .collect(),
        Msg::CreateFinished { ticket, result } => state
            .finish_create(ticket, result)
            .map(Effect::FetchPage)
            .into_iter()
            .collect(),
        Msg::AnalyzeRequested { stream_id } => {
            let (previous, session) = state.open_analysis(stream_id);
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = previous {
                effects.push(Effect::CloseAnalysis { session: previous });
            }
            effects.push(Effect::OpenAnalysis { session, stream_id });
            effects
        }
        Msg::AnalysisCancelled => state
            .cancel_analysis()
            .map(|session| Effect::CloseAnalysis { session })
            .into_iter()
            .collect(),
        Msg::AnalysisEvent { session, event } => state
            .analysis_event(session, event)
            .map(|session| Effect::CloseAnalysis { session })
            .into_iter()
            .collect(),
        Msg::PlaybackRequested { stream_id } => vec![Effect::ResolvePlayback { stream_id }],
        Msg::PlaybackResolved { stream_id, result } => {
            state.playback_resolved(stream_id, result);
            Vec::new()
        }
        Msg::MonitorStart { interval } => {
            if state.start_monitor() {
                vec![Effect::StartMonitor { interval }]
            } else {
                Vec::new()
            }
        }
        Msg::MonitorStop => {
            if state.stop_monitor() {
                vec![Effect::StopMonitor]
            } else {
                Vec::new()
            }
        }
        Msg::MonitorSample(sample) => {
            if state.monitor_sample(sample) {
                vec![Effect::StopMonitor]
            } else {
                Vec::new()
            }
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
