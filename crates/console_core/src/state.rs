use std::collections::BTreeMap;
use std::mem;
use std::path::PathBuf;

use console_logging::{console_debug, console_info, console_warn};

use crate::view_model::{AnalysisView, AppViewModel, StreamRowView};
use crate::{
    AnalysisObserver, AnalysisSession, CatalogEntry, ChannelEvent, CreateForm, CreateRequest,
    Epoch, ErrorKind, FeedState, FilterKey, FormField, MonitorState, Notification, PageOutcome,
    PageRequest, SampleOutcome, SessionId, StreamId, StreamRecord, SystemSnapshot, Ticket,
    Transition, UploadOutcome, UploadSession,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    feed: FeedState,
    catalog: Vec<CatalogEntry>,
    upload: UploadSession,
    form: CreateForm,
    create_ticket: Ticket,
    creating: bool,
    last_created: Option<StreamId>,
    analysis: Option<AnalysisRun>,
    next_session: SessionId,
    playback: BTreeMap<StreamId, String>,
    monitor: MonitorState,
    notifications: Vec<Notification>,
    dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AnalysisRun {
    session: AnalysisSession,
    transcript: Vec<String>,
}

/// Collects a session's output into the app state.
struct TranscriptObserver<'a> {
    transcript: &'a mut Vec<String>,
    notifications: &'a mut Vec<Notification>,
}

impl AnalysisObserver for TranscriptObserver<'_> {
    fn on_message(&mut self, payload: &str) {
        self.transcript.push(payload.to_string());
    }

    fn on_error(&mut self, message: &str) {
        self.notifications
            .push(Notification::new(ErrorKind::StreamTransport, message));
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            feed: FeedState::new(page_size),
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            filter: self.feed.filter().cloned(),
            rows: self.feed.items().iter().map(StreamRowView::from).collect(),
            page: self.feed.page(),
            total: self.feed.total(),
            has_more: self.feed.has_more(),
            loading: self.feed.in_flight(),
            catalog: self.catalog.clone(),
            uploading: self.upload.uploading(),
            resolved_path: self.upload.resolved_path().map(ToOwned::to_owned),
            form: self.form.clone(),
            creating: self.creating,
            last_created: self.last_created,
            analysis: self.analysis.as_ref().map(|run| AnalysisView {
                session: run.session.id(),
                stream_id: run.session.stream_id(),
                phase: run.session.phase(),
                transcript: run.transcript.clone(),
            }),
            playback: self
                .playback
                .iter()
                .map(|(id, url)| (*id, url.clone()))
                .collect(),
            monitor_status: self.monitor.status(),
            monitor_failures: self.monitor.consecutive_failures(),
            system: self.monitor.latest().cloned(),
            notifications: self.notifications.clone(),
            dirty: self.dirty,
        }
    }

    pub fn feed(&self) -> &FeedState {
        &self.feed
    }

    pub fn items(&self) -> &[StreamRecord] {
        self.feed.items()
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        mem::take(&mut self.dirty)
    }

    /// Drain the notifications raised since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        mem::take(&mut self.notifications)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn notify(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let notification = Notification::new(kind, message);
        console_warn!("{}", notification);
        self.notifications.push(notification);
        self.mark_dirty();
    }

    // ── Feed ──────────────────────────────────────────────────────────────

    pub(crate) fn set_filter(&mut self, key: FilterKey) -> Option<PageRequest> {
        let request = self.feed.set_filter(key)?;
        console_debug!(
            "filter changed, epoch={} filter={:?}",
            request.epoch,
            request.filter
        );
        self.mark_dirty();
        Some(request)
    }

    pub(crate) fn refresh_feed(&mut self) -> Option<PageRequest> {
        let request = self.feed.refresh()?;
        self.mark_dirty();
        Some(request)
    }

    pub(crate) fn load_more(&mut self) -> Option<PageRequest> {
        let request = self.feed.load_more()?;
        self.mark_dirty();
        Some(request)
    }

    pub(crate) fn apply_page(
        &mut self,
        epoch: Epoch,
        page: u32,
        records: Vec<StreamRecord>,
        total: u64,
    ) {
        if self.feed.apply_page(epoch, page, records, total) != PageOutcome::Stale {
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_page_failure(&mut self, epoch: Epoch, page: u32, message: String) {
        if self.feed.apply_failure(epoch, page) == PageOutcome::Failed {
            self.notify(ErrorKind::Fetch, format!("page {page}: {message}"));
        }
    }

    // ── Catalog ───────────────────────────────────────────────────────────

    pub(crate) fn set_catalog(&mut self, entries: Vec<CatalogEntry>) {
        self.catalog = entries;
        self.mark_dirty();
    }

    pub(crate) fn catalog_failed(&mut self, message: String) {
        self.notify(ErrorKind::Fetch, format!("catalog: {message}"));
    }

    // ── Upload / create ───────────────────────────────────────────────────

    pub(crate) fn begin_upload(&mut self, source: PathBuf) -> Ticket {
        self.mark_dirty();
        self.upload.begin(source)
    }

    pub(crate) fn finish_upload(&mut self, ticket: Ticket, result: Result<String, String>) {
        match self.upload.finish(ticket, result) {
            UploadOutcome::Resolved(path) => {
                console_info!("upload {} stored at {}", ticket, path);
                self.form.path = path;
                self.mark_dirty();
            }
            UploadOutcome::Failed(message) => self.notify(ErrorKind::Upload, message),
            UploadOutcome::Superseded => {
                console_debug!("ignoring superseded upload {}", ticket);
            }
        }
    }

    pub(crate) fn edit_form(&mut self, field: FormField) {
        self.form.apply(field);
        self.mark_dirty();
    }

    pub(crate) fn submit_create(&mut self) -> Option<(Ticket, CreateRequest)> {
        if self.creating {
            return None;
        }
        match self.form.validate() {
            Ok(request) => {
                self.create_ticket += 1;
                self.creating = true;
                self.mark_dirty();
                Some((self.create_ticket, request))
            }
            Err(missing) => {
                self.notify(
                    ErrorKind::Validation,
                    format!("missing required fields: {}", missing.join(", ")),
                );
                None
            }
        }
    }

    /// Returns the feed reload to issue after a successful create.
    pub(crate) fn finish_create(
        &mut self,
        ticket: Ticket,
        result: Result<StreamId, String>,
    ) -> Option<PageRequest> {
        if !self.creating || ticket != self.create_ticket {
            return None;
        }
        self.creating = false;
        match result {
            Ok(id) => {
                console_info!("created stream {}", id);
                self.last_created = Some(id);
                self.form = CreateForm::default();
                self.upload.reset();
                self.mark_dirty();
                self.feed.refresh()
            }
            Err(message) => {
                self.notify(ErrorKind::Create, message);
                None
            }
        }
    }

    // ── Analysis ──────────────────────────────────────────────────────────

    /// Start a new session. Returns the session to close (if one was still
    /// open) and the id of the new one.
    pub(crate) fn open_analysis(&mut self, stream_id: StreamId) -> (Option<SessionId>, SessionId) {
        let previous = self.cancel_analysis();
        self.next_session += 1;
        let id = self.next_session;
        self.analysis = Some(AnalysisRun {
            session: AnalysisSession::open(id, stream_id),
            transcript: Vec::new(),
        });
        self.mark_dirty();
        (previous, id)
    }

    /// Returns the session whose channel must be closed, if any.
    pub(crate) fn cancel_analysis(&mut self) -> Option<SessionId> {
        let run = self.analysis.as_mut()?;
        if run.session.cancel() {
            self.dirty = true;
            Some(run.session.id())
        } else {
            None
        }
    }

    /// Returns the session whose channel must be closed, if the event ended it.
    pub(crate) fn analysis_event(
        &mut self,
        session: SessionId,
        event: ChannelEvent,
    ) -> Option<SessionId> {
        let Some(run) = self
            .analysis
            .as_mut()
            .filter(|run| run.session.id() == session)
        else {
            console_debug!("dropping event for inactive analysis session {}", session);
            return None;
        };

        let AnalysisRun {
            session: active,
            transcript,
        } = run;
        let mut observer = TranscriptObserver {
            transcript,
            notifications: &mut self.notifications,
        };
        let transition = active.handle(event, &mut observer);
        self.dirty = true;
        match transition {
            Transition::Continue => None,
            Transition::Close(phase) => {
                console_debug!("analysis session {} ended: {:?}", session, phase);
                Some(session)
            }
        }
    }

    // ── Playback ──────────────────────────────────────────────────────────

    pub(crate) fn playback_resolved(&mut self, stream_id: StreamId, result: Result<String, String>) {
        match result {
            Ok(url) => {
                self.playback.insert(stream_id, url);
                self.mark_dirty();
            }
            Err(message) => self.notify(
                ErrorKind::Fetch,
                format!("playback for stream {stream_id}: {message}"),
            ),
        }
    }

    // ── Monitor ───────────────────────────────────────────────────────────

    pub(crate) fn start_monitor(&mut self) -> bool {
        let started = self.monitor.start();
        if started {
            self.mark_dirty();
        }
        started
    }

    pub(crate) fn stop_monitor(&mut self) -> bool {
        let stopped = self.monitor.stop();
        if stopped {
            self.mark_dirty();
        }
        stopped
    }

    /// Returns `true` when the monitor gave up and its poller must stop.
    pub(crate) fn monitor_sample(&mut self, sample: Result<SystemSnapshot, String>) -> bool {
        let message = sample.as_ref().err().cloned();
        match self.monitor.record(sample) {
            SampleOutcome::Recorded => {
                self.mark_dirty();
                false
            }
            SampleOutcome::Missed => {
                console_debug!(
                    "monitor poll failed ({} in a row): {}",
                    self.monitor.consecutive_failures(),
                    message.unwrap_or_default()
                );
                self.mark_dirty();
                false
            }
            SampleOutcome::GaveUp => {
                self.notify(
                    ErrorKind::Fetch,
                    format!(
                        "system monitor stopped after {} failed polls",
                        self.monitor.consecutive_failures()
                    ),
                );
                true
            }
            SampleOutcome::Ignored => false,
        }
    }
}
