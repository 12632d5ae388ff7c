use std::mem;
use std::time::{Duration, Instant};

use console_core::{
    update, AppState, FilterKey, FormField, MonitorStatus, Msg, SessionPhase, StreamId,
};
use console_engine::ApiError;
use console_logging::console_debug;

use crate::cli::{AddArgs, Command};
use crate::config::ConsoleConfig;
use crate::effects::EffectRunner;
use crate::render;

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    Failed(String),
    #[error("no reply from the backend within {0:?}")]
    NoReply(Duration),
}

/// Headless driver: feeds engine results through `update` and prints the view.
pub struct Console {
    state: AppState,
    runner: EffectRunner,
    reply_timeout: Duration,
    monitor_interval: Duration,
}

impl Console {
    pub fn new(config: &ConsoleConfig) -> Result<Self, ApiError> {
        let settings = config.api_settings();
        let reply_timeout = settings.connect_timeout + settings.request_timeout + Duration::from_secs(5);
        Ok(Self {
            state: AppState::with_page_size(config.page_size),
            runner: EffectRunner::new(settings)?,
            reply_timeout,
            monitor_interval: config.monitor_interval(),
        })
    }

    pub fn execute(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::List {
                category,
                keyword,
                pages,
            } => self.list(FilterKey::new(category, keyword.as_deref()), pages),
            Command::Catalog => self.catalog(),
            Command::Add(args) => self.add(args),
            Command::Analyze { id } => self.analyze(id),
            Command::Play { id } => self.play(id),
            Command::Monitor { polls } => self.monitor(polls),
        }
    }

    /// Apply one message and hand its effects to the engine. Returns the
    /// number of effects issued.
    fn dispatch(&mut self, msg: Msg) -> usize {
        let (state, effects) = update(mem::take(&mut self.state), msg);
        self.state = state;
        let issued = effects.len();
        self.runner.run(effects);
        issued
    }

    /// Pump engine results until one matching `done` has been applied.
    fn wait_for(&mut self, done: impl Fn(&Msg) -> bool) -> Result<(), CommandError> {
        let deadline = Instant::now() + self.reply_timeout;
        loop {
            match self.runner.next_msg(TICK) {
                Some(msg) => {
                    let finished = done(&msg);
                    self.dispatch(msg);
                    if finished {
                        return Ok(());
                    }
                }
                None if Instant::now() >= deadline => {
                    return Err(CommandError::NoReply(self.reply_timeout))
                }
                None => {
                    self.dispatch(Msg::Tick);
                }
            }
        }
    }

    /// Print pending notifications; any of them fails the command.
    fn check_notifications(&mut self) -> Result<(), CommandError> {
        let notifications = self.state.take_notifications();
        if notifications.is_empty() {
            return Ok(());
        }
        let message = notifications
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(CommandError::Failed(message))
    }

    fn list(&mut self, filter: FilterKey, pages: u32) -> Result<(), CommandError> {
        if self.dispatch(Msg::FilterChanged(filter)) > 0 {
            self.wait_for(|msg| matches!(msg, Msg::PageLoaded { .. } | Msg::PageFailed { .. }))?;
            self.check_notifications()?;
        }
        for _ in 1..pages.max(1) {
            if self.dispatch(Msg::LoadMore) == 0 {
                break;
            }
            self.wait_for(|msg| matches!(msg, Msg::PageLoaded { .. } | Msg::PageFailed { .. }))?;
            self.check_notifications()?;
        }

        let view = self.state.view();
        for row in &view.rows {
            println!("{}", render::stream_row(row));
        }
        println!("{}", render::feed_footer(&view));
        Ok(())
    }

    fn catalog(&mut self) -> Result<(), CommandError> {
        self.dispatch(Msg::CatalogRequested);
        self.wait_for(|msg| matches!(msg, Msg::CatalogLoaded(_) | Msg::CatalogFailed(_)))?;
        self.check_notifications()?;
        for entry in &self.state.view().catalog {
            println!("{}", render::catalog_row(entry));
        }
        Ok(())
    }

    fn add(&mut self, args: AddArgs) -> Result<(), CommandError> {
        self.dispatch(Msg::FormEdited(FormField::Name(args.name)));
        self.dispatch(Msg::FormEdited(FormField::ScenarioId(Some(args.scenario))));
        self.dispatch(Msg::FormEdited(FormField::AlgoId(args.algo)));
        if let Some(description) = args.description {
            self.dispatch(Msg::FormEdited(FormField::Description(description)));
        }

        if let Some(file) = args.file {
            self.dispatch(Msg::UploadSelected(file));
            self.wait_for(|msg| matches!(msg, Msg::UploadFinished { .. }))?;
            self.check_notifications()?;
            if let Some(stored) = self.state.view().resolved_path {
                println!("uploaded as {stored}");
            }
        }
        if let Some(path) = args.path {
            self.dispatch(Msg::FormEdited(FormField::Path(path)));
        }

        if self.dispatch(Msg::CreateSubmitted) == 0 {
            self.check_notifications()?;
            return Err(CommandError::Failed("create was not submitted".into()));
        }
        self.wait_for(|msg| matches!(msg, Msg::CreateFinished { .. }))?;
        self.check_notifications()?;
        if let Some(id) = self.state.view().last_created {
            println!("created stream {id}");
        }
        Ok(())
    }

    fn analyze(&mut self, stream_id: StreamId) -> Result<(), CommandError> {
        self.dispatch(Msg::AnalyzeRequested { stream_id });
        let mut printed = 0;
        let phase = loop {
            match self.runner.next_msg(TICK) {
                Some(msg) => self.dispatch(msg),
                None => self.dispatch(Msg::Tick),
            };
            if !self.state.consume_dirty() {
                continue;
            }
            let Some(analysis) = self.state.view().analysis else {
                break SessionPhase::Idle;
            };
            for line in &analysis.transcript[printed..] {
                println!("{line}");
            }
            printed = analysis.transcript.len();
            if analysis.phase.is_terminal() {
                break analysis.phase;
            }
        };
        console_debug!("analysis of stream {} ended: {:?}", stream_id, phase);
        self.check_notifications()
    }

    fn play(&mut self, stream_id: StreamId) -> Result<(), CommandError> {
        self.dispatch(Msg::PlaybackRequested { stream_id });
        self.wait_for(|msg| matches!(msg, Msg::PlaybackResolved { .. }))?;
        self.check_notifications()?;
        let view = self.state.view();
        match view.playback.iter().find(|(id, _)| *id == stream_id) {
            Some((_, url)) => {
                println!("{url}");
                Ok(())
            }
            None => Err(CommandError::Failed(format!(
                "no playback url for stream {stream_id}"
            ))),
        }
    }

    fn monitor(&mut self, polls: u32) -> Result<(), CommandError> {
        self.dispatch(Msg::MonitorStart {
            interval: self.monitor_interval,
        });
        let mut samples = 0;
        loop {
            let Some(msg) = self.runner.next_msg(TICK) else {
                self.dispatch(Msg::Tick);
                continue;
            };
            let is_sample = matches!(msg, Msg::MonitorSample(_));
            let ok = matches!(msg, Msg::MonitorSample(Ok(_)));
            self.dispatch(msg);
            if !is_sample {
                continue;
            }

            samples += 1;
            let view = self.state.view();
            if view.monitor_status == MonitorStatus::Failed {
                return self.check_notifications();
            }
            match (&view.system, ok) {
                (Some(snapshot), true) => println!("{}", render::system_line(snapshot)),
                _ => eprintln!("poll failed ({} in a row)", view.monitor_failures),
            }
            if polls > 0 && samples >= polls {
                self.dispatch(Msg::MonitorStop);
                return Ok(());
            }
        }
    }
}
