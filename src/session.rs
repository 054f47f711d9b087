//! A writing session: one buffer, one target file, one autosave schedule.
//!
//! The session is driven from a single task. Writes run on spawned tasks and report back
//! through a channel; the buffer keeps accepting edits while a write is in flight.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::autosave::{AutosaveScheduler, SaveTrigger, WriteTicket};
use crate::config::SessionConfig;
use crate::error::GatewayError;
use crate::gateway::PersistenceGateway;
use crate::input::classify;
use crate::memory::{PathMemory, PATH_MEMORY_KEY};
use crate::model::{Buffer, DisplayState, Intent, Mode, RawInput, Selection};
use crate::policy::{evaluate, navigate, Outcome};
use crate::status::{filename, word_count, StatusLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Input(RawInput),
    Intent(Intent),
    Select { start: usize, end: usize },
    SetMode(Mode),
    ToggleCorrections,
    Stop,
}

/// Receives the status line whenever it changes.
pub trait StatusSink {
    fn render(&mut self, line: &StatusLine);
}

impl<F: FnMut(&StatusLine)> StatusSink for F {
    fn render(&mut self, line: &StatusLine) {
        self(line)
    }
}

#[derive(Debug)]
struct WriteCompletion {
    trigger: SaveTrigger,
    result: Result<(), GatewayError>,
}

pub struct Session {
    gateway: Arc<dyn PersistenceGateway>,
    memory: Box<dyn PathMemory>,
    config: SessionConfig,
    display: DisplayState,
    buffer: Buffer,
    selection: Selection,
    mode: Mode,
    scheduler: AutosaveScheduler,
    last_cut: Option<String>,
    completions_tx: mpsc::UnboundedSender<WriteCompletion>,
    completions_rx: mpsc::UnboundedReceiver<WriteCompletion>,
    stopped: bool,
}

impl Session {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        memory: Box<dyn PathMemory>,
        config: SessionConfig,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            memory,
            scheduler: AutosaveScheduler::new(config.autosave()),
            config,
            display: DisplayState::Initializing,
            buffer: Buffer::new(),
            selection: Selection::default(),
            mode: Mode::default(),
            last_cut: None,
            completions_tx,
            completions_rx,
            stopped: false,
        }
    }

    // ------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------

    /// Resolve the target file: remembered path first, then the prompt.
    pub async fn initialize(&mut self) -> DisplayState {
        self.display = DisplayState::Initializing;

        if let Some(path) = self.recall_path() {
            match self.gateway.read_text(&path).await {
                Ok(content) => {
                    info!(path = %path.display(), "reopened remembered document");
                    self.buffer = Buffer::from(content);
                    self.selection = Selection::caret(self.buffer.len());
                    self.adopt_target(path);
                    self.scheduler.mark_saved(Instant::now());
                    self.display = DisplayState::Ready;
                    return self.display;
                }
                Err(err) => {
                    warn!(error = %err, "remembered document unavailable; prompting again");
                    if let Err(err) = self.memory.clear(PATH_MEMORY_KEY) {
                        warn!(error = %err, "failed to clear remembered path");
                    }
                }
            }
        }

        self.prompt_for_location().await
    }

    /// Re-run initialization. Only meaningful from the no-file state.
    pub async fn restart(&mut self) -> DisplayState {
        if self.display != DisplayState::NoFile {
            return self.display;
        }
        self.initialize().await
    }

    fn recall_path(&self) -> Option<PathBuf> {
        match self.memory.get(PATH_MEMORY_KEY) {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "failed to read remembered path");
                None
            }
        }
    }

    async fn prompt_for_location(&mut self) -> DisplayState {
        let Some(path) = self
            .gateway
            .prompt_save_location(&self.config.prompt)
            .await
        else {
            info!("no save location chosen");
            self.display = DisplayState::NoFile;
            return self.display;
        };

        if let Err(err) = self.memory.set(PATH_MEMORY_KEY, &path) {
            warn!(error = %err, "failed to remember document path");
        }
        self.adopt_target(path.clone());

        match self.gateway.write_text(&path, "").await {
            Ok(()) => {
                info!(path = %path.display(), "created document");
                self.scheduler.mark_saved(Instant::now());
            }
            Err(err) => {
                warn!(error = %err, "failed to create document");
                self.scheduler.note_failure();
            }
        }

        self.display = DisplayState::Ready;
        self.display
    }

    fn adopt_target(&mut self, path: PathBuf) {
        self.scheduler.arm(path, Instant::now());
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Input(raw) => {
                self.handle_input(&raw);
            }
            SessionEvent::Intent(intent) => {
                self.handle_intent(&intent);
            }
            SessionEvent::Select { start, end } => self.select(start, end),
            SessionEvent::SetMode(mode) => self.set_mode(mode),
            SessionEvent::ToggleCorrections => self.set_mode(self.mode.toggled()),
            SessionEvent::Stop => {}
        }
    }

    pub fn handle_input(&mut self, raw: &RawInput) -> Outcome {
        self.handle_intent(&classify(raw))
    }

    pub fn handle_intent(&mut self, intent: &Intent) -> Outcome {
        let outcome = evaluate(&self.buffer, self.selection, self.mode, intent);

        match &outcome {
            Outcome::Apply(edit) => {
                let removed = edit.apply(&mut self.buffer);
                if matches!(intent, Intent::Cut) {
                    self.last_cut = Some(removed);
                }
                self.selection = Selection::caret(edit.cursor);
                if let Some(ticket) = self.scheduler.record_edit(Instant::now()) {
                    self.dispatch(ticket);
                }
            }
            Outcome::Suppressed => {
                debug!(?intent, "edit suppressed in forward-only mode");
            }
            Outcome::NoOp => {}
            Outcome::PassThrough => {
                if let Intent::Move(movement) = intent {
                    self.selection = navigate(&self.buffer, self.selection, *movement);
                }
            }
        }

        outcome
    }

    pub fn select(&mut self, start: usize, end: usize) {
        self.selection = Selection::new(start, end).clamp_to(self.buffer.len());
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            info!(corrections = mode.allows_corrections(), "mode changed");
        }
        self.mode = mode;
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Fire the interval timer if it is due at `now`.
    pub fn fire_due_tick(&mut self, now: Instant) {
        if let Some(ticket) = self.scheduler.poll_tick(now) {
            self.dispatch(ticket);
        }
    }

    /// Start a write of the buffer as it is right now.
    fn dispatch(&mut self, ticket: WriteTicket) {
        let text = self.buffer.to_text();
        let gateway = Arc::clone(&self.gateway);
        let completions = self.completions_tx.clone();
        debug!(trigger = ?ticket.trigger, chars = self.buffer.len(), "autosave write issued");

        tokio::spawn(async move {
            let result = gateway.write_text(&ticket.path, &text).await;
            let _ = completions.send(WriteCompletion {
                trigger: ticket.trigger,
                result,
            });
        });
    }

    fn absorb(&mut self, completion: WriteCompletion) {
        let succeeded = match &completion.result {
            Ok(()) => {
                debug!(trigger = ?completion.trigger, "autosave write finished");
                true
            }
            Err(err) => {
                warn!(trigger = ?completion.trigger, error = %err, "autosave write failed");
                false
            }
        };
        self.scheduler.complete(succeeded, Instant::now());
    }

    /// Wait until no write is outstanding.
    pub async fn settle(&mut self) {
        while self.scheduler.write_in_flight() {
            match self.completions_rx.recv().await {
                Some(completion) => self.absorb(completion),
                None => break,
            }
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Event loop: input, the save timer, write completions and the status refresh tick.
    ///
    /// Returns after a [`SessionEvent::Stop`] or when `events` closes; the session is
    /// stopped on return.
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<SessionEvent>,
        sink: &mut dyn StatusSink,
    ) {
        let mut refresh = tokio::time::interval(self.config.status_refresh);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shown: Option<StatusLine> = None;

        info!(display = self.display.as_str(), "session started");

        while !self.stopped {
            let deadline = self.scheduler.next_deadline();

            tokio::select! {
                event = events.recv() => match event {
                    Some(SessionEvent::Stop) | None => break,
                    Some(event) => self.handle_event(event),
                },
                Some(completion) = self.completions_rx.recv() => self.absorb(completion),
                _ = sleep_until(deadline) => self.fire_due_tick(Instant::now()),
                _ = refresh.tick() => {}
            }

            let line = self.status_line(Instant::now());
            if shown.as_ref() != Some(&line) {
                sink.render(&line);
                shown = Some(line);
            }
        }

        self.stop().await;

        let line = self.status_line(Instant::now());
        if shown.as_ref() != Some(&line) {
            sink.render(&line);
        }
    }

    /// Wait for outstanding writes, flush unsaved edits, then cancel the timers.
    ///
    /// No write is issued after this returns.
    pub async fn stop(&mut self) {
        if self.stopped {
            return;
        }

        self.settle().await;
        if let Some(ticket) = self.scheduler.request_flush() {
            self.dispatch(ticket);
            self.settle().await;
        }
        self.scheduler.disarm();
        self.stopped = true;
        info!("session stopped");
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn display_state(&self) -> DisplayState {
        self.display
    }

    pub fn text(&self) -> String {
        self.buffer.to_text()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target(&self) -> Option<&Path> {
        self.scheduler.path()
    }

    pub fn scheduler(&self) -> &AutosaveScheduler {
        &self.scheduler
    }

    /// Text removed by the most recent accepted cut.
    pub fn last_cut(&self) -> Option<&str> {
        self.last_cut.as_deref()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn filename(&self) -> String {
        filename(self.target())
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.buffer.to_text())
    }

    pub fn save_status(&self, now: Instant) -> String {
        self.scheduler.status(now)
    }

    pub fn status_line(&self, now: Instant) -> StatusLine {
        StatusLine {
            display: self.display,
            mode: self.mode,
            filename: self.filename(),
            words: self.word_count(),
            save_status: self.save_status(now),
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
