//! Autosave scheduling.
//!
//! [`AutosaveScheduler`] is a plain state machine: it is told about edits, clock readings
//! and write completions, and answers with [`WriteTicket`]s when a write must be issued.
//! It never performs I/O and never reads the clock itself, so the session decides how
//! writes run and tests drive it with explicit instants.
//!
//! Policies:
//! - An interval tick writes unconditionally, dirty or not.
//! - At most one write is outstanding. A trigger that fires while a write is in flight is
//!   skipped; the next natural trigger is the retry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::status::{describe_last_save, SAVED, SAVE_FAILED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub interval: Duration,
    pub keystroke_threshold: u32,
    pub confirm_window: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            keystroke_threshold: 5,
            confirm_window: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Keystroke,
    Interval,
    /// Final write on session stop.
    Flush,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTicket {
    pub path: PathBuf,
    pub trigger: SaveTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No target path yet.
    Idle,
    Armed { next_tick: Instant },
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    Saved { until: Instant },
    Failed,
}

#[derive(Debug)]
pub struct AutosaveScheduler {
    config: AutosaveConfig,
    phase: Phase,
    path: Option<PathBuf>,
    keystrokes: u32,
    dirty: bool,
    in_flight: Option<SaveTrigger>,
    last_saved_at: Option<Instant>,
    notice: Option<Notice>,
}

impl AutosaveScheduler {
    pub fn new(config: AutosaveConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            path: None,
            keystrokes: 0,
            dirty: false,
            in_flight: None,
            last_saved_at: None,
            notice: None,
        }
    }

    /// Start the interval timer for `path`. The target can only be set once.
    pub fn arm(&mut self, path: PathBuf, now: Instant) -> bool {
        if self.phase != Phase::Idle {
            debug!(path = %path.display(), "autosave target already fixed; ignoring");
            return false;
        }
        debug!(
            path = %path.display(),
            interval_ms = self.config.interval.as_millis() as u64,
            "autosave armed"
        );
        self.path = Some(path);
        // Edits made before there was a target do not count toward the first save.
        self.keystrokes = 0;
        self.phase = Phase::Armed {
            next_tick: now + self.config.interval,
        };
        true
    }

    /// Cancel the timer for good. No further tickets are issued.
    pub fn disarm(&mut self) {
        if self.phase != Phase::Stopped {
            debug!("autosave disarmed");
        }
        self.phase = Phase::Stopped;
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.phase, Phase::Armed { .. })
    }

    pub fn keystrokes(&self) -> u32 {
        self.keystrokes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn write_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_saved_at(&self) -> Option<Instant> {
        self.last_saved_at
    }

    /// Next time [`poll_tick`](Self::poll_tick) has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Armed { next_tick } => Some(next_tick),
            Phase::Idle | Phase::Stopped => None,
        }
    }

    /// Record content that is known to be on disk (loaded or freshly created file).
    pub fn mark_saved(&mut self, now: Instant) {
        self.last_saved_at = Some(now);
    }

    /// Count one accepted edit. Returns a ticket when the keystroke threshold is reached.
    pub fn record_edit(&mut self, now: Instant) -> Option<WriteTicket> {
        self.keystrokes = self.keystrokes.saturating_add(1);
        self.dirty = true;

        if self.keystrokes < self.config.keystroke_threshold || !self.is_armed() {
            return None;
        }
        if self.write_in_flight() {
            debug!(keystrokes = self.keystrokes, "keystroke save skipped; write in flight");
            return None;
        }

        self.phase = Phase::Armed {
            next_tick: now + self.config.interval,
        };
        self.begin(SaveTrigger::Keystroke)
    }

    /// Fire the interval timer if it is due.
    pub fn poll_tick(&mut self, now: Instant) -> Option<WriteTicket> {
        let Phase::Armed { next_tick } = self.phase else {
            return None;
        };
        if now < next_tick {
            return None;
        }

        let mut following = next_tick + self.config.interval;
        if following <= now {
            following = now + self.config.interval;
        }
        self.phase = Phase::Armed {
            next_tick: following,
        };
        self.keystrokes = 0;

        if self.write_in_flight() {
            debug!("interval save skipped; write in flight");
            return None;
        }
        self.begin(SaveTrigger::Interval)
    }

    /// Ticket for a final write, if anything changed since the last one was issued.
    pub fn request_flush(&mut self) -> Option<WriteTicket> {
        if !self.dirty || !self.is_armed() || self.write_in_flight() {
            return None;
        }
        self.begin(SaveTrigger::Flush)
    }

    fn begin(&mut self, trigger: SaveTrigger) -> Option<WriteTicket> {
        let path = self.path.clone()?;
        self.keystrokes = 0;
        self.dirty = false;
        self.in_flight = Some(trigger);
        Some(WriteTicket { path, trigger })
    }

    pub fn complete(&mut self, succeeded: bool, now: Instant) {
        self.in_flight = None;
        if succeeded {
            self.last_saved_at = Some(now);
            self.notice = Some(Notice::Saved {
                until: now + self.config.confirm_window,
            });
        } else {
            // The issued text never reached disk.
            self.dirty = true;
            self.notice = Some(Notice::Failed);
        }
    }

    /// Record a failed write that did not go through a ticket (initial file creation).
    pub fn note_failure(&mut self) {
        self.notice = Some(Notice::Failed);
    }

    /// Status text at `now`. Pure; refreshing the display never triggers a write.
    pub fn status(&self, now: Instant) -> String {
        match self.notice {
            Some(Notice::Failed) => SAVE_FAILED.to_string(),
            Some(Notice::Saved { until }) if now < until => SAVED.to_string(),
            _ => describe_last_save(self.last_saved_at, now),
        }
    }
}
