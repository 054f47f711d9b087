use std::fmt;
use std::path::Path;
use std::time::Duration;

use tokio::time::Instant;

use crate::model::{DisplayState, Mode};

pub const SAVED: &str = "Saved";
pub const SAVE_FAILED: &str = "Save failed";

/// Human-readable age of the last save. Pure; safe to call on every refresh.
pub fn describe_last_save(last_saved_at: Option<Instant>, now: Instant) -> String {
    match last_saved_at {
        Some(saved) => describe_elapsed(now.saturating_duration_since(saved)),
        None => String::new(),
    }
}

pub fn describe_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    if seconds < 5 {
        "Saved just now".to_string()
    } else if seconds < 60 {
        format!("Saved {seconds}s ago")
    } else {
        format!("Saved {}m ago", seconds / 60)
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Last path segment after any `/` or `\`, regardless of host platform.
pub fn filename(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return "No file".to_string();
    };
    let path = path.to_string_lossy();
    path.rsplit(['/', '\\']).next().unwrap_or_default().to_string()
}

/// Everything a status bar needs, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub display: DisplayState,
    pub mode: Mode,
    pub filename: String,
    pub words: usize,
    pub save_status: String,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display {
            DisplayState::Initializing => return write!(f, "Setting up..."),
            DisplayState::NoFile => {
                return write!(f, "Please select a save location to begin writing.")
            }
            DisplayState::Ready => {}
        }

        if self.mode.allows_corrections() {
            write!(f, "[corrections] ")?;
        }
        let unit = if self.words == 1 { "word" } else { "words" };
        write!(f, "{} · {} {unit}", self.filename, self.words)?;
        if !self.save_status.is_empty() {
            write!(f, " · {}", self.save_status)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn elapsed_thresholds() {
        assert_eq!(describe_elapsed(Duration::from_secs(3)), "Saved just now");
        assert_eq!(describe_elapsed(Duration::from_millis(4_999)), "Saved just now");
        assert_eq!(describe_elapsed(Duration::from_secs(5)), "Saved 5s ago");
        assert_eq!(describe_elapsed(Duration::from_secs(30)), "Saved 30s ago");
        assert_eq!(describe_elapsed(Duration::from_secs(59)), "Saved 59s ago");
        assert_eq!(describe_elapsed(Duration::from_secs(60)), "Saved 1m ago");
        assert_eq!(describe_elapsed(Duration::from_secs(125)), "Saved 2m ago");
    }

    #[test]
    fn never_saved_is_blank() {
        assert_eq!(describe_last_save(None, Instant::now()), "");
    }

    #[test]
    fn last_save_is_measured_against_now() {
        let saved = Instant::now();
        assert_eq!(
            describe_last_save(Some(saved), saved + Duration::from_secs(125)),
            "Saved 2m ago"
        );
        // A clock reading before the save is treated as zero elapsed.
        let ahead = saved + Duration::from_secs(1);
        assert_eq!(describe_last_save(Some(ahead), saved), "Saved just now");
    }

    #[test]
    fn word_count_splits_on_whitespace_runs() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("  one   two\nthree\t"), 3);
    }

    #[test]
    fn filename_takes_last_segment_of_either_separator() {
        assert_eq!(filename(Some(&PathBuf::from("/home/me/draft.txt"))), "draft.txt");
        assert_eq!(filename(Some(&PathBuf::from(r"C:\Users\me\notes.md"))), "notes.md");
        assert_eq!(filename(Some(&PathBuf::from("plain.txt"))), "plain.txt");
        assert_eq!(filename(None), "No file");
    }

    #[test]
    fn status_line_renders_ready_state() {
        let line = StatusLine {
            display: DisplayState::Ready,
            mode: Mode::CorrectionsAllowed,
            filename: "draft.txt".to_string(),
            words: 12,
            save_status: "Saved 30s ago".to_string(),
        };
        assert_eq!(
            line.to_string(),
            "[corrections] draft.txt · 12 words · Saved 30s ago"
        );
    }
}
