use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// The document text, addressed by character (not byte) index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    chars: Vec<char>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    pub fn slice(&self, range: Range<usize>) -> String {
        self.chars[range].iter().collect()
    }

    /// Replace `range` with `text`. The range must lie within the buffer.
    pub fn splice(&mut self, range: Range<usize>, text: &str) {
        self.chars.splice(range, text.chars());
    }

    pub fn to_text(&self) -> String {
        self.chars.iter().collect()
    }
}

impl From<&str> for Buffer {
    fn from(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }
}

impl From<String> for Buffer {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Half-open range `[start, end)` over the buffer. An empty selection is the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Stale or inverted bounds collapse to a caret at the end of the buffer.
    pub fn clamp_to(self, len: usize) -> Self {
        if self.start <= self.end && self.end <= len {
            self
        } else {
            Self::caret(len)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Characters may be added but never removed.
    #[default]
    ForwardOnly,
    CorrectionsAllowed,
}

impl Mode {
    pub fn from_corrections(enabled: bool) -> Self {
        if enabled {
            Mode::CorrectionsAllowed
        } else {
            Mode::ForwardOnly
        }
    }

    pub fn allows_corrections(self) -> bool {
        self == Mode::CorrectionsAllowed
    }

    pub fn toggled(self) -> Self {
        Self::from_corrections(!self.allows_corrections())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteKind {
    Backward,
    Forward,
    WordBackward,
    WordForward,
    LineBackward,
    LineForward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Left,
    Right,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
}

/// What a raw input event means, independent of where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Typed character(s) or programmatic insertion.
    Insert(String),
    Paste(String),
    Delete(DeleteKind),
    Cut,
    Move(Movement),
    /// Anything that is neither an insertion nor a deletion.
    Other,
}

/// A raw event as delivered by an input surface.
///
/// `Key` mirrors a key-down (`key` is the logical key name, e.g. `"Backspace"` or `"a"`),
/// `Input` mirrors a before-input notification (`input_type` such as `"insertText"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawInput {
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
    },
    Input {
        input_type: String,
        #[serde(default)]
        data: Option<String>,
    },
}

impl RawInput {
    pub fn key(key: impl Into<String>) -> Self {
        RawInput::Key {
            key: key.into(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl_key(key: impl Into<String>) -> Self {
        RawInput::Key {
            key: key.into(),
            ctrl: true,
            meta: false,
        }
    }

    pub fn input(input_type: impl Into<String>, data: Option<&str>) -> Self {
        RawInput::Input {
            input_type: input_type.into(),
            data: data.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayState {
    Initializing,
    Ready,
    NoFile,
}

impl DisplayState {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayState::Initializing => "initializing",
            DisplayState::Ready => "ready",
            DisplayState::NoFile => "no-file",
        }
    }
}

/// A replay script: a timed sequence of input actions fed into a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub version: u32,
    pub actions: Vec<ScriptAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptAction {
    Wait {
        ms: u64,
    },
    /// Typed one character at a time.
    Type {
        text: String,
    },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
    },
    Input {
        input_type: String,
        #[serde(default)]
        data: Option<String>,
    },
    Select {
        start: usize,
        end: usize,
    },
    Corrections {
        enabled: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_selection_collapses_to_end_of_buffer() {
        assert_eq!(Selection::new(2, 9).clamp_to(5), Selection::caret(5));
        assert_eq!(Selection::new(4, 1).clamp_to(5), Selection::caret(5));
        assert_eq!(Selection::new(1, 4).clamp_to(5), Selection::new(1, 4));
    }

    #[test]
    fn buffer_indexes_by_character() {
        let mut buf = Buffer::from("héllo");
        assert_eq!(buf.len(), 5);
        buf.splice(1..2, "e");
        assert_eq!(buf.to_text(), "hello");
    }

    #[test]
    fn script_actions_parse_from_tagged_json() {
        let json = r#"{"version":1,"actions":[
            {"type":"type","text":"hi"},
            {"type":"wait","ms":250},
            {"type":"key","key":"Backspace"},
            {"type":"input","input_type":"insertFromPaste","data":"x"},
            {"type":"corrections","enabled":true}
        ]}"#;
        let script: Script = serde_json::from_str(json).expect("script should parse");
        assert_eq!(script.actions.len(), 5);
        assert_eq!(
            script.actions[2],
            ScriptAction::Key {
                key: "Backspace".to_string(),
                ctrl: false,
                meta: false,
            }
        );
    }
}
