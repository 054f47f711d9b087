//! Edit policy: decides whether an intent may touch the buffer and how.
//!
//! [`evaluate`] is pure. It never mutates the buffer; an accepted intent comes back as an
//! [`Edit`] that the caller applies. Under [`Mode::ForwardOnly`] no edit ever removes
//! characters, so the buffer length never decreases.

use std::ops::Range;

use crate::model::{Buffer, DeleteKind, Intent, Mode, Movement, Selection};
use crate::word_nav::{line_end, line_start, word_end_after, word_start_before};

/// An accepted buffer change: replace `remove` with `insert`, then place the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub remove: Range<usize>,
    pub insert: String,
    pub cursor: usize,
}

impl Edit {
    /// Apply to `buffer`, returning the removed text (for cut).
    pub fn apply(&self, buffer: &mut Buffer) -> String {
        let removed = buffer.slice(self.remove.clone());
        buffer.splice(self.remove.clone(), &self.insert);
        removed
    }

    pub fn removes(&self) -> bool {
        !self.remove.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The buffer changes; autosave must be notified exactly once.
    Apply(Edit),
    /// Blocked by forward-only mode. Buffer, cursor and selection stay as they are.
    Suppressed,
    /// Allowed but changes nothing (empty payload, nothing left to delete).
    NoOp,
    /// Not an edit at all; the input surface handles it.
    PassThrough,
}

impl Outcome {
    pub fn notifies(&self) -> bool {
        matches!(self, Outcome::Apply(_))
    }
}

pub fn evaluate(buffer: &Buffer, selection: Selection, mode: Mode, intent: &Intent) -> Outcome {
    let selection = selection.clamp_to(buffer.len());

    match intent {
        Intent::Insert(text) | Intent::Paste(text) => insertion(selection, mode, text),
        Intent::Delete(kind) => {
            if !mode.allows_corrections() {
                return Outcome::Suppressed;
            }
            deletion(buffer, selection, *kind)
        }
        Intent::Cut => {
            if !mode.allows_corrections() {
                return Outcome::Suppressed;
            }
            if selection.is_empty() {
                return Outcome::NoOp;
            }
            remove(selection.range())
        }
        Intent::Move(_) | Intent::Other => Outcome::PassThrough,
    }
}

fn insertion(selection: Selection, mode: Mode, text: &str) -> Outcome {
    if text.is_empty() {
        return Outcome::NoOp;
    }

    let inserted = text.chars().count();
    let remove = if selection.is_empty() {
        selection.range()
    } else if mode.allows_corrections() {
        selection.range()
    } else {
        // Keep the selected text and insert after it.
        selection.end..selection.end
    };

    Outcome::Apply(Edit {
        cursor: remove.start + inserted,
        remove,
        insert: text.to_string(),
    })
}

fn deletion(buffer: &Buffer, selection: Selection, kind: DeleteKind) -> Outcome {
    if !selection.is_empty() {
        return remove(selection.range());
    }

    let chars = buffer.as_chars();
    let cursor = selection.start;
    let range = match kind {
        DeleteKind::Backward => cursor.saturating_sub(1)..cursor,
        DeleteKind::Forward => cursor..(cursor + 1).min(chars.len()),
        DeleteKind::WordBackward => word_start_before(chars, cursor)..cursor,
        DeleteKind::WordForward => cursor..word_end_after(chars, cursor),
        DeleteKind::LineBackward => line_start(chars, cursor)..cursor,
        DeleteKind::LineForward => cursor..line_end(chars, cursor),
    };

    if range.is_empty() {
        Outcome::NoOp
    } else {
        remove(range)
    }
}

fn remove(range: Range<usize>) -> Outcome {
    Outcome::Apply(Edit {
        cursor: range.start,
        remove: range,
        insert: String::new(),
    })
}

/// Cursor movement. A non-empty selection collapses toward the direction of travel.
pub fn navigate(buffer: &Buffer, selection: Selection, movement: Movement) -> Selection {
    let selection = selection.clamp_to(buffer.len());
    let chars = buffer.as_chars();

    let pos = match movement {
        Movement::Left if !selection.is_empty() => selection.start,
        Movement::Right if !selection.is_empty() => selection.end,
        Movement::Left => selection.start.saturating_sub(1),
        Movement::Right => (selection.end + 1).min(chars.len()),
        Movement::WordLeft => word_start_before(chars, selection.start),
        Movement::WordRight => word_end_after(chars, selection.end),
        Movement::LineStart => line_start(chars, selection.start),
        Movement::LineEnd => line_end(chars, selection.end),
    };

    Selection::caret(pos)
}
