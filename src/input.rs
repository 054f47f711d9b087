//! Classification of raw input events into edit intents.

use crate::model::{DeleteKind, Intent, Movement, RawInput};

pub fn classify(raw: &RawInput) -> Intent {
    match raw {
        RawInput::Key { key, ctrl, meta } => classify_key(key, *ctrl || *meta),
        RawInput::Input { input_type, data } => classify_input(input_type, data.as_deref()),
    }
}

fn classify_key(key: &str, command: bool) -> Intent {
    match key {
        "Backspace" if command => Intent::Delete(DeleteKind::WordBackward),
        "Backspace" => Intent::Delete(DeleteKind::Backward),
        "Delete" if command => Intent::Delete(DeleteKind::WordForward),
        "Delete" => Intent::Delete(DeleteKind::Forward),
        "x" | "X" if command => Intent::Cut,
        "ArrowLeft" if command => Intent::Move(Movement::WordLeft),
        "ArrowLeft" => Intent::Move(Movement::Left),
        "ArrowRight" if command => Intent::Move(Movement::WordRight),
        "ArrowRight" => Intent::Move(Movement::Right),
        "Home" => Intent::Move(Movement::LineStart),
        "End" => Intent::Move(Movement::LineEnd),
        "Enter" if !command => Intent::Insert("\n".to_string()),
        "Tab" if !command => Intent::Insert("\t".to_string()),
        _ if command => Intent::Other,
        _ => {
            // Named keys ("Shift", "F5", ...) are longer than one character.
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.is_control() => Intent::Insert(c.to_string()),
                _ => Intent::Other,
            }
        }
    }
}

fn classify_input(input_type: &str, data: Option<&str>) -> Intent {
    let data = || data.unwrap_or_default().to_string();

    match input_type {
        "insertText" | "insertReplacementText" | "insertCompositionText" => Intent::Insert(data()),
        "insertLineBreak" | "insertParagraph" => Intent::Insert("\n".to_string()),
        "insertFromPaste" | "insertFromDrop" | "insertFromYank" => Intent::Paste(data()),
        "deleteContentForward" => Intent::Delete(DeleteKind::Forward),
        "deleteWordBackward" => Intent::Delete(DeleteKind::WordBackward),
        "deleteWordForward" => Intent::Delete(DeleteKind::WordForward),
        "deleteSoftLineBackward" | "deleteHardLineBackward" => {
            Intent::Delete(DeleteKind::LineBackward)
        }
        "deleteSoftLineForward" | "deleteHardLineForward" => {
            Intent::Delete(DeleteKind::LineForward)
        }
        "deleteByCut" => Intent::Cut,
        other if other.starts_with("delete") => Intent::Delete(DeleteKind::Backward),
        _ => Intent::Other,
    }
}
