//! Replay scripts: timed input sequences fed into a running session.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::model::{Mode, RawInput, Script, ScriptAction};
use crate::session::SessionEvent;

const SCRIPT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Wait(Duration),
    Send(Vec<SessionEvent>),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptStats {
    pub actions: usize,
    pub events: usize,
    pub total_wait_ms: u64,
}

pub fn parse_script(json: &str) -> Result<Script> {
    let script: Script = serde_json::from_str(json).context("failed to parse replay script JSON")?;
    if script.version != SCRIPT_VERSION {
        return Err(anyhow!(
            "unsupported replay script version {}; expected {SCRIPT_VERSION}",
            script.version
        ));
    }
    Ok(script)
}

pub fn load_script(path: &Path) -> Result<Script> {
    let json =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_script(&json)
}

pub fn expand(action: &ScriptAction) -> Step {
    match action {
        ScriptAction::Wait { ms } => Step::Wait(Duration::from_millis(*ms)),
        ScriptAction::Type { text } => Step::Send(
            text.chars()
                .map(|c| {
                    let input = if c == '\n' {
                        RawInput::input("insertLineBreak", None)
                    } else {
                        RawInput::Input {
                            input_type: "insertText".to_string(),
                            data: Some(c.to_string()),
                        }
                    };
                    SessionEvent::Input(input)
                })
                .collect(),
        ),
        ScriptAction::Key { key, ctrl, meta } => Step::Send(vec![SessionEvent::Input(
            RawInput::Key {
                key: key.clone(),
                ctrl: *ctrl,
                meta: *meta,
            },
        )]),
        ScriptAction::Input { input_type, data } => Step::Send(vec![SessionEvent::Input(
            RawInput::Input {
                input_type: input_type.clone(),
                data: data.clone(),
            },
        )]),
        ScriptAction::Select { start, end } => Step::Send(vec![SessionEvent::Select {
            start: *start,
            end: *end,
        }]),
        ScriptAction::Corrections { enabled } => Step::Send(vec![SessionEvent::SetMode(
            Mode::from_corrections(*enabled),
        )]),
    }
}

pub fn stats(script: &Script) -> ScriptStats {
    let mut out = ScriptStats {
        actions: script.actions.len(),
        ..Default::default()
    };

    for action in &script.actions {
        match expand(action) {
            Step::Wait(wait) => {
                out.total_wait_ms = out.total_wait_ms.saturating_add(wait.as_millis() as u64);
            }
            Step::Send(events) => out.events += events.len(),
        }
    }

    out
}

/// Feed `script` into `events`, then send [`SessionEvent::Stop`].
pub fn spawn_feeder(script: Script, events: mpsc::Sender<SessionEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        for action in &script.actions {
            match expand(action) {
                Step::Wait(wait) => tokio::time::sleep(wait).await,
                Step::Send(batch) => {
                    for event in batch {
                        if events.send(event).await.is_err() {
                            debug!("session closed before replay finished");
                            return;
                        }
                    }
                }
            }
        }
        let _ = events.send(SessionEvent::Stop).await;
    })
}
