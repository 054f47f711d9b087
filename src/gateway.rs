//! File persistence and save-location prompting.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::PromptOptions;
use crate::error::GatewayError;

/// Whole-file text persistence plus the "choose a file" prompt.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn read_text(&self, path: &Path) -> Result<String, GatewayError>;

    async fn write_text(&self, path: &Path, text: &str) -> Result<(), GatewayError>;

    /// `None` when the user dismisses the prompt.
    async fn prompt_save_location(&self, options: &PromptOptions) -> Option<PathBuf>;
}

#[async_trait]
pub trait SaveLocationPrompt: Send + Sync {
    async fn choose(&self, options: &PromptOptions) -> Option<PathBuf>;
}

/// Answers every prompt with the same choice.
#[derive(Debug, Clone)]
pub struct FixedPrompt(pub Option<PathBuf>);

#[async_trait]
impl SaveLocationPrompt for FixedPrompt {
    async fn choose(&self, _options: &PromptOptions) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Asks on stderr and reads one line from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

#[async_trait]
impl SaveLocationPrompt for TerminalPrompt {
    async fn choose(&self, options: &PromptOptions) -> Option<PathBuf> {
        let options = options.clone();
        let answer = tokio::task::spawn_blocking(move || ask_on_terminal(&options)).await;

        match answer {
            Ok(Ok(choice)) => choice,
            Ok(Err(err)) => {
                warn!(error = %err, "save location prompt failed");
                None
            }
            Err(err) => {
                warn!(error = %err, "save location prompt task failed");
                None
            }
        }
    }
}

fn ask_on_terminal(options: &PromptOptions) -> io::Result<Option<PathBuf>> {
    let mut stderr = io::stderr();
    writeln!(stderr, "{}", options.title)?;
    write!(stderr, "File [{}] (:q to cancel): ", options.default_name)?;
    stderr.flush()?;

    // std's stdin is buffered process-wide, so later readers see the remaining input.
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    let answer = (read > 0).then_some(line.as_str());

    let Some(choice) = resolve_choice(answer, options) else {
        return Ok(None);
    };
    if choice.is_absolute() {
        return Ok(Some(choice));
    }
    Ok(Some(std::env::current_dir()?.join(choice)))
}

/// Interpret a prompt answer. `None` is end of input.
///
/// An empty answer picks the default name; `:q` cancels; a name whose extension is not
/// allowed gets the first allowed extension appended.
pub fn resolve_choice(answer: Option<&str>, options: &PromptOptions) -> Option<PathBuf> {
    let answer = answer?.trim();
    if answer == ":q" {
        return None;
    }

    let name = if answer.is_empty() {
        options.default_name.as_str()
    } else {
        answer
    };

    let path = PathBuf::from(name);
    let allowed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            options
                .extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false);

    match options.extensions.first() {
        Some(first) if !allowed => Some(PathBuf::from(format!("{name}.{first}"))),
        _ => Some(path),
    }
}

/// Local file system via `tokio::fs`.
pub struct FsGateway {
    prompt: Box<dyn SaveLocationPrompt>,
}

impl FsGateway {
    pub fn new(prompt: impl SaveLocationPrompt + 'static) -> Self {
        Self {
            prompt: Box::new(prompt),
        }
    }
}

#[async_trait]
impl PersistenceGateway for FsGateway {
    async fn read_text(&self, path: &Path) -> Result<String, GatewayError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| GatewayError::from_io(path, err))?;
        debug!(path = %path.display(), chars = text.chars().count(), "read document");
        Ok(text)
    }

    async fn write_text(&self, path: &Path, text: &str) -> Result<(), GatewayError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| GatewayError::from_io(parent, err))?;
        }
        tokio::fs::write(path, text)
            .await
            .map_err(|err| GatewayError::from_io(path, err))?;
        debug!(path = %path.display(), bytes = text.len(), "wrote document");
        Ok(())
    }

    async fn prompt_save_location(&self, options: &PromptOptions) -> Option<PathBuf> {
        self.prompt.choose(options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answer_picks_default_name() {
        let options = PromptOptions::default();
        assert_eq!(
            resolve_choice(Some("\n"), &options),
            Some(PathBuf::from("draft.txt"))
        );
    }

    #[test]
    fn eof_and_quit_cancel() {
        let options = PromptOptions::default();
        assert_eq!(resolve_choice(None, &options), None);
        assert_eq!(resolve_choice(Some(":q\n"), &options), None);
    }

    #[test]
    fn disallowed_extension_gets_first_allowed_appended() {
        let options = PromptOptions::default();
        assert_eq!(
            resolve_choice(Some("notes"), &options),
            Some(PathBuf::from("notes.txt"))
        );
        assert_eq!(
            resolve_choice(Some("notes.rs"), &options),
            Some(PathBuf::from("notes.rs.txt"))
        );
        assert_eq!(
            resolve_choice(Some("journal/today.MD"), &options),
            Some(PathBuf::from("journal/today.MD"))
        );
    }
}
