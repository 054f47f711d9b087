#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use draftzero::config::{PromptOptions, SessionConfig};
use draftzero::error::{GatewayError, MemoryError};
use draftzero::gateway::PersistenceGateway;
use draftzero::memory::{PathMemory, PATH_MEMORY_KEY};
use draftzero::model::Intent;
use draftzero::session::Session;

pub fn doc_path() -> PathBuf {
    PathBuf::from("/writing/draft.txt")
}

/// In-memory file system with a scripted prompt.
#[derive(Default)]
pub struct MockGateway {
    files: Mutex<HashMap<PathBuf, String>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
    prompt_answers: Mutex<VecDeque<Option<PathBuf>>>,
    prompts: Mutex<usize>,
    fail_writes: AtomicBool,
    write_delay: Duration,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, text: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), text.to_string());
        self
    }

    /// Queue an answer for the next prompt. Unanswered prompts are cancelled.
    pub fn answering(self, answer: Option<PathBuf>) -> Self {
        self.prompt_answers.lock().unwrap().push_back(answer);
        self
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn written_texts(&self) -> Vec<String> {
        self.writes().into_iter().map(|(_, text)| text).collect()
    }

    pub fn prompts(&self) -> usize {
        *self.prompts.lock().unwrap()
    }

    pub fn file(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

#[async_trait]
impl PersistenceGateway for MockGateway {
    async fn read_text(&self, path: &Path) -> Result<String, GatewayError> {
        self.file(path)
            .ok_or_else(|| GatewayError::NotFound(path.to_path_buf()))
    }

    async fn write_text(&self, path: &Path, text: &str) -> Result<(), GatewayError> {
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), text.to_string()));

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"),
            });
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), text.to_string());
        Ok(())
    }

    async fn prompt_save_location(&self, _options: &PromptOptions) -> Option<PathBuf> {
        *self.prompts.lock().unwrap() += 1;
        self.prompt_answers.lock().unwrap().pop_front().flatten()
    }
}

/// Path memory whose contents stay observable after the session takes ownership.
#[derive(Debug, Clone, Default)]
pub struct SharedMemory {
    entries: Arc<Mutex<HashMap<String, PathBuf>>>,
    clears: Arc<Mutex<usize>>,
}

impl SharedMemory {
    pub fn remembering(path: impl Into<PathBuf>) -> Self {
        let memory = Self::default();
        memory
            .entries
            .lock()
            .unwrap()
            .insert(PATH_MEMORY_KEY.to_string(), path.into());
        memory
    }

    pub fn remembered(&self) -> Option<PathBuf> {
        self.entries.lock().unwrap().get(PATH_MEMORY_KEY).cloned()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock().unwrap()
    }
}

impl PathMemory for SharedMemory {
    fn get(&self, key: &str) -> Result<Option<PathBuf>, MemoryError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&mut self, key: &str, path: &Path) -> Result<(), MemoryError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), path.to_path_buf());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), MemoryError> {
        *self.clears.lock().unwrap() += 1;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

pub fn session_with(gateway: &Arc<MockGateway>, memory: SharedMemory) -> Session {
    Session::new(gateway.clone(), Box::new(memory), SessionConfig::default())
}

/// A session that has no target: nothing is ever written.
pub fn detached_session() -> Session {
    session_with(&Arc::new(MockGateway::new()), SharedMemory::default())
}

pub fn type_text(session: &mut Session, text: &str) {
    for c in text.chars() {
        session.handle_intent(&Intent::Insert(c.to_string()));
    }
}
