use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use draftzero::config::SessionConfig;
use draftzero::error::{GatewayError, MemoryError};
use draftzero::gateway::{FixedPrompt, FsGateway, PersistenceGateway};
use draftzero::memory::{JsonPathMemory, PathMemory, PATH_MEMORY_KEY};
use draftzero::model::{DisplayState, Intent};
use draftzero::session::Session;

#[tokio::test]
async fn fs_gateway_reports_missing_files_as_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gateway = FsGateway::new(FixedPrompt(None));

    let err = gateway
        .read_text(&dir.path().join("absent.txt"))
        .await
        .expect_err("missing file should fail");

    assert!(matches!(err, GatewayError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn fs_gateway_writes_into_new_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("draft.txt");
    let gateway = FsGateway::new(FixedPrompt(None));

    gateway
        .write_text(&path, "héllo\nworld")
        .await
        .expect("write should succeed");

    let text = gateway.read_text(&path).await.expect("read back");
    assert_eq!(text, "héllo\nworld");
}

#[tokio::test]
async fn fs_gateway_write_failure_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gateway = FsGateway::new(FixedPrompt(None));

    // A directory cannot be overwritten with text.
    let err = gateway
        .write_text(dir.path(), "text")
        .await
        .expect_err("writing over a directory should fail");

    assert!(matches!(err, GatewayError::Io { .. }), "{err}");
}

#[test]
fn json_memory_round_trips_the_document_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let location = dir.path().join("config").join("path-memory.json");
    let mut memory = JsonPathMemory::new(&location);

    assert_eq!(memory.get(PATH_MEMORY_KEY).expect("get"), None);

    memory
        .set(PATH_MEMORY_KEY, &PathBuf::from("/writing/draft.txt"))
        .expect("set");
    let reopened = JsonPathMemory::new(&location);
    assert_eq!(
        reopened.get(PATH_MEMORY_KEY).expect("get"),
        Some(PathBuf::from("/writing/draft.txt"))
    );

    memory.clear(PATH_MEMORY_KEY).expect("clear");
    assert_eq!(reopened.get(PATH_MEMORY_KEY).expect("get"), None);
}

#[test]
fn json_memory_rejects_corrupt_and_future_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let location = dir.path().join("path-memory.json");
    let memory = JsonPathMemory::new(&location);

    fs::write(&location, "{not json").expect("write");
    assert!(matches!(
        memory.get(PATH_MEMORY_KEY),
        Err(MemoryError::Json { .. })
    ));

    fs::write(&location, r#"{"version":7,"entries":{}}"#).expect("write");
    assert!(matches!(
        memory.get(PATH_MEMORY_KEY),
        Err(MemoryError::UnsupportedVersion(7))
    ));
}

#[tokio::test]
async fn session_survives_a_restart_through_the_file_system() {
    let dir = tempfile::tempdir().expect("tempdir");
    let doc = dir.path().join("draft.txt");
    let memory_file = dir.path().join("path-memory.json");

    let mut first = Session::new(
        Arc::new(FsGateway::new(FixedPrompt(Some(doc.clone())))),
        Box::new(JsonPathMemory::new(&memory_file)),
        SessionConfig::default(),
    );
    assert_eq!(first.initialize().await, DisplayState::Ready);
    first.handle_intent(&Intent::Paste("a first session".to_string()));
    first.stop().await;
    assert_eq!(fs::read_to_string(&doc).expect("doc"), "a first session");

    // The second run must not consult the prompt.
    let mut second = Session::new(
        Arc::new(FsGateway::new(FixedPrompt(None))),
        Box::new(JsonPathMemory::new(&memory_file)),
        SessionConfig::default(),
    );
    assert_eq!(second.initialize().await, DisplayState::Ready);
    assert_eq!(second.text(), "a first session");
    assert_eq!(second.word_count(), 3);
}
