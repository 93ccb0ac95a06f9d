//! Integration tests for the shared note

mod common;

#[tokio::test]
async fn test_note_roundtrip() {
    let env = common::setup_test_env();

    let last_change = env.notes.set("hello").await.unwrap();
    let note = env.notes.get().await;

    assert_eq!(note.text, "hello");
    assert!(note.last_change.as_deref().is_some_and(|ts| !ts.is_empty()));
    assert_eq!(note.last_change, last_change);
}

#[tokio::test]
async fn test_note_missing_is_empty() {
    let env = common::setup_test_env();

    let note = env.notes.get().await;

    assert_eq!(note.text, "");
    assert_eq!(note.last_change, None);
}

#[tokio::test]
async fn test_note_init_creates_empty_file() {
    let env = common::setup_test_env();
    env.notes.init().await.unwrap();
    assert!(env.notes.path().exists());

    env.notes.set("kept").await.unwrap();
    env.notes.init().await.unwrap();
    assert_eq!(env.notes.get().await.text, "kept");
}

#[tokio::test]
async fn test_note_overwrite_and_unicode() {
    let env = common::setup_test_env();
    env.notes.set("first draft, quite long").await.unwrap();
    env.notes.set("Tarea: leer cap. 3 ✓\nline two").await.unwrap();

    assert_eq!(env.notes.get().await.text, "Tarea: leer cap. 3 ✓\nline two");
}

#[tokio::test]
async fn test_note_survives_timestamp_failure() {
    let env = common::setup_test_env();
    // A directory where the timestamp file should be makes its write fail
    std::fs::create_dir(env.last_change.path()).unwrap();

    let last_change = env.notes.set("still saved").await.unwrap();

    assert_eq!(last_change, None);
    assert_eq!(env.notes.get().await.text, "still saved");
}
