use memtree::sink::flush;
use memtree::*;

#[tokio::test]
async fn test_file_sink_appends_transitions() -> FsResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("filesystem.journal");
    let mut sink = FileSink::new(&path, JournalFormat::Text);

    let mut fs = FileSystem::new();
    sink.append(&fs.journal_mut().take_outbox()).await?;

    fs.create_dir("/docs")?;
    let _ = fs.create_dir("/docs");
    sink.append(&fs.journal_mut().take_outbox()).await?;

    let written = tokio::fs::read_to_string(&path).await?;
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with("INIT: filesystem initialized (Status: PENDING)"));
    assert!(lines[1].ends_with("INIT: filesystem initialized (Status: COMMITTED)"));
    assert!(lines[2].ends_with("CREATE_DIR: directory: /docs (Status: PENDING)"));
    assert!(lines[3].ends_with("CREATE_DIR: directory: /docs (Status: COMMITTED)"));
    assert!(lines[4].ends_with("CREATE_DIR: directory: /docs (Status: PENDING)"));

    Ok(())
}

#[tokio::test]
async fn test_file_sink_never_truncates() -> FsResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("journal.log");
    tokio::fs::write(&path, "earlier session\n").await?;

    let mut fs = FileSystem::new();
    let mut sink = FileSink::new(&path, JournalFormat::Text);
    sink.append(&fs.journal_mut().take_outbox()).await?;
    sink.append(&[]).await?;

    let written = tokio::fs::read_to_string(&path).await?;
    assert!(written.starts_with("earlier session\n"));
    assert_eq!(written.lines().count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_json_lines() -> FsResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("journal.jsonl");
    let mut sink = FileSink::new(&path, JournalFormat::Json);

    let mut fs = FileSystem::new();
    fs.create_file("/a.txt", "x")?;
    sink.append(&fs.journal_mut().take_outbox()).await?;

    let written = tokio::fs::read_to_string(&path).await?;
    let entries: Vec<JournalEntry> = written
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[2].operation, OpKind::CreateFile);
    assert_eq!(entries[2].status, EntryStatus::Pending);
    assert_eq!(entries[3].seq, entries[2].seq);
    assert_eq!(entries[3].status, EntryStatus::Committed);
    Ok(())
}

#[tokio::test]
async fn test_memory_sink() -> FsResult<()> {
    let mut sink = MemorySink::new(JournalFormat::Text);
    let mut journal = Journal::new();
    let handle = journal.log(OpKind::DeleteDir, "directory: /temp");
    journal.commit(handle)?;

    sink.append(&journal.take_outbox()).await?;
    assert_eq!(sink.lines().len(), 2);
    assert!(sink.lines()[1].ends_with("DELETE_DIR: directory: /temp (Status: COMMITTED)"));
    Ok(())
}

#[tokio::test]
async fn test_failed_append_is_retried() -> FsResult<()> {
    let dir = tempfile::tempdir()?;
    let mut fs = FileSystem::new();
    fs.create_dir("/docs")?;

    // a directory cannot be opened for appending
    let mut broken = FileSink::new(dir.path(), JournalFormat::Text);
    assert!(matches!(
        flush(fs.journal_mut(), &mut broken).await,
        Err(FsError::SystemIo(_))
    ));
    assert_eq!(fs.journal().outbox().len(), 4);

    fs.create_file("/docs/a.txt", "")?;
    let path = dir.path().join("filesystem.journal");
    let mut sink = FileSink::new(&path, JournalFormat::Text);
    assert_eq!(flush(fs.journal_mut(), &mut sink).await?, 6);
    assert!(fs.journal().outbox().is_empty());

    let written = tokio::fs::read_to_string(&path).await?;
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].ends_with("INIT: filesystem initialized (Status: PENDING)"));
    assert!(lines[3].ends_with("CREATE_DIR: directory: /docs (Status: COMMITTED)"));
    assert!(lines[5].ends_with("CREATE_FILE: file: /docs/a.txt (Status: COMMITTED)"));

    assert_eq!(flush(fs.journal_mut(), &mut sink).await?, 0);
    Ok(())
}

#[test]
fn test_bad_json_line_is_serialization_error() {
    let err: FsError = serde_json::from_str::<JournalEntry>("{\"seq\": 0")
        .unwrap_err()
        .into();
    assert!(matches!(err, FsError::Serialization(_)));
    assert!(err.to_string().starts_with("serialization error"));
}
