//! Append-only operation journal with two-phase entries.
//!
//! An entry is logged `PENDING` before the tree is touched and committed once
//! the mutation succeeds. Entries whose operation failed stay `PENDING`.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FsError, FsResult};
use crate::types::{EntryHandle, EntryStatus, OpKind};

/// Timestamp layout used in rendered journal lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: usize,
    pub operation: OpKind,
    pub details: String,
    #[serde(with = "serde_millis")]
    pub timestamp: SystemTime,
    pub status: EntryStatus,
}

impl JournalEntry {
    pub fn handle(&self) -> EntryHandle {
        EntryHandle(self.seq)
    }

    pub fn is_committed(&self) -> bool {
        self.status == EntryStatus::Committed
    }
}

/// `[<timestamp>] <operation>: <details> (Status: <PENDING|COMMITTED>)`
impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timestamp = DateTime::<Local>::from(self.timestamp);
        write!(
            f,
            "[{}] {}: {} (Status: {})",
            timestamp.format(TIMESTAMP_FORMAT),
            self.operation,
            self.details,
            self.status
        )
    }
}

#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
    /// Snapshots of entries as they stood at each log/commit, not yet drained
    outbox: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pending entry and return the handle that commits it.
    pub fn log(&mut self, operation: OpKind, details: impl Into<String>) -> EntryHandle {
        let entry = JournalEntry {
            seq: self.entries.len(),
            operation,
            details: details.into(),
            timestamp: SystemTime::now(),
            status: EntryStatus::Pending,
        };
        info!("journal: {entry}");

        let handle = entry.handle();
        self.outbox.push(entry.clone());
        self.entries.push(entry);
        handle
    }

    /// Mark the entry behind `handle` committed. Only the first call succeeds.
    pub fn commit(&mut self, handle: EntryHandle) -> FsResult<()> {
        let entry = self
            .entries
            .get_mut(handle.0)
            .ok_or(FsError::InvalidHandle(handle.0))?;

        if entry.is_committed() {
            return Err(FsError::AlreadyCommitted(handle.0));
        }
        entry.status = EntryStatus::Committed;
        info!(operation = %entry.operation, seq = entry.seq, "journal: committed");

        self.outbox.push(entry.clone());
        Ok(())
    }

    pub fn get(&self, handle: EntryHandle) -> Option<&JournalEntry> {
        self.entries.get(handle.0)
    }

    /// Read-only view in append order. Call again to restart.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &JournalEntry> + '_ {
        self.entries.iter()
    }

    pub fn pending(&self) -> impl Iterator<Item = &JournalEntry> + '_ {
        self.entries.iter().filter(|entry| !entry.is_committed())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Transitions recorded but not yet acknowledged, oldest first.
    pub fn outbox(&self) -> &[JournalEntry] {
        &self.outbox
    }

    /// Drop the oldest `count` transitions once a sink has persisted them.
    pub fn ack_outbox(&mut self, count: usize) {
        let count = count.min(self.outbox.len());
        self.outbox.drain(..count);
    }

    /// Drain the state transitions recorded since the last call, oldest first.
    pub fn take_outbox(&mut self) -> Vec<JournalEntry> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_then_commit_same_entry() {
        let mut journal = Journal::new();

        let handle = journal.log(OpKind::CreateFile, "/x");
        let pending: Vec<_> = journal.entries().collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, EntryStatus::Pending);

        journal.commit(handle).unwrap();
        assert_eq!(journal.len(), 1);
        let entry = journal.get(handle).unwrap();
        assert_eq!(entry.status, EntryStatus::Committed);
        assert_eq!(entry.operation, OpKind::CreateFile);
        assert_eq!(entry.details, "/x");
    }

    #[test]
    fn test_commit_twice() {
        let mut journal = Journal::new();
        let handle = journal.log(OpKind::CreateDir, "/d");

        journal.commit(handle).unwrap();
        assert_eq!(
            journal.commit(handle),
            Err(FsError::AlreadyCommitted(handle.position()))
        );
        assert!(journal.get(handle).unwrap().is_committed());
    }

    #[test]
    fn test_commit_unknown_handle() {
        let mut journal = Journal::new();
        assert_eq!(
            journal.commit(EntryHandle(3)),
            Err(FsError::InvalidHandle(3))
        );

        journal.log(OpKind::ListDir, "/");
        assert_eq!(
            journal.commit(EntryHandle(1)),
            Err(FsError::InvalidHandle(1))
        );
    }

    #[test]
    fn test_out_of_order_commits() {
        let mut journal = Journal::new();
        let first = journal.log(OpKind::CreateDir, "/a");
        let second = journal.log(OpKind::CreateDir, "/b");

        journal.commit(second).unwrap();
        assert!(!journal.get(first).unwrap().is_committed());
        assert!(journal.get(second).unwrap().is_committed());

        let pending: Vec<_> = journal.pending().map(|e| e.details.as_str()).collect();
        assert_eq!(pending, vec!["/a"]);
    }

    #[test]
    fn test_outbox_records_each_transition() {
        let mut journal = Journal::new();
        let handle = journal.log(OpKind::DeleteFile, "/f");
        journal.commit(handle).unwrap();
        journal.log(OpKind::DeleteDir, "/d");

        let drained = journal.take_outbox();
        let statuses: Vec<_> = drained.iter().map(|e| (e.seq, e.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (0, EntryStatus::Pending),
                (0, EntryStatus::Committed),
                (1, EntryStatus::Pending),
            ]
        );
        assert!(journal.take_outbox().is_empty());
        assert_eq!(journal.len(), 2);
    }

    #[test]
    fn test_ack_outbox_keeps_newer_transitions() {
        let mut journal = Journal::new();
        let handle = journal.log(OpKind::CreateFile, "/f");
        assert_eq!(journal.outbox().len(), 1);

        journal.commit(handle).unwrap();
        journal.ack_outbox(1);
        let left: Vec<_> = journal.outbox().iter().map(|e| e.status).collect();
        assert_eq!(left, vec![EntryStatus::Committed]);

        journal.ack_outbox(10);
        assert!(journal.outbox().is_empty());
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_display_line() {
        let mut journal = Journal::new();
        let handle = journal.log(OpKind::RenameDir, "from: /a to: b");

        let line = journal.get(handle).unwrap().to_string();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] RENAME_DIR: from: /a to: b (Status: PENDING)"));
        // "[YYYY-MM-DD HH:MM:SS]"
        assert_eq!(line.find(']'), Some(20));

        journal.commit(handle).unwrap();
        let line = journal.get(handle).unwrap().to_string();
        assert!(line.ends_with("(Status: COMMITTED)"));
    }

    #[test]
    fn test_entry_json_shape() {
        let mut journal = Journal::new();
        journal.log(OpKind::CopyFile, "from: /a to: /b");

        let entry = journal.entries().next().unwrap();
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["operation"], "COPY_FILE");
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["seq"], 0);
        assert!(value["timestamp"].is_u64());

        let back: JournalEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back.details, entry.details);
    }
}
