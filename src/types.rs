//! Core types shared by the tree, the journal and the shell.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;
use std::time::SystemTime;

/// Path separator, and the canonical path of the root directory.
pub const SEPARATOR: char = '/';
pub const ROOT_PATH: &str = "/";

/// Enum for distinguishing node types at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Dir,
}

/// Arena key of a node in the namespace tree.
///
/// Ids are never reused, so a stale id resolves to `NotFound` instead of
/// aliasing a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node metadata snapshot (what `stat` and `ls` report)
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub path: String,
    pub kind: FileType,
    /// Content length in bytes, files only
    pub size: Option<u64>,
    /// Number of entries, directories only
    pub children: Option<usize>,
    #[serde(with = "serde_millis")]
    pub created: SystemTime,
    #[serde(with = "serde_millis")]
    pub modified: SystemTime,
}

impl NodeInfo {
    pub fn is_dir(&self) -> bool {
        self.kind == FileType::Dir
    }
}

/// Symbolic tag of a journaled operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpKind {
    Init,
    CreateFile,
    CreateDir,
    DeleteFile,
    DeleteDir,
    RenameFile,
    RenameDir,
    CopyFile,
    WriteFile,
    ListDir,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Init => "INIT",
            OpKind::CreateFile => "CREATE_FILE",
            OpKind::CreateDir => "CREATE_DIR",
            OpKind::DeleteFile => "DELETE_FILE",
            OpKind::DeleteDir => "DELETE_DIR",
            OpKind::RenameFile => "RENAME_FILE",
            OpKind::RenameDir => "RENAME_DIR",
            OpKind::CopyFile => "COPY_FILE",
            OpKind::WriteFile => "WRITE_FILE",
            OpKind::ListDir => "LIST_DIR",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-phase status of a journal entry. Moves from `Pending` to `Committed` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Pending,
    Committed,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Pending => f.write_str("PENDING"),
            EntryStatus::Committed => f.write_str("COMMITTED"),
        }
    }
}

/// Identity of one journal entry: its position in the append sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryHandle(pub(crate) usize);

impl EntryHandle {
    pub fn position(self) -> usize {
        self.0
    }
}
