//! Node representation for the in-memory namespace tree.

use std::collections::HashMap;
use std::time::SystemTime;

use crate::types::{FileType, NodeId};

/// Variant-specific payload - either a file or directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    File { content: String },
    Dir { children: HashMap<String, NodeId> },
}

/// A file or directory, with the metadata both share.
#[derive(Debug, Clone)]
pub struct Node {
    pub(super) name: String,
    /// Non-owning link to the containing directory, `None` for the root
    /// and for detached nodes.
    pub(super) parent: Option<NodeId>,
    pub(super) created: SystemTime,
    pub(super) modified: SystemTime,
    pub(super) data: NodeData,
}

impl Node {
    /// Create a new file holding `content`
    pub fn new_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_data(
            name.into(),
            NodeData::File {
                content: content.into(),
            },
        )
    }

    /// Create a new empty directory
    pub fn new_dir(name: impl Into<String>) -> Self {
        Self::with_data(
            name.into(),
            NodeData::Dir {
                children: HashMap::new(),
            },
        )
    }

    fn with_data(name: String, data: NodeData) -> Self {
        let now = SystemTime::now();
        Node {
            name,
            parent: None,
            created: now,
            modified: now,
            data,
        }
    }

    /// Name within the parent directory, empty for the root
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Containing directory, if attached
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Creation time
    pub fn created(&self) -> SystemTime {
        self.created
    }

    /// Last modification time
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Borrow the file or directory payload
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Check if this node is a file
    pub fn is_file(&self) -> bool {
        matches!(self.data, NodeData::File { .. })
    }

    /// Check if this node is a directory
    pub fn is_dir(&self) -> bool {
        matches!(self.data, NodeData::Dir { .. })
    }

    /// File or directory tag
    pub fn file_type(&self) -> FileType {
        match self.data {
            NodeData::File { .. } => FileType::File,
            NodeData::Dir { .. } => FileType::Dir,
        }
    }

    /// Content length in bytes (0 for directories)
    pub fn size(&self) -> u64 {
        match &self.data {
            NodeData::File { content } => content.len() as u64,
            NodeData::Dir { .. } => 0,
        }
    }

    /// File content, `None` for directories
    pub fn content(&self) -> Option<&str> {
        match &self.data {
            NodeData::File { content } => Some(content),
            NodeData::Dir { .. } => None,
        }
    }

    /// Child name table, `None` for files
    pub fn children(&self) -> Option<&HashMap<String, NodeId>> {
        match &self.data {
            NodeData::Dir { children } => Some(children),
            NodeData::File { .. } => None,
        }
    }

    pub(super) fn children_mut(&mut self) -> Option<&mut HashMap<String, NodeId>> {
        match &mut self.data {
            NodeData::Dir { children } => Some(children),
            NodeData::File { .. } => None,
        }
    }

    /// Bump the modification time. Never moves it before `created`.
    pub(super) fn touch(&mut self) {
        let now = SystemTime::now();
        self.modified = if now < self.created { self.created } else { now };
    }
}
