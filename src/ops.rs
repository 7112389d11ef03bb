//! Journaled filesystem operations.
//!
//! Every mutating call logs its entry first, then resolves and mutates, then
//! commits. A failure returns the error and leaves the entry pending.

use tracing::warn;

use crate::backends::{NamespaceTree, Node};
use crate::error::{FsError, FsResult};
use crate::journal::Journal;
use crate::types::{NodeId, NodeInfo, OpKind};

/// A namespace tree together with the journal of everything done to it
#[derive(Debug)]
pub struct FileSystem {
    tree: NamespaceTree,
    journal: Journal,
}

impl FileSystem {
    pub fn new() -> Self {
        let mut journal = Journal::new();
        let init = journal.log(OpKind::Init, "filesystem initialized");
        journal.commit(init).ok();

        Self {
            tree: NamespaceTree::new(),
            journal,
        }
    }

    /// Demo layout: two directories with one file each.
    pub fn with_sample_layout() -> FsResult<Self> {
        let mut fs = Self::new();
        fs.create_dir("/docs")?;
        fs.create_dir("/temp")?;
        fs.create_file("/docs/readme.txt", "This is a sample file")?;
        fs.create_file("/temp/log.txt", "System operation log")?;
        Ok(fs)
    }

    pub fn tree(&self) -> &NamespaceTree {
        &self.tree
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn journal_mut(&mut self) -> &mut Journal {
        &mut self.journal
    }

    fn journaled<T>(
        &mut self,
        operation: OpKind,
        details: impl Into<String>,
        mutate: impl FnOnce(&mut NamespaceTree) -> FsResult<T>,
    ) -> FsResult<T> {
        let handle = self.journal.log(operation, details);
        match mutate(&mut self.tree) {
            Ok(value) => {
                self.journal.commit(handle)?;
                Ok(value)
            }
            Err(e) => {
                warn!(%operation, seq = handle.position(), error = %e, "operation failed, entry left pending");
                Err(e)
            }
        }
    }

    pub fn create_file(&mut self, path: &str, content: &str) -> FsResult<NodeId> {
        self.journaled(OpKind::CreateFile, format!("file: {path}"), |tree| {
            let (parent, name) = NamespaceTree::split_parent(path)?;
            let dir = tree.resolve(parent)?;
            tree.add_child(dir, Node::new_file(name, content))
        })
    }

    pub fn create_dir(&mut self, path: &str) -> FsResult<NodeId> {
        self.journaled(OpKind::CreateDir, format!("directory: {path}"), |tree| {
            let (parent, name) = NamespaceTree::split_parent(path)?;
            let dir = tree.resolve(parent)?;
            tree.add_child(dir, Node::new_dir(name))
        })
    }

    pub fn delete_file(&mut self, path: &str) -> FsResult<()> {
        self.journaled(OpKind::DeleteFile, format!("file: {path}"), |tree| {
            let (parent, name) = NamespaceTree::split_parent(path)?;
            let dir = tree.resolve(parent)?;
            let target = tree
                .find_child(dir, name)
                .ok_or_else(|| FsError::NotFound(path.to_string()))?;
            if !tree.node(target)?.is_file() {
                return Err(FsError::NotAFile(path.to_string()));
            }
            tree.remove_child(dir, name).map(drop)
        })
    }

    pub fn delete_dir(&mut self, path: &str) -> FsResult<()> {
        self.journaled(OpKind::DeleteDir, format!("directory: {path}"), |tree| {
            if tree.resolve(path)? == tree.root() {
                return Err(FsError::PermissionDenied("cannot remove root".into()));
            }
            let (parent, name) = NamespaceTree::split_parent(path)?;
            let dir = tree.resolve(parent)?;
            let target = tree
                .find_child(dir, name)
                .ok_or_else(|| FsError::NotFound(path.to_string()))?;
            if !tree.node(target)?.is_dir() {
                return Err(FsError::NotADirectory(path.to_string()));
            }
            tree.remove_child(dir, name).map(drop)
        })
    }

    pub fn rename_file(&mut self, path: &str, new_name: &str) -> FsResult<()> {
        self.journaled(
            OpKind::RenameFile,
            format!("from: {path} to: {new_name}"),
            |tree| {
                let target = tree.resolve(path)?;
                if !tree.node(target)?.is_file() {
                    return Err(FsError::NotAFile(path.to_string()));
                }
                tree.rename(target, new_name)
            },
        )
    }

    pub fn rename_dir(&mut self, path: &str, new_name: &str) -> FsResult<()> {
        self.journaled(
            OpKind::RenameDir,
            format!("from: {path} to: {new_name}"),
            |tree| {
                let target = tree.resolve(path)?;
                if !tree.node(target)?.is_dir() {
                    return Err(FsError::NotADirectory(path.to_string()));
                }
                tree.rename(target, new_name)
            },
        )
    }

    /// Copy a file. When `dest` is an existing directory the copy keeps the
    /// source name inside it; otherwise `dest` names the new file.
    pub fn copy_file(&mut self, source: &str, dest: &str) -> FsResult<NodeId> {
        self.journaled(
            OpKind::CopyFile,
            format!("from: {source} to: {dest}"),
            |tree| {
                let src = tree.resolve(source)?;
                let src_node = tree.node(src)?;
                let content = src_node
                    .content()
                    .ok_or_else(|| FsError::NotAFile(source.to_string()))?
                    .to_string();
                let src_name = src_node.name().to_string();

                let (dir, name) = match tree.resolve(dest) {
                    Ok(id) if tree.node(id)?.is_dir() => (id, src_name),
                    Ok(_) => return Err(FsError::AlreadyExists(dest.to_string())),
                    Err(FsError::NotFound(_)) => {
                        let (parent, name) = NamespaceTree::split_parent(dest)?;
                        (tree.resolve(parent)?, name.to_string())
                    }
                    Err(e) => return Err(e),
                };
                tree.add_child(dir, Node::new_file(name, content))
            },
        )
    }

    /// Replace a file's content.
    pub fn write_file(&mut self, path: &str, content: &str) -> FsResult<()> {
        self.journaled(OpKind::WriteFile, format!("file: {path}"), |tree| {
            let target = tree.resolve(path)?;
            tree.set_content(target, content)
        })
    }

    /// List a directory. Read-only, journaled for the audit trail.
    pub fn list_dir(&mut self, path: &str) -> FsResult<Vec<NodeInfo>> {
        self.journaled(OpKind::ListDir, format!("directory: {path}"), |tree| {
            let dir = tree.resolve(path)?;
            tree.children(dir)
        })
    }

    pub fn read_file(&self, path: &str) -> FsResult<&str> {
        let target = self.tree.resolve(path)?;
        self.tree.content(target)
    }

    pub fn stat(&self, path: &str) -> FsResult<NodeInfo> {
        let target = self.tree.resolve(path)?;
        self.tree.stat(target)
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}
