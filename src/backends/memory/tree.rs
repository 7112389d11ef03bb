//! Core NamespaceTree implementation.
//!
//! Nodes live in an arena keyed by [`NodeId`]. Directories own their children
//! through the name map; the `parent` link is only followed upwards, to derive
//! paths and to step to `..`. Paths are never cached, so renaming a directory
//! needs no walk over its subtree.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{FsError, FsResult};
use crate::types::{NodeId, NodeInfo, ROOT_PATH, SEPARATOR};

use super::node::{Node, NodeData};

/// In-memory namespace tree with a root directory
#[derive(Debug, Clone)]
pub struct NamespaceTree {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl NamespaceTree {
    /// Create a new tree holding only the root directory
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(NodeId::ROOT, Node::new_dir(""));

        Self { nodes, next_id: 1 }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> FsResult<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| FsError::NotFound(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> FsResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| FsError::NotFound(id.to_string()))
    }

    /// Generate next unique node ID
    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Validates a single entry name
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(SEPARATOR)
            && !name.contains('\0')
    }

    /// Split a path into its parent part and final name.
    ///
    /// Trailing separators are ignored. A path without a separator has an
    /// empty parent part, which resolves to wherever resolution starts.
    pub fn split_parent(path: &str) -> FsResult<(&str, &str)> {
        let trimmed = path.trim_end_matches(SEPARATOR);
        if trimmed.is_empty() {
            return Err(FsError::InvalidPath(format!("no parent: {path:?}")));
        }

        Ok(match trimmed.rsplit_once(SEPARATOR) {
            Some(("", name)) => (ROOT_PATH, name),
            Some((parent, name)) => (parent, name),
            None => ("", trimmed),
        })
    }

    /// Resolve an absolute path from the root.
    pub fn resolve(&self, path: &str) -> FsResult<NodeId> {
        self.resolve_from(NodeId::ROOT, path)
    }

    /// Resolve `path` starting at `start`, or at the root when it is absolute.
    ///
    /// Empty segments are skipped, `.` stays put and `..` steps to the parent
    /// (the root is its own parent). Descending through a file is `NotFound`.
    pub fn resolve_from(&self, start: NodeId, path: &str) -> FsResult<NodeId> {
        let mut current = if path.starts_with(SEPARATOR) {
            NodeId::ROOT
        } else {
            start
        };

        for segment in path.split(SEPARATOR).filter(|s| !s.is_empty()) {
            let node = self.node(current)?;
            let Some(children) = node.children() else {
                return Err(FsError::NotFound(path.to_string()));
            };

            current = match segment {
                "." => current,
                ".." => node.parent.unwrap_or(current),
                name => *children
                    .get(name)
                    .ok_or_else(|| FsError::NotFound(path.to_string()))?,
            };
        }

        // a stale start id must not resolve to itself
        self.node(current)?;
        Ok(current)
    }

    /// Direct lookup of one entry, no traversal
    pub fn find_child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.nodes.get(&dir)?.children()?.get(name).copied()
    }

    pub fn parent(&self, id: NodeId) -> FsResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Derive the canonical path by walking parent links up to the root.
    ///
    /// Directories end with the separator (`/docs/`), files do not
    /// (`/docs/readme.txt`). The root is `/`.
    pub fn path(&self, id: NodeId) -> FsResult<String> {
        let node = self.node(id)?;
        let is_dir = node.is_dir();

        let mut segments = Vec::new();
        let mut current = node;
        while let Some(parent) = current.parent {
            segments.push(current.name.as_str());
            current = self.node(parent)?;
        }

        let mut path = String::from(ROOT_PATH);
        for segment in segments.iter().rev() {
            path.push_str(segment);
            path.push(SEPARATOR);
        }
        if !is_dir {
            path.pop();
        }
        Ok(path)
    }

    /// Attach `node` under `parent`.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> FsResult<NodeId> {
        let dir_path = self.path(parent)?;
        if !Self::is_valid_name(&node.name) {
            return Err(FsError::InvalidPath(format!("{dir_path}{}", node.name)));
        }

        let children = self
            .node(parent)?
            .children()
            .ok_or_else(|| FsError::NotADirectory(dir_path.clone()))?;
        if children.contains_key(&node.name) {
            return Err(FsError::AlreadyExists(format!("{dir_path}{}", node.name)));
        }

        let id = self.allocate_id();
        let name = node.name.clone();
        node.parent = Some(parent);
        self.nodes.insert(id, node);

        let dir = self.node_mut(parent)?;
        if let Some(children) = dir.children_mut() {
            children.insert(name.clone(), id);
        }
        dir.touch();

        debug!(parent = %dir_path, %name, %id, "attached node");
        Ok(id)
    }

    /// Detach the entry `name` from `parent` and hand it back.
    ///
    /// Directories must be empty; there is no cascading delete.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> FsResult<Node> {
        let dir_path = self.path(parent)?;
        let children = self
            .node(parent)?
            .children()
            .ok_or_else(|| FsError::NotADirectory(dir_path.clone()))?;
        let child = *children
            .get(name)
            .ok_or_else(|| FsError::NotFound(format!("{dir_path}{name}")))?;

        if let Some(grandchildren) = self.node(child)?.children() {
            if !grandchildren.is_empty() {
                return Err(FsError::NotEmpty(format!("{dir_path}{name}")));
            }
        }

        let dir = self.node_mut(parent)?;
        if let Some(children) = dir.children_mut() {
            children.remove(name);
        }
        dir.touch();

        let mut node = self
            .nodes
            .remove(&child)
            .ok_or_else(|| FsError::NotFound(child.to_string()))?;
        node.parent = None;

        debug!(parent = %dir_path, %name, id = %child, "detached node");
        Ok(node)
    }

    /// Give `id` a new name within its current directory.
    pub fn rename(&mut self, id: NodeId, new_name: &str) -> FsResult<()> {
        if id == NodeId::ROOT {
            return Err(FsError::PermissionDenied("cannot rename root".into()));
        }

        let node = self.node(id)?;
        let old_name = node.name.clone();
        let parent = node
            .parent
            .ok_or_else(|| FsError::NotFound(id.to_string()))?;
        let dir_path = self.path(parent)?;

        if !Self::is_valid_name(new_name) {
            return Err(FsError::InvalidPath(format!("{dir_path}{new_name}")));
        }

        if old_name == new_name {
            self.node_mut(id)?.touch();
            return Ok(());
        }

        if self.find_child(parent, new_name).is_some() {
            return Err(FsError::AlreadyExists(format!("{dir_path}{new_name}")));
        }

        let dir = self.node_mut(parent)?;
        if let Some(siblings) = dir.children_mut() {
            siblings.remove(&old_name);
            siblings.insert(new_name.to_string(), id);
        }
        dir.touch();

        let node = self.node_mut(id)?;
        node.name = new_name.to_string();
        node.touch();

        debug!(parent = %dir_path, from = %old_name, to = %new_name, "renamed node");
        Ok(())
    }

    pub fn content(&self, id: NodeId) -> FsResult<&str> {
        let node = self.node(id)?;
        match node.content() {
            Some(content) => Ok(content),
            None => Err(FsError::NotAFile(self.path(id)?)),
        }
    }

    /// Replace a file's content; its size follows the new content.
    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) -> FsResult<()> {
        let path = self.path(id)?;
        let node = self.node_mut(id)?;
        match &mut node.data {
            NodeData::File { content: current } => *current = content.into(),
            NodeData::Dir { .. } => return Err(FsError::NotAFile(path)),
        }
        node.touch();

        debug!(%path, size = node.size(), "replaced content");
        Ok(())
    }

    /// Convert a node to a NodeInfo
    pub fn stat(&self, id: NodeId) -> FsResult<NodeInfo> {
        let node = self.node(id)?;
        Ok(NodeInfo {
            id,
            name: node.name.clone(),
            path: self.path(id)?,
            kind: node.file_type(),
            size: node.is_file().then(|| node.size()),
            children: node.children().map(HashMap::len),
            created: node.created,
            modified: node.modified,
        })
    }

    /// Immediate entries of a directory, sorted by name
    pub fn children(&self, dir: NodeId) -> FsResult<Vec<NodeInfo>> {
        let children = self
            .node(dir)?
            .children()
            .ok_or_else(|| FsError::NotADirectory(self.path(dir).unwrap_or_default()))?;

        let mut entries = children
            .values()
            .map(|&id| self.stat(id))
            .collect::<FsResult<Vec<_>>>()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Pre-order walk of the subtree rooted at `start`, siblings by name.
    pub fn walk(&self, start: NodeId) -> FsResult<Vec<NodeId>> {
        self.node(start)?;

        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(children) = self.node(id)?.children() {
                let mut named: Vec<_> = children.iter().collect();
                // reversed so the smallest name is popped first
                named.sort_by(|a, b| b.0.cmp(a.0));
                stack.extend(named.into_iter().map(|(_, &child)| child));
            }
        }
        Ok(order)
    }
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}
