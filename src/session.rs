//! Per-shell state: the current directory.

use crate::backends::NamespaceTree;
use crate::error::{FsError, FsResult};
use crate::types::{NodeId, SEPARATOR};

#[derive(Debug, Clone, Copy)]
pub struct Session {
    cwd: NodeId,
}

impl Session {
    pub fn new(tree: &NamespaceTree) -> Self {
        Self { cwd: tree.root() }
    }

    /// Current directory. Falls back to the root if it has been removed.
    pub fn cwd(&self, tree: &NamespaceTree) -> NodeId {
        match tree.node(self.cwd) {
            Ok(node) if node.is_dir() => self.cwd,
            _ => tree.root(),
        }
    }

    pub fn pwd(&self, tree: &NamespaceTree) -> FsResult<String> {
        tree.path(self.cwd(tree))
    }

    /// Turn a session-relative path into an absolute one.
    pub fn absolute(&self, tree: &NamespaceTree, path: &str) -> FsResult<String> {
        if path.starts_with(SEPARATOR) {
            return Ok(path.to_string());
        }
        // directory paths already end with the separator
        Ok(format!("{}{}", self.pwd(tree)?, path))
    }

    /// Move to `path`, which must name a directory.
    pub fn cd(&mut self, tree: &NamespaceTree, path: &str) -> FsResult<NodeId> {
        let target = tree.resolve_from(self.cwd(tree), path)?;
        if !tree.node(target)?.is_dir() {
            return Err(FsError::NotADirectory(path.to_string()));
        }
        self.cwd = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::Node;

    fn tree() -> NamespaceTree {
        let mut tree = NamespaceTree::new();
        let docs = tree.add_child(tree.root(), Node::new_dir("docs")).unwrap();
        tree.add_child(docs, Node::new_file("a.txt", "a")).unwrap();
        tree
    }

    #[test]
    fn test_cd_and_back() {
        let tree = tree();
        let mut session = Session::new(&tree);
        assert_eq!(session.pwd(&tree).unwrap(), "/");

        session.cd(&tree, "docs").unwrap();
        assert_eq!(session.pwd(&tree).unwrap(), "/docs/");

        session.cd(&tree, "..").unwrap();
        assert_eq!(session.pwd(&tree).unwrap(), "/");

        // the root is its own parent
        session.cd(&tree, "..").unwrap();
        assert_eq!(session.cwd(&tree), tree.root());
    }

    #[test]
    fn test_cd_rejects_files_and_missing() {
        let tree = tree();
        let mut session = Session::new(&tree);

        assert!(matches!(
            session.cd(&tree, "/docs/a.txt"),
            Err(FsError::NotADirectory(_))
        ));
        assert!(matches!(session.cd(&tree, "nope"), Err(FsError::NotFound(_))));
        assert_eq!(session.pwd(&tree).unwrap(), "/");
    }

    #[test]
    fn test_absolute() {
        let tree = tree();
        let mut session = Session::new(&tree);
        assert_eq!(session.absolute(&tree, "x").unwrap(), "/x");

        session.cd(&tree, "/docs").unwrap();
        assert_eq!(session.absolute(&tree, "a.txt").unwrap(), "/docs/a.txt");
        assert_eq!(session.absolute(&tree, "/elsewhere").unwrap(), "/elsewhere");
    }

    #[test]
    fn test_removed_cwd_falls_back_to_root() {
        let mut tree = NamespaceTree::new();
        let temp = tree.add_child(tree.root(), Node::new_dir("temp")).unwrap();
        let mut session = Session::new(&tree);
        session.cd(&tree, "/temp").unwrap();
        assert_eq!(session.cwd(&tree), temp);

        let root = tree.root();
        tree.remove_child(root, "temp").unwrap();
        assert_eq!(session.cwd(&tree), tree.root());
        assert_eq!(session.pwd(&tree).unwrap(), "/");
    }
}
