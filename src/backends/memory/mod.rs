//! In-memory namespace tree.

mod node;
mod tree;


pub use node::{Node, NodeData};
pub use tree::NamespaceTree;
