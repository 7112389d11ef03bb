pub mod memory;

pub use memory::{NamespaceTree, Node, NodeData};
