//! memtree: an in-memory file namespace whose every operation is journaled.

pub mod backends;
pub mod config;
pub mod error;
pub mod journal;
pub mod ops;
pub mod session;
pub mod shell;
pub mod sink;
pub mod types;

// Re-export
pub use backends::{NamespaceTree, Node, NodeData};
pub use config::Config;
pub use error::{FsError, FsResult};
pub use journal::{Journal, JournalEntry};
pub use ops::FileSystem;
pub use session::Session;
pub use shell::{Outcome, Shell};
pub use sink::{FileSink, JournalFormat, JournalSink, MemorySink};
pub use types::*;
