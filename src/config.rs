//! Command-line configuration of the `memtree` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::sink::{FileSink, JournalFormat};

pub const DEFAULT_JOURNAL: &str = "filesystem.journal";
pub const DEFAULT_LOG_FILTER: &str = "memtree=warn";

#[derive(Parser, Debug, Clone)]
#[command(name = "memtree")]
#[command(about = "In-memory file namespace with an operation journal", long_about = None)]
pub struct Config {
    #[arg(
        long,
        env = "MEMTREE_JOURNAL",
        default_value = DEFAULT_JOURNAL,
        help = "File the journal is appended to"
    )]
    pub journal: PathBuf,

    #[arg(long, value_enum, default_value_t = JournalFormat::Text, help = "Journal line format")]
    pub format: JournalFormat,

    #[arg(long, help = "Keep the journal in memory only")]
    pub no_journal_file: bool,

    #[arg(long, help = "Start with /docs and /temp sample content")]
    pub seed: bool,

    #[arg(long, default_value = DEFAULT_LOG_FILTER, help = "tracing filter directive")]
    pub log: String,
}

impl Config {
    /// The on-disk sink, unless the journal stays in memory.
    pub fn file_sink(&self) -> Option<FileSink> {
        (!self.no_journal_file).then(|| FileSink::new(self.journal.clone(), self.format))
    }
}
