//! Interactive command surface.
//!
//! Each line is parsed with clap and run against the session's filesystem.
//! Failures become messages; only `exit` ends the loop.

use std::time::SystemTime;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};

use crate::error::FsResult;
use crate::ops::FileSystem;
use crate::session::Session;
use crate::types::{NodeId, NodeInfo};

const LISTING_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Parser, Debug)]
#[command(name = "memtree-shell")]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellCli {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Create a directory
    Mkdir { path: String },
    /// Create a file, optionally with content
    Touch {
        path: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        content: Vec<String>,
    },
    /// Replace a file's content
    Write {
        path: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        content: Vec<String>,
    },
    /// Print a file's content
    Cat { path: String },
    /// List a directory
    Ls {
        path: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Change the current directory
    Cd {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print the current directory
    Pwd,
    /// Remove a file or an empty directory
    Rm { name: String },
    /// Remove an empty directory
    Rmdir { path: String },
    /// Rename a file or directory in place
    Mv { path: String, new_name: String },
    /// Copy a file
    Cp { source: String, dest: String },
    /// Show metadata
    Stat { path: String },
    /// Print the hierarchy below a directory
    Tree { path: Option<String> },
    /// Show the operation journal
    Journal {
        #[arg(long)]
        json: bool,
    },
    /// Leave the shell
    Exit,
}

/// What the read loop should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Exit,
}

pub struct Shell {
    fs: FileSystem,
    session: Session,
}

impl Shell {
    pub fn new(fs: FileSystem) -> Self {
        let session = Session::new(fs.tree());
        Self { fs, session }
    }

    pub fn fs(&self) -> &FileSystem {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut FileSystem {
        &mut self.fs
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn prompt(&self) -> String {
        let cwd = self.session.pwd(self.fs.tree()).unwrap_or_else(|_| "/".into());
        format!("fs:{cwd}> ")
    }

    pub fn execute(&mut self, line: &str) -> Outcome {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Outcome::Continue(String::new());
        }

        let cli = match ShellCli::try_parse_from(words) {
            Ok(cli) => cli,
            Err(e) => return Outcome::Continue(e.render().to_string().trim_end().to_string()),
        };

        match self.run(cli.command) {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Continue(format!("error: {e}")),
        }
    }

    fn abs(&self, path: &str) -> FsResult<String> {
        self.session.absolute(self.fs.tree(), path)
    }

    fn run(&mut self, command: ShellCommand) -> FsResult<Outcome> {
        let output = match command {
            ShellCommand::Mkdir { path } => {
                let path = self.abs(&path)?;
                self.fs.create_dir(&path)?;
                format!("directory created: {path}")
            }
            ShellCommand::Touch { path, content } => {
                let path = self.abs(&path)?;
                self.fs.create_file(&path, &content.join(" "))?;
                format!("file created: {path}")
            }
            ShellCommand::Write { path, content } => {
                let path = self.abs(&path)?;
                self.fs.write_file(&path, &content.join(" "))?;
                format!("file written: {path}")
            }
            ShellCommand::Cat { path } => self.fs.read_file(&self.abs(&path)?)?.to_string(),
            ShellCommand::Ls { path, json } => {
                let path = match path {
                    Some(path) => self.abs(&path)?,
                    None => self.session.pwd(self.fs.tree())?,
                };
                let entries = self.fs.list_dir(&path)?;
                if json {
                    serde_json::to_string_pretty(&entries)?
                } else {
                    format_listing(&path, &entries)
                }
            }
            ShellCommand::Cd { path } => {
                self.session.cd(self.fs.tree(), &path)?;
                String::new()
            }
            ShellCommand::Pwd => self.session.pwd(self.fs.tree())?,
            ShellCommand::Rm { name } => {
                let path = self.abs(&name)?;
                let is_dir = self
                    .fs
                    .tree()
                    .resolve(&path)
                    .and_then(|id| self.fs.tree().node(id).map(|node| node.is_dir()))
                    .unwrap_or(false);
                if is_dir {
                    self.fs.delete_dir(&path)?;
                    format!("directory removed: {path}")
                } else {
                    self.fs.delete_file(&path)?;
                    format!("file removed: {path}")
                }
            }
            ShellCommand::Rmdir { path } => {
                let path = self.abs(&path)?;
                self.fs.delete_dir(&path)?;
                format!("directory removed: {path}")
            }
            ShellCommand::Mv { path, new_name } => {
                let path = self.abs(&path)?;
                if self.fs.stat(&path).map(|info| info.is_dir()).unwrap_or(false) {
                    self.fs.rename_dir(&path, &new_name)?;
                } else {
                    self.fs.rename_file(&path, &new_name)?;
                }
                format!("renamed: {path} -> {new_name}")
            }
            ShellCommand::Cp { source, dest } => {
                let (source, dest) = (self.abs(&source)?, self.abs(&dest)?);
                let copy = self.fs.copy_file(&source, &dest)?;
                format!("copied: {source} -> {}", self.fs.tree().path(copy)?)
            }
            ShellCommand::Stat { path } => format_stat(&self.fs.stat(&self.abs(&path)?)?),
            ShellCommand::Tree { path } => {
                let start = self
                    .fs
                    .tree()
                    .resolve_from(self.session.cwd(self.fs.tree()), path.as_deref().unwrap_or("."))?;
                self.render_tree(start)?
            }
            ShellCommand::Journal { json } => {
                let journal = self.fs.journal();
                if json {
                    serde_json::to_string_pretty(&journal.entries().collect::<Vec<_>>())?
                } else if journal.is_empty() {
                    "no operations recorded".to_string()
                } else {
                    journal
                        .entries()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ShellCommand::Exit => return Ok(Outcome::Exit),
        };
        Ok(Outcome::Continue(output))
    }

    fn render_tree(&self, start: NodeId) -> FsResult<String> {
        let tree = self.fs.tree();
        let mut lines = Vec::new();
        for id in tree.walk(start)? {
            let mut depth = 0;
            let mut current = id;
            while current != start {
                match tree.parent(current)? {
                    Some(parent) => current = parent,
                    None => break,
                }
                depth += 1;
            }

            let node = tree.node(id)?;
            let label = if id == start {
                tree.path(id)?
            } else if node.is_dir() {
                format!("{}/", node.name())
            } else {
                node.name().to_string()
            };
            lines.push(format!("{}{label}", "  ".repeat(depth)));
        }
        Ok(lines.join("\n"))
    }
}

fn format_time(time: SystemTime, layout: &str) -> String {
    DateTime::<Local>::from(time).format(layout).to_string()
}

fn format_listing(path: &str, entries: &[NodeInfo]) -> String {
    if entries.is_empty() {
        return format!("{path}: empty directory");
    }

    entries
        .iter()
        .map(|entry| {
            let kind = if entry.is_dir() { "[DIR] " } else { "[FILE]" };
            let size = entry
                .size
                .map(|size| format!(" ({size} bytes)"))
                .unwrap_or_default();
            format!(
                "{kind} {:<20} {}{size}",
                entry.name,
                format_time(entry.modified, LISTING_TIME_FORMAT)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_stat(info: &NodeInfo) -> String {
    let detail = match (info.size, info.children) {
        (Some(size), _) => format!("size: {size} bytes"),
        (None, Some(count)) => format!("entries: {count}"),
        (None, None) => String::new(),
    };
    let time = "%Y-%m-%d %H:%M:%S";
    format!(
        "name: {}\npath: {}\ntype: {:?}\n{detail}\ncreated: {}\nmodified: {}",
        info.name,
        info.path,
        info.kind,
        format_time(info.created, time),
        format_time(info.modified, time),
    )
}
