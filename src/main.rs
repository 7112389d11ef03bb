use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, prelude::*};

use memtree::sink::flush;
use memtree::{Config, FileSystem, FsError, FsResult, JournalSink, Outcome, Shell};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = Config::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::new(&config.log))
        .init();

    if let Err(e) = run(config).await {
        error!(error = %e, "shell terminated");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> FsResult<()> {
    let fs = if config.seed {
        FileSystem::with_sample_layout()?
    } else {
        FileSystem::new()
    };
    let mut sink = config.file_sink();
    if let Some(sink) = &sink {
        info!(path = %sink.path().display(), format = ?config.format, "journal sink");
    }

    let mut shell = Shell::new(fs);
    flush_journal(&mut shell, sink.as_mut()).await;

    let mut editor = DefaultEditor::new().map_err(readline_error)?;
    println!("=== FILESYSTEM SIMULATOR ===");
    println!("Type 'help' for the available commands, 'exit' to leave\n");

    loop {
        let line = match editor.readline(&shell.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(readline_error(e)),
        };
        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }

        let outcome = shell.execute(&line);
        flush_journal(&mut shell, sink.as_mut()).await;
        match outcome {
            Outcome::Continue(output) if output.is_empty() => {}
            Outcome::Continue(output) => println!("{output}"),
            Outcome::Exit => break,
        }
    }

    println!("Leaving the simulator...");
    Ok(())
}

/// Push journal transitions recorded since the last successful flush.
async fn flush_journal<S: JournalSink>(shell: &mut Shell, sink: Option<&mut S>) {
    let journal = shell.fs_mut().journal_mut();
    let Some(sink) = sink else {
        journal.take_outbox();
        return;
    };
    if let Err(e) = flush(journal, sink).await {
        let held = journal.outbox().len();
        error!(error = %e, held, "failed to persist journal, will retry");
        eprintln!("warning: journal not saved ({e}); {held} entries held for retry");
    }
}

fn readline_error(e: ReadlineError) -> FsError {
    FsError::SystemIo(e.to_string())
}
