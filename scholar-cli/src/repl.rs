//! Interactive question loop for `scholar chat`.

use std::path::PathBuf;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

use crate::session::{Session, render_context, render_reports};

const HELP: &str = "\
Commands:
  /add <path>...  ingest more documents
  /stats          show how many chunks are indexed
  /help           show this message
  /quit           leave
Anything else is treated as a question.";

/// One line of chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Question(String),
    Add(Vec<PathBuf>),
    Stats,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Input {
    /// Parse a line typed at the prompt.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Question(line.to_string());
        };

        let mut words = command.split_whitespace();
        match words.next().unwrap_or_default() {
            "quit" | "exit" | "q" => Self::Quit,
            "stats" => Self::Stats,
            "help" | "?" => Self::Help,
            "add" => Self::Add(words.map(PathBuf::from).collect()),
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Run the prompt until `/quit`, Ctrl-D or Ctrl-C.
pub async fn run(session: &mut Session) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("{} chunk(s) indexed. Type /help for commands.", session.chunk_count().await);

    loop {
        let line = match editor.readline("scholar> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let _ = editor.add_history_entry(line.as_str());

        match Input::parse(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Stats => println!("{} chunk(s) indexed", session.chunk_count().await),
            Input::Unknown(name) => println!("unknown command /{name}; type /help"),
            Input::Add(paths) if paths.is_empty() => println!("usage: /add <path>..."),
            Input::Add(paths) => match session.ingest_paths(&paths).await {
                Ok(reports) => println!("{}", render_reports(&reports)),
                Err(e) => {
                    warn!(error = %e, "ingest from prompt failed");
                    println!("error: {e:#}");
                }
            },
            Input::Question(question) => match session.ask(&question).await {
                Ok(context) => println!("{}", render_context(&context)),
                Err(e) => {
                    warn!(error = %e, "question failed");
                    println!("error: {e:#}");
                }
            },
        }
    }
    Ok(())
}
