//! # scholar-cli
//!
//! Command-line front end for [`scholar_rag`]: load study notes into an
//! in-memory collection and retrieve passages for questions, either once
//! (`scholar ask`) or interactively (`scholar chat`).

pub mod cli;
pub mod repl;
pub mod session;
pub mod source;
pub mod telemetry;

pub use cli::{Cli, Command, EmbedderKind, RetrievalArgs};
pub use session::{Session, render_context, render_reports};
