use clap::Parser;
use scholar_cli::cli::{Cli, Command};
use scholar_cli::session::{Session, render_context, render_reports};
use scholar_cli::{repl, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format, cli.verbose)?;

    match cli.command {
        Command::Ask { retrieval, question, json } => {
            let mut session = Session::start(&retrieval).await?;
            let reports = session.ingest_paths(&retrieval.docs).await?;
            let context = session.ask(&question).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&context)?);
            } else {
                eprintln!("{}", render_reports(&reports));
                println!("{}", render_context(&context));
            }
        }
        Command::Chat { retrieval } => {
            let mut session = Session::start(&retrieval).await?;
            let reports = session.ingest_paths(&retrieval.docs).await?;
            println!("{}", render_reports(&reports));
            repl::run(&mut session).await?;
        }
    }

    Ok(())
}
