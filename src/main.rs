mod cli;
mod commands;
mod config;
mod error;
mod input;
mod store;
mod subtitle;

use clap::Parser;
use cli::{Cli, Command};
use colored::*;
use commands::generate::GenerateOverrides;
use commands::sync::SyncOverrides;
use error::NovelsubResult;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Tracing goes to stderr, gated on RUST_LOG so --json output stays clean
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        if let Some(hint) = e.hint() {
            eprintln!("{} {}", "hint:".yellow().bold(), hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> NovelsubResult<()> {
    match cli.command {
        Command::Init { path } => commands::init::run(&path),
        Command::Generate {
            input,
            project,
            format,
            encoding,
            output,
            json,
        } => commands::generate::run(
            &input,
            &project,
            GenerateOverrides {
                format,
                encoding,
                output,
            },
            json,
        ),
        Command::Sync {
            input,
            project,
            mode,
            format,
            offset,
            output,
            json,
        } => commands::sync::run(
            &input,
            &project,
            SyncOverrides {
                mode,
                format,
                offset,
                output,
            },
            json,
        ),
        Command::Check { file, json } => commands::check::run(&file, json),
        Command::Preview {
            filename,
            project,
            offset,
            speed,
            json,
        } => commands::preview::run(&project, &filename, offset, speed, json),
        Command::Files { action, project } => commands::files::run(&project, action),
        Command::Batch {
            inputs,
            project,
            parallel,
        } => commands::batch::run(&inputs, &project, parallel).await,
    }
}
