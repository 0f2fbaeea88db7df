//! Command-line front end.
//!
//! - `args`: flag and command parsing
//! - `output`: plain-text formatting, including the incremental stream printer
//! - `repl`: the interactive `chat` loop
//! - `version`: version and help text
//!
//! ```ignore
//! use adk_chat::cli::{parse_args, run_command};
//!
//! let args = parse_args(std::env::args())?;
//! run_command(args.command, &controller).await?;
//! ```

pub mod args;
pub mod output;
pub mod repl;
pub mod version;

pub use args::{parse_args, ArgsError, CliArgs, CliCommand, USAGE};
pub use repl::ChatRepl;
pub use version::{help_text, version_line, VERSION};

use std::io::Write;

use color_eyre::eyre::{bail, Result};

use crate::controller::ChatController;
use crate::error::ChatResult;
use crate::stream::StreamSummary;

/// Run a parsed command against the agent server.
///
/// `Version` and `Help` print and return without touching the network.
pub async fn run_command(command: CliCommand, controller: &ChatController) -> Result<()> {
    match command {
        CliCommand::Version => println!("{}", version_line()),
        CliCommand::Help => print!("{}", help_text()),
        CliCommand::Apps => {
            let apps = controller.load_apps().await?;
            let state = controller.snapshot();
            println!("{}", output::format_apps(&apps, state.selected_app.as_deref()));
        }
        CliCommand::Sessions => {
            ensure_app(controller).await?;
            let sessions = controller.load_sessions().await?;
            println!("{}", output::format_sessions(&sessions, None));
        }
        CliCommand::New => {
            ensure_app(controller).await?;
            let id = controller.create_session().await?;
            println!("{}", id);
        }
        CliCommand::Show { session_id } => {
            ensure_app(controller).await?;
            controller.select_session(&session_id).await?;
            println!("{}", output::format_transcript(controller.snapshot().events()));
        }
        CliCommand::Delete { session_id } => {
            ensure_app(controller).await?;
            controller.delete_session(&session_id).await?;
            println!("Deleted {}", session_id);
        }
        CliCommand::Send {
            session_id,
            message,
        } => {
            ensure_app(controller).await?;
            controller.select_session(&session_id).await?;
            let summary = stream_turn(controller, &message).await?;
            if summary.cancelled {
                eprintln!("(cancelled)");
            }
        }
        CliCommand::Chat { session_id } => {
            ensure_app(controller).await?;
            match session_id {
                Some(id) => controller.select_session(&id).await?,
                None => {
                    controller.create_session().await?;
                }
            }
            ChatRepl::new(controller).run().await?;
        }
    }
    Ok(())
}

/// Select the first served app when none is selected yet.
pub async fn ensure_app(controller: &ChatController) -> Result<String> {
    if let Some(app) = controller.snapshot().selected_app {
        return Ok(app);
    }
    controller.load_apps().await?;
    match controller.snapshot().selected_app {
        Some(app) => Ok(app),
        None => bail!("The agent server has no apps"),
    }
}

/// Send `message` and print the reply to stdout as it streams in.
pub async fn stream_turn(controller: &ChatController, message: &str) -> ChatResult<StreamSummary> {
    let mut rx = controller.subscribe();
    let mut printer = output::StreamPrinter::new(rx.borrow_and_update().events().len());

    let send = controller.send_message(message);
    tokio::pin!(send);

    let result = loop {
        tokio::select! {
            result = &mut send => break result,
            changed = rx.changed() => {
                if changed.is_err() {
                    break (&mut send).await;
                }
                let chunk = printer.render(rx.borrow_and_update().events());
                write_stdout(&chunk);
            }
        }
    };

    let mut tail = printer.render(controller.snapshot().events());
    tail.push_str(&printer.finish());
    write_stdout(&tail);
    result
}

fn write_stdout(chunk: &str) {
    if chunk.is_empty() {
        return;
    }
    let mut stdout = std::io::stdout().lock();
    if let Err(err) = stdout.write_all(chunk.as_bytes()).and_then(|_| stdout.flush()) {
        tracing::debug!(error = %err, "stdout write failed");
    }
}
