//! Interactive chat loop.
//!
//! Lines starting with `/` are commands; anything else is sent as a message
//! on the current session, creating one first when needed. Ctrl-C during a
//! reply cancels the turn; Ctrl-D or `/quit` leaves.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use super::output;
use super::stream_turn;
use crate::controller::ChatController;
use crate::error::ChatError;

const REPL_HELP: &str = "\
Commands:
  /sessions        List sessions
  /open <id>       Open a session
  /delete <id>     Delete a session
  /new             Start a new chat
  /apps            List apps
  /app <name>      Switch app
  /user <id>       Switch user
  /history         Print the transcript
  /help            Show this help
  /quit            Exit";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplInput {
    Message(String),
    Sessions,
    Open(String),
    Delete(String),
    New,
    Apps,
    App(String),
    User(String),
    History,
    Help,
    Quit,
    Empty,
    /// A command that was not understood, with the reason.
    Invalid(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return ReplInput::Message(line.to_string());
        };

        let mut words = command.split_whitespace();
        let name = words.next().unwrap_or_default();
        let arg = words.next().map(str::to_string);

        let with_arg = |f: fn(String) -> ReplInput, what: &str| match &arg {
            Some(a) => f(a.clone()),
            None => ReplInput::Invalid(format!("/{} needs {}", name, what)),
        };

        match name {
            "sessions" => ReplInput::Sessions,
            "open" => with_arg(ReplInput::Open, "a session id"),
            "delete" => with_arg(ReplInput::Delete, "a session id"),
            "new" => ReplInput::New,
            "apps" => ReplInput::Apps,
            "app" => with_arg(ReplInput::App, "an app name"),
            "user" => with_arg(ReplInput::User, "a user id"),
            "history" => ReplInput::History,
            "help" => ReplInput::Help,
            "quit" | "exit" => ReplInput::Quit,
            other => ReplInput::Invalid(format!("unknown command /{}", other)),
        }
    }
}

/// Result of handling a command
enum CommandResult {
    Continue,
    Exit,
}

pub struct ChatRepl<'a> {
    controller: &'a ChatController,
}

impl<'a> ChatRepl<'a> {
    pub fn new(controller: &'a ChatController) -> Self {
        Self { controller }
    }

    /// Read lines from stdin until EOF or `/quit`.
    pub async fn run(&self) -> std::io::Result<()> {
        self.print_welcome();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            prompt()?;
            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            if let CommandResult::Exit = self.handle(ReplInput::parse(&line)).await {
                break;
            }
        }
        Ok(())
    }

    fn print_welcome(&self) {
        let state = self.controller.snapshot();
        println!(
            "app: {}  user: {}  session: {}",
            state.selected_app.as_deref().unwrap_or("-"),
            state.user_id,
            state.current_session_id().unwrap_or("-")
        );
        if !state.transcript.is_empty() {
            println!("{}", output::format_transcript(state.events()));
        }
        println!("Type /help for commands.");
    }

    async fn handle(&self, input: ReplInput) -> CommandResult {
        let ctl = self.controller;
        let outcome: Result<(), ChatError> = match input {
            ReplInput::Empty => Ok(()),
            ReplInput::Quit => return CommandResult::Exit,
            ReplInput::Help => {
                println!("{}", REPL_HELP);
                Ok(())
            }
            ReplInput::Invalid(reason) => {
                eprintln!("{}", reason);
                Ok(())
            }
            ReplInput::Message(text) => self.send(&text).await,
            ReplInput::Sessions => ctl.load_sessions().await.map(|sessions| {
                let current = ctl.snapshot().current_session_id().map(str::to_string);
                println!("{}", output::format_sessions(&sessions, current.as_deref()));
            }),
            ReplInput::Open(id) => ctl.select_session(&id).await.map(|()| {
                println!("{}", output::format_transcript(ctl.snapshot().events()));
            }),
            ReplInput::Delete(id) => ctl
                .delete_session(&id)
                .await
                .map(|()| println!("Deleted {}", id)),
            ReplInput::New => {
                ctl.new_chat();
                println!("New chat. The next message starts a session.");
                Ok(())
            }
            ReplInput::Apps => ctl.load_apps().await.map(|apps| {
                let selected = ctl.snapshot().selected_app;
                println!("{}", output::format_apps(&apps, selected.as_deref()));
            }),
            ReplInput::App(name) => {
                ctl.set_selected_app(&name);
                println!("App: {}", name);
                Ok(())
            }
            ReplInput::User(id) => {
                ctl.set_user_id(&id);
                println!("User: {}", id);
                Ok(())
            }
            ReplInput::History => {
                println!("{}", output::format_transcript(ctl.snapshot().events()));
                Ok(())
            }
        };

        if let Err(err) = outcome {
            self.report(&err);
        }
        CommandResult::Continue
    }

    async fn send(&self, text: &str) -> Result<(), ChatError> {
        let ctl = self.controller;
        if ctl.snapshot().current_session.is_none() {
            let id = ctl.create_session().await?;
            println!("Session {}", id);
        }
        let summary = stream_turn(ctl, text).await?;
        if summary.cancelled {
            println!("(cancelled)");
        }
        Ok(())
    }

    /// Print the stored error, which carries the action prefix, or the error
    /// itself for failures that leave state untouched.
    fn report(&self, err: &ChatError) {
        match self.controller.snapshot().error {
            Some(message) => {
                eprintln!("{}", message);
                self.controller.clear_error();
            }
            None => eprintln!("{}", err.user_message()),
        }
    }
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "> ")?;
    stdout.flush()
}
