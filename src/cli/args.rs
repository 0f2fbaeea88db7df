//! Command-line argument parsing for the adk-chat binary.
//!
//! Flags may appear anywhere; the first bare word selects the command and
//! the remaining words are its operands.

use thiserror::Error;

/// Command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// List the apps served by the agent server
    Apps,
    /// List sessions for the selected app and user
    Sessions,
    /// Create a session and print its id
    New,
    /// Print a session's transcript
    Show { session_id: String },
    /// Delete a session
    Delete { session_id: String },
    /// Send one message on a session and stream the reply
    Send { session_id: String, message: String },
    /// Interactive chat, on an existing session or a new one
    Chat { session_id: Option<String> },
}

/// Parsed arguments: global options plus the command.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub base_url: Option<String>,
    pub app: Option<String>,
    pub user_id: Option<String>,
    /// Number of `-v` occurrences.
    pub verbosity: u8,
    pub command: CliCommand,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            base_url: None,
            app: None,
            user_id: None,
            verbosity: 0,
            command: CliCommand::Chat { session_id: None },
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ArgsError {
    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("unknown option {0}")]
    UnknownOption(String),

    #[error("unknown command {0}")]
    UnknownCommand(String),

    #[error("{command} requires {operand}")]
    MissingOperand {
        command: &'static str,
        operand: &'static str,
    },

    #[error("unexpected argument {0}")]
    UnexpectedArgument(String),
}

pub const USAGE: &str = "\
Usage: adk-chat [OPTIONS] [COMMAND]

Commands:
  apps                        List available apps
  sessions                    List sessions for the app and user
  new                         Create a session
  show <session>              Print a session's transcript
  delete <session>            Delete a session
  send <session> <message..>  Send a message and stream the reply
  chat [session]              Interactive chat (default)

Options:
  --base-url <URL>   Agent server URL (env ADK_CHAT_BASE_URL)
  --app <NAME>       App name (env ADK_CHAT_APP)
  --user <ID>        User id (env ADK_CHAT_USER_ID)
  -v, -vv, -vvv      More log output on stderr (or set RUST_LOG)
  -V, --version      Print version
  -h, --help         Print this help
";

/// Parse command-line arguments.
///
/// `args` includes the program name, as `std::env::args()` yields it.
///
/// # Examples
///
/// ```
/// use adk_chat::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["adk-chat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap().command, CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<CliArgs, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut words = Vec::new();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                parsed.command = CliCommand::Version;
                return Ok(parsed);
            }
            "--help" | "-h" => {
                parsed.command = CliCommand::Help;
                return Ok(parsed);
            }
            "--base-url" => parsed.base_url = Some(value(&arg, args.next())?),
            "--app" => parsed.app = Some(value(&arg, args.next())?),
            "--user" => parsed.user_id = Some(value(&arg, args.next())?),
            flag if is_verbosity(flag) => {
                parsed.verbosity = parsed.verbosity.saturating_add((flag.len() - 1) as u8);
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(ArgsError::UnknownOption(arg));
            }
            _ => words.push(arg),
        }
    }

    parsed.command = command(words)?;
    Ok(parsed)
}

fn value(flag: &str, next: Option<String>) -> Result<String, ArgsError> {
    next.filter(|v| !v.starts_with('-'))
        .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
}

fn is_verbosity(flag: &str) -> bool {
    flag.len() > 1 && flag.starts_with('-') && flag[1..].chars().all(|c| c == 'v')
}

fn command(words: Vec<String>) -> Result<CliCommand, ArgsError> {
    let mut words = words.into_iter();
    let Some(name) = words.next() else {
        return Ok(CliCommand::Chat { session_id: None });
    };
    let mut operand = |command: &'static str, operand: &'static str| {
        words
            .next()
            .ok_or(ArgsError::MissingOperand { command, operand })
    };

    let command = match name.as_str() {
        "apps" => CliCommand::Apps,
        "sessions" => CliCommand::Sessions,
        "new" => CliCommand::New,
        "show" => CliCommand::Show {
            session_id: operand("show", "a session id")?,
        },
        "delete" => CliCommand::Delete {
            session_id: operand("delete", "a session id")?,
        },
        "send" => {
            let session_id = operand("send", "a session id")?;
            let message = words.by_ref().collect::<Vec<_>>().join(" ");
            if message.trim().is_empty() {
                return Err(ArgsError::MissingOperand {
                    command: "send",
                    operand: "a message",
                });
            }
            return Ok(CliCommand::Send {
                session_id,
                message,
            });
        }
        "chat" => CliCommand::Chat {
            session_id: words.next(),
        },
        _ => return Err(ArgsError::UnknownCommand(name)),
    };

    match words.next() {
        Some(extra) => Err(ArgsError::UnexpectedArgument(extra)),
        None => Ok(command),
    }
}
