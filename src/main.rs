use std::sync::Arc;

use adk_chat::cli::{self, parse_args, CliArgs, CliCommand};
use adk_chat::client::AgentClient;
use adk_chat::config::ClientConfig;
use adk_chat::controller::{CancelHandle, ChatController};
use adk_chat::preferences::PreferencesStore;
use adk_chat::state::ChatStore;

use color_eyre::eyre::{eyre, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {}\n\n{}", err, cli::USAGE);
            std::process::exit(2);
        }
    };

    match args.command {
        CliCommand::Version => {
            println!("{}", cli::version_line());
            return Ok(());
        }
        CliCommand::Help => {
            print!("{}", cli::help_text());
            return Ok(());
        }
        _ => {}
    }

    init_tracing(args.verbosity);

    let config = build_config(&args);
    info!(base_url = %config.base_url, "starting adk-chat");

    let client = AgentClient::from_config(&config).map_err(|e| eyre!(e.user_message()))?;
    let mut controller = ChatController::new(client, Arc::new(ChatStore::default()));
    match PreferencesStore::new() {
        Ok(preferences) => controller = controller.with_preferences(preferences),
        Err(err) => debug!(error = %err, "preferences disabled"),
    }
    controller.restore_preferences();
    if let Some(app) = &config.app {
        controller.set_selected_app(app);
    }
    if let Some(user_id) = &config.user_id {
        controller.set_user_id(user_id);
    }

    spawn_interrupt_handler(controller.cancel_handle());

    cli::run_command(args.command, &controller).await
}

/// Log to stderr. `RUST_LOG` wins over the `-v` flags.
fn init_tracing(verbosity: u8) {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        match verbosity {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("adk_chat=info"),
            2 => EnvFilter::new("adk_chat=debug"),
            _ => EnvFilter::new("adk_chat=trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Environment first, then flags.
fn build_config(args: &CliArgs) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &args.base_url {
        config = config.with_base_url(url.as_str());
    }
    if let Some(app) = &args.app {
        config = config.with_app(app.as_str());
    }
    if let Some(user_id) = &args.user_id {
        config = config.with_user_id(user_id.as_str());
    }
    config
}

/// First Ctrl-C cancels the streaming turn; with nothing streaming it exits.
fn spawn_interrupt_handler(handle: CancelHandle) {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if handle.cancel() {
                debug!("turn cancelled by interrupt");
            } else {
                std::process::exit(130);
            }
        }
    });
}
