use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use recipe_chat_core::{ChatSession, Config, RasaClient, Sender};

mod app;
mod handler;
mod logging;
#[cfg(test)]
mod test_utils;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "recipe-chat", version)]
#[command(about = "Chat with a Rasa recipe assistant from the terminal")]
struct Cli {
    /// Agent webhook URL (overrides the saved endpoint)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat window (default)
    Chat,
    /// Send one message and print the agent's replies
    Send {
        /// Message text
        message: String,
    },
    /// Show the agent endpoint, or save a new one
    Endpoint {
        /// Webhook URL to save as the default
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = logging::init() {
        eprintln!("{}: {}", "Logging disabled".yellow(), err);
    }

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "could not read config, using defaults");
        Config::new()
    });
    let endpoint = config.endpoint(cli.endpoint.as_deref());

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(RasaClient::new(&endpoint)).await?,
        Commands::Send { message } => send_once(&RasaClient::new(&endpoint), &message).await,
        Commands::Endpoint { url: Some(url) } => {
            Config::save_endpoint(&url)?;
            println!("Saved endpoint {}", url.green());
        }
        Commands::Endpoint { url: None } => println!("{}", endpoint),
    }

    Ok(())
}

async fn run_chat(client: RasaClient) -> Result<()> {
    tracing::info!(endpoint = %client.endpoint(), "starting chat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(client);

    let result = event_loop(&mut terminal, &mut app, &mut events).await;

    if let Some(pending) = app.pending.take() {
        pending.abort();
    }
    tui::restore()?;
    result
}

async fn event_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await,
            None => break,
        }
    }
    Ok(())
}

async fn send_once(client: &RasaClient, message: &str) {
    let mut session = ChatSession::new();
    session.submit(client, message).await;

    for msg in session.conversation() {
        if msg.sender() == Sender::Agent {
            println!("{} {}", "Bot:".bold().yellow(), msg.text());
        }
    }
}
