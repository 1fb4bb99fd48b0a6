//! pusher-console entry point.
//!
//! Connects to the console endpoint and prints events as they arrive.
//! Ctrl-C disconnects.

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use pusher_console::{Console, ConsoleClient, ConsoleConfig, ConsoleHandler, PageOrigin};

#[derive(Parser, Debug)]
#[command(name = "pusher-console", version, about = "Watch the event stream of a Pusher-compatible server")]
struct Cli {
    /// Origin of the server, e.g. https://pusher.example.com (env: CONSOLE_ORIGIN)
    #[arg(long)]
    origin: Option<String>,

    /// Application key (env: PUSHER_APP_KEY)
    #[arg(long)]
    app_key: Option<String>,

    /// Application secret (env: PUSHER_SECRET)
    #[arg(long)]
    secret: Option<String>,

    /// Print the final event table as HTML on exit
    #[arg(long)]
    html: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ConsoleConfig::from_env().with_overrides(cli.origin, cli.app_key, cli.secret);
    tracing::debug!(?config, "loaded configuration");

    let origin = PageOrigin::parse(&config.origin)
        .with_context(|| format!("invalid origin {}", config.origin))?;
    let console = Arc::new(Mutex::new(Console::init(&origin)));

    {
        let console = console.lock().await;
        if !console.is_functional() {
            for line in console.view().status() {
                eprintln!("{}", line);
            }
            return Ok(());
        }
    }

    let (Some(app_key), Some(secret)) = (config.app_key, config.secret) else {
        bail!("an application key and secret are required");
    };

    let client = ConsoleClient::new(origin);
    client
        .add_event_handler(ConsoleHandler::new(Arc::clone(&console)).with_echo())
        .await;

    let credentials = {
        let mut console = console.lock().await;
        console.fill_credentials(&app_key, &secret);
        console.submit_connect()?
    };
    client.connect(credentials).await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            client.disconnect().await?;
            console.lock().await.submit_disconnect();
            client.wait_for_disconnect().await;
        }
        _ = client.wait_for_disconnect() => {}
    }

    let console = console.lock().await;
    tracing::info!(events = console.counter(), "console closed");
    if cli.html {
        println!("{}", console.view().render_html());
    }

    Ok(())
}
