// SPDX-License-Identifier: MIT

//! Steam-Shelf CLI
//!
//! Drives the login and logout workflows from a terminal, standing in for
//! the mobile UI: prints the Steam authentication URL, waits for the
//! redirect URL to be pasted back, and reports the typed result.

use steam_shelf::{
    config::Config,
    db::{keys, CredentialStore, FileCredentialStore, GameStore, MemoryGameStore},
    error::Result,
    services::{auth, BrowserLauncher},
    App,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Launcher for terminal sessions: prints the URL for the user to open.
struct TerminalLauncher;

impl BrowserLauncher for TerminalLauncher {
    fn open(&self, url: &str) -> Result<()> {
        println!("Open this URL in your browser to sign in with Steam:\n\n  {}\n", url);
        println!("After signing in, paste the redirect URL here and press Enter.");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(return_url = %config.return_url, "Starting Steam-Shelf CLI");

    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
    let games: Arc<dyn GameStore> = Arc::new(MemoryGameStore::new());

    let app = App::new(config, credentials.clone(), games.clone(), Arc::new(TerminalLauncher));

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--logout") {
        let purge = args.iter().any(|a| a == "--purge");
        run_logout(&app, purge).await;
        return Ok(());
    }

    run_login(&app, &credentials, &games).await?;
    Ok(())
}

async fn run_login(
    app: &App,
    credentials: &Arc<dyn CredentialStore>,
    games: &Arc<dyn GameStore>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let api_key = match credentials.get(keys::API_KEY).await? {
        Some(key) if !key.is_empty() => key,
        _ => prompt("Steam Web API key: ")?,
    };

    // The deep-link dispatcher is a pasted line on stdin here: read it on a
    // blocking task and deliver it to the broker like the platform would.
    let broker = app.broker.clone();
    tokio::task::spawn_blocking(move || {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(_) => {
                let trimmed = line.trim();
                broker.handle_callback(if trimmed.is_empty() { None } else { Some(trimmed) });
            }
            Err(_) => broker.handle_callback(None),
        }
    });

    let result = app.auth.login(&api_key).await;
    println!("{}", auth::status_message(&result));

    if let Some(user) = &result.user {
        let owned = app.steam_api.get_owned_games(&user.steam_id, &api_key).await?;
        let summary = app.steam_api.import_games(games.as_ref(), owned).await?;
        println!(
            "Imported {} games ({} already present).",
            summary.imported, summary.skipped
        );
    }

    Ok(())
}

async fn run_logout(app: &App, purge: bool) {
    let result = app.logout.logout(purge).await;

    if result.error_details.is_empty() {
        println!("Logged out.");
    } else {
        println!("Logged out with partial failures:");
        for (step, error) in &result.error_details {
            println!("  {}: {}", step, error);
        }
    }
    if purge {
        println!("Removed {} games.", result.games_deleted_count);
    }

    if !app.logout.validate_logout().await {
        eprintln!("Warning: stored credentials were not fully cleared.");
    }
}

fn prompt(message: &str) -> std::io::Result<String> {
    use std::io::Write;
    print!("{}", message);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Initialize logging with an environment-driven filter.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("steam_shelf=info".parse().unwrap()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
