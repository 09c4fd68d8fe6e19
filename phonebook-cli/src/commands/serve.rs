//! HTTP server command
//!
//! Serves the phone book pages over MySQL, or over an in-memory table for
//! local demos.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use phonebook_server::session::SessionKey;
use phonebook_server::{
    run_server, AppConfig, AppState, InMemoryPhoneBook, MySqlPhoneBook, PhoneBookStore,
    ServerConfig,
};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "PHONEBOOK_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Keep entries in memory instead of MySQL (lost on exit)
    #[arg(long)]
    pub in_memory: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = AppConfig::from_env();
    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY is not set; sessions are signed with the placeholder key");
    }

    let store: Arc<dyn PhoneBookStore> = if args.in_memory {
        tracing::info!("Using in-memory phone book");
        Arc::new(InMemoryPhoneBook::new())
    } else {
        tracing::info!(
            host = %config.database.host,
            database = %config.database.name,
            "Using MySQL phone book"
        );
        Arc::new(MySqlPhoneBook::new(&config.database))
    };

    let state = AppState::new(store, SessionKey::new(&config.secret_key));
    let server_config = ServerConfig {
        bind_addr: args.bind,
        request_timeout: Duration::from_secs(args.timeout),
    };

    // Run server (blocks until shutdown)
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
