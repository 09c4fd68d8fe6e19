//! Database connectivity check

use anyhow::{Context, Result};
use clap::Parser;

use phonebook_server::{AppConfig, MySqlPhoneBook, PhoneBookStore};

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {}

/// Read the whole table once and report how many entries it holds
pub async fn run_check(_args: CheckArgs) -> Result<()> {
    let config = AppConfig::from_env();
    let store = MySqlPhoneBook::new(&config.database);

    let entries = store.read(None).await.with_context(|| {
        format!(
            "Failed to read phone_book from {}/{}",
            config.database.host, config.database.name
        )
    })?;

    println!(
        "{}/{}: {} entries",
        config.database.host,
        config.database.name,
        entries.len()
    );
    Ok(())
}
