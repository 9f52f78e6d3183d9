// Binary entry point for xmpp-api

mod cli;
mod logging;
mod output;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
