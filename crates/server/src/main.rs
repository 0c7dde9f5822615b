//! Abkverz Server - HTTP REST API for the abbreviation registry

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    server::start_server(config).await?;

    Ok(())
}
