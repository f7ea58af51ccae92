use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fleetauth_cli::run().await.context("fleetauth failed")
}
