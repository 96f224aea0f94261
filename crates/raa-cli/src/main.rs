//! `raa` binary

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    raa_cli::run().await
}
