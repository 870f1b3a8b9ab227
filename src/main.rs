use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    futon_cli::cli::run().await
}
