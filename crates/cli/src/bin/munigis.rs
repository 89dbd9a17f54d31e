use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    munigis_cli::main_entry().await
}
