use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    flora_cli::main_entry().await
}
