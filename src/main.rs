#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = assessly_rust::run().await {
        eprintln!("assessly-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
