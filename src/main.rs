#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = tutontrack::run().await {
        eprintln!("tutontrack fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
