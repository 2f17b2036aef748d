#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = exam_helper::run().await {
        eprintln!("exam-helper fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
