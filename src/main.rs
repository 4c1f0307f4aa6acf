//! Headless API server entrypoint.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sozluk::entry::run("sozluk-server").await
}
