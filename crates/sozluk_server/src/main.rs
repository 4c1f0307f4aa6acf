//! Headless API server entrypoint.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sozluk_server::entry::run("sozluk-api").await
}
