use invoice_export::{Client, Config, ContactResolver, Exporter, PaginationEngine};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> miette::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    let config = Config::from_env()?;
    let mut client = Client::with_timeout(
        config.base_url.clone(),
        config.token_url.clone(),
        config.key_pair(),
        config.token_store(),
        config.request_timeout,
    )?;

    let engine = PaginationEngine::new(config.page_size, config.organization.clone());
    let mut resolver = ContactResolver::new();
    let report = engine.run(&mut client, &mut resolver).await?;

    Exporter::new(&config.csv_path).export(&report)?;
    Ok(())
}
