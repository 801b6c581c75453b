use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use daddyhd_resolver::{AppConfig, ChannelResolver, DaddyHdService, Logger, SiteAdapter};

// glue entry point - everything interesting lives in the resolver module,
// this just runs one batch and prints the result
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(AppConfig::parse());

    // init logger and sentry, guards are kept alive to flush logs and maintain sentry connection
    let _guards = Logger::init(&config);

    info!("logger and env prepped, building resolver...");

    let mut adapter = SiteAdapter::current();
    if let Some(index_url) = &config.index_url {
        info!("index url overridden to {}", index_url);
        adapter.index_url = index_url.clone();
    }

    let resolver = DaddyHdService::new(adapter);

    let channels = resolver
        .resolve_all()
        .await
        .context("channel listing could not be resolved")?;

    info!("resolved {} channels", channels.len());

    // downstream playlist builder eats this straight off stdout
    let json = serde_json::to_string_pretty(&channels).context("failed to serialize channels")?;
    println!("{}", json);

    Ok(())
}
