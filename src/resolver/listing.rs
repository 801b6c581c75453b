use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info};

use super::adapter::SiteAdapter;
use super::error::{ResolveError, ResolveResult};
use super::http;
use super::model::ChannelDescriptor;

static CHANNEL_ENTRY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.grid-item").expect("valid grid-item selector"));
static CHANNEL_ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("valid anchor selector"));

/// GET the index page and parse out one descriptor per channel
pub async fn fetch_channels(
    client: &reqwest::Client,
    adapter: &SiteAdapter,
) -> ResolveResult<Vec<ChannelDescriptor>> {
    info!("fetching channel listing from {}", adapter.index_url);
    let body = http::get_text_with_retry(client, &adapter.index_url, None).await?;
    parse_listing(adapter, &body)
}

/// pull `ChannelDescriptor`s out of the index page markup, source order
/// preserved, age-restricted entries dropped
pub fn parse_listing(
    adapter: &SiteAdapter,
    body: &str,
) -> ResolveResult<Vec<ChannelDescriptor>> {
    let document = Html::parse_document(body);
    let mut channels = Vec::new();

    for entry in document.select(&CHANNEL_ENTRY) {
        let Some(href) = entry
            .select(&CHANNEL_ANCHOR)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
        else {
            continue;
        };

        let href = href.trim();
        if !adapter.channel_link.is_match(href) {
            continue;
        }

        let name = entry.text().collect::<String>().trim().to_string();
        if name.contains(adapter.age_marker) {
            debug!("skipping age-restricted entry '{}'", name);
            continue;
        }

        let page_url = SiteAdapter::absolute_url(&adapter.index_url, href)?;
        channels.push(ChannelDescriptor { name, page_url });
    }

    if channels.is_empty() {
        return Err(ResolveError::NoChannelsFound);
    }

    debug!("parsed {} channels from listing", channels.len());
    Ok(channels)
}
