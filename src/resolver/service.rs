// the whole listing -> channel page -> server lookup -> stream url pipeline
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::adapter::{Extracted, GROUP_NAME, SiteAdapter};
use super::error::{ResolveError, ResolveResult};
use super::http;
use super::listing;
use super::model::{ChannelDescriptor, ResolvedChannel, ServerLookupResponse, StreamHeaders};

pub type DynChannelResolver = Arc<dyn ChannelResolver + Send + Sync>;

/// frame fallbacks nest at most once on the real site, anything past this is
/// a redirect loop
const MAX_FRAME_HOPS: u32 = 3;

#[automock]
#[async_trait]
pub trait ChannelResolver {
    /// resolve the full listing; per-channel failures are skipped, only a
    /// listing-level failure errors out
    async fn resolve_all(&self) -> ResolveResult<Vec<ResolvedChannel>>;

    /// resolve a single descriptor to a playable stream url
    async fn resolve_channel(
        &self,
        channel: &ChannelDescriptor,
    ) -> ResolveResult<ResolvedChannel>;
}

pub struct DaddyHdService {
    http_client: reqwest::Client,
    adapter: SiteAdapter,
}

impl DaddyHdService {
    pub fn new(adapter: SiteAdapter) -> Self {
        // i like to make it look like a real browser but it's really not needed
        let http_client = reqwest::Client::builder()
            .user_agent(adapter.user_agent)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            adapter,
        }
    }

    /// server_lookup.php lives on whatever host the key was found on
    async fn lookup_token(&self, page_origin: &str, key: &str) -> ResolveResult<String> {
        let lookup_url = format!(
            "{}{}?channel_id={}",
            page_origin, self.adapter.lookup_path, key
        );
        debug!("querying server lookup: {}", lookup_url);

        let body =
            http::get_text_with_retry(&self.http_client, &lookup_url, Some(page_origin)).await?;

        let response: ServerLookupResponse = serde_json::from_str(&body)
            .map_err(|e| ResolveError::Lookup(format!("bad lookup body for key {key}: {e}")))?;

        Ok(response.server_key)
    }

    fn resolved(
        &self,
        channel: &ChannelDescriptor,
        stream_url: String,
        page_origin: &str,
    ) -> ResolvedChannel {
        ResolvedChannel {
            name: channel.name.clone(),
            logo: String::new(),
            group: GROUP_NAME.to_string(),
            stream_url,
            headers: StreamHeaders {
                referer: format!("{}/", page_origin),
                user_agent: self.adapter.user_agent.to_string(),
            },
        }
    }
}

#[async_trait]
impl ChannelResolver for DaddyHdService {
    async fn resolve_all(&self) -> ResolveResult<Vec<ResolvedChannel>> {
        let descriptors = listing::fetch_channels(&self.http_client, &self.adapter).await?;
        info!("resolving {} channels", descriptors.len());

        let mut resolved = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            match self.resolve_channel(descriptor).await {
                Ok(channel) => resolved.push(channel),
                Err(e) => {
                    // the site shifts constantly, a few dead channels per
                    // batch is normal
                    error!("skipping channel '{}': {}", descriptor.name, e);
                }
            }
        }

        info!("resolved {}/{} channels", resolved.len(), descriptors.len());
        Ok(resolved)
    }

    async fn resolve_channel(
        &self,
        channel: &ChannelDescriptor,
    ) -> ResolveResult<ResolvedChannel> {
        let index_origin = SiteAdapter::origin_of(&self.adapter.index_url)?;
        let mut page_url = channel.page_url.clone();
        let mut referer = format!("{}/", index_origin);

        for _hop in 0..MAX_FRAME_HOPS {
            let body =
                http::get_text_with_retry(&self.http_client, &page_url, Some(&referer)).await?;
            let page_origin = SiteAdapter::origin_of(&page_url)?;

            match self.adapter.extract(&body) {
                Some(Extracted::Key(key)) => {
                    let token = self.lookup_token(&page_origin, &key).await?;
                    let stream_url = self.adapter.compose_stream_url(&token, &key);
                    debug!("channel '{}' composed {}", channel.name, stream_url);
                    return Ok(self.resolved(channel, stream_url, &page_origin));
                }
                Some(Extracted::MediaUrl(url)) => {
                    debug!("channel '{}' matched a direct media url", channel.name);
                    return Ok(self.resolved(channel, url, &page_origin));
                }
                Some(Extracted::Frame(src)) => {
                    let next = SiteAdapter::absolute_url(&page_url, &src)?;
                    debug!("channel '{}' following embedded frame to {}", channel.name, next);
                    referer = format!("{}/", page_origin);
                    page_url = next;
                }
                None => {
                    return Err(ResolveError::Parse(format!(
                        "no extraction strategy matched page {}",
                        page_url
                    )));
                }
            }
        }

        Err(ResolveError::Parse(format!(
            "frame recursion exceeded {} hops for {}",
            MAX_FRAME_HOPS, channel.page_url
        )))
    }
}
