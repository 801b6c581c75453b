use serde::{Deserialize, Serialize};

/// everything the pipeline passes around
///
/// `ResolvedChannel` serializes to the exact dict shape the playlist builder
/// expects, hyphenated keys included, so don't rename fields without checking
/// that side first

/// one entry scraped off the channel-index page, thrown away after the
/// channel is resolved (or skipped)
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    pub name: String,
    pub page_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedChannel {
    pub name: String,
    pub logo: String,
    pub group: String,
    #[serde(rename = "stream-url")]
    pub stream_url: String,
    pub headers: StreamHeaders,
}

/// headers a player has to send or the CDN 403s the stream
#[derive(Debug, Clone, Serialize)]
pub struct StreamHeaders {
    pub referer: String,
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

/// body of `server_lookup.php?channel_id=<key>`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerLookupResponse {
    pub server_key: String,
}
