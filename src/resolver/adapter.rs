use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::error::{ResolveError, ResolveResult};

pub const GROUP_NAME: &str = "DaddyHD";

/// one way of pulling something useful out of a fetched page body
///
/// kept as data instead of control flow so that when the site shuffles its
/// markup again the fix is a new entry in `SiteAdapter::current`, not surgery
/// on the pipeline
pub enum Extraction {
    /// quoted string assigned to a known identifier in page script
    ScriptKey(Regex),
    /// quoted absolute media url, terminal - no lookup or composition needed
    DirectMedia(Regex),
    /// embedded player frame to recurse into
    EmbeddedFrame(Selector),
}

pub enum Extracted {
    Key(String),
    MediaUrl(String),
    Frame(String),
}

/// every assumption about the upstream site in one place
///
/// the strategy list is ordered, first hit wins. the channelKey +
/// server_lookup scheme is the current site revision; the source/file quoted
/// urls and the thatframe hop are older revisions kept as fallbacks
pub struct SiteAdapter {
    pub index_url: String,
    /// per-channel pages follow a stream-<id>.php naming convention
    pub channel_link: Regex,
    pub age_marker: &'static str,
    pub strategies: Vec<Extraction>,
    pub lookup_path: &'static str,
    /// tokens equal to this get the fixed-host template instead
    pub reserved_token: &'static str,
    pub media_domain: &'static str,
    pub user_agent: &'static str,
}

impl SiteAdapter {
    pub fn current() -> Self {
        let strategies = vec![
            Extraction::ScriptKey(
                Regex::new(r#"(?:var|let|const)\s+channelKey\s*=\s*"([^"]+)""#)
                    .expect("valid channelKey regex"),
            ),
            Extraction::ScriptKey(
                Regex::new(r"(?:var|let|const)\s+channelKey\s*=\s*'([^']+)'")
                    .expect("valid channelKey regex"),
            ),
            Extraction::DirectMedia(
                Regex::new(r"source:\s*'(https://[^\s']+)'").expect("valid source regex"),
            ),
            Extraction::DirectMedia(
                Regex::new(r#"source:\s*"(https://[^\s"]+)""#).expect("valid source regex"),
            ),
            Extraction::DirectMedia(
                Regex::new(r"file:\s*'(https://[^\s']+)'").expect("valid file regex"),
            ),
            Extraction::DirectMedia(
                Regex::new(r#"file:\s*"(https://[^\s"]+)""#).expect("valid file regex"),
            ),
            Extraction::DirectMedia(
                Regex::new(r#""(https://[^\s"]+\.m3u8[^\s"]*)""#).expect("valid m3u8 regex"),
            ),
            Extraction::DirectMedia(
                Regex::new(r"'(https://[^\s']+\.m3u8[^\s']*)'").expect("valid m3u8 regex"),
            ),
            Extraction::EmbeddedFrame(
                Selector::parse("iframe#thatframe").expect("valid iframe selector"),
            ),
        ];

        Self {
            index_url: "https://thedaddy.to/24-7-channels.php".to_string(),
            channel_link: Regex::new(r"stream-(\d+)\.php").expect("valid channel link regex"),
            age_marker: "18+",
            strategies,
            lookup_path: "/server_lookup.php",
            reserved_token: "top1/cdn",
            media_domain: "iosplayer.ru",
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        }
    }

    /// run the strategy list over a page body, first hit wins
    pub fn extract(&self, body: &str) -> Option<Extracted> {
        for strategy in &self.strategies {
            match strategy {
                Extraction::ScriptKey(pattern) => {
                    if let Some(captures) = pattern.captures(body) {
                        return Some(Extracted::Key(captures[1].to_string()));
                    }
                }
                Extraction::DirectMedia(pattern) => {
                    // pages sometimes list a dummy source first, the real one
                    // is the last match
                    if let Some(captures) = pattern.captures_iter(body).last() {
                        return Some(Extracted::MediaUrl(captures[1].to_string()));
                    }
                }
                Extraction::EmbeddedFrame(selector) => {
                    let document = Html::parse_document(body);
                    if let Some(src) = document
                        .select(selector)
                        .next()
                        .and_then(|frame| frame.value().attr("src"))
                    {
                        return Some(Extracted::Frame(src.to_string()));
                    }
                }
            }
        }
        None
    }

    /// interpolate token and key into the media host templates
    pub fn compose_stream_url(&self, token: &str, key: &str) -> String {
        if token == self.reserved_token {
            format!(
                "https://top1.{}/{}/{}/mono.m3u8",
                self.media_domain, token, key
            )
        } else {
            format!(
                "https://{}new.{}/{}/{}/mono.m3u8",
                token, self.media_domain, token, key
            )
        }
    }

    /// scheme://host[:port] of a url, no trailing slash
    pub fn origin_of(url: &str) -> ResolveResult<String> {
        let parsed = Url::parse(url)
            .map_err(|e| ResolveError::Parse(format!("unparsable url {url}: {e}")))?;
        let origin = parsed.origin();
        if !matches!(origin, url::Origin::Tuple(..)) {
            return Err(ResolveError::Parse(format!("url {url} has no usable origin")));
        }
        Ok(origin.ascii_serialization())
    }

    /// resolve a possibly-relative href against the page it came from
    pub fn absolute_url(base: &str, href: &str) -> ResolveResult<String> {
        let base = Url::parse(base)
            .map_err(|e| ResolveError::Parse(format!("unparsable base url {base}: {e}")))?;
        let joined = base
            .join(href)
            .map_err(|e| ResolveError::Parse(format!("unresolvable href {href}: {e}")))?;
        Ok(joined.to_string())
    }
}
