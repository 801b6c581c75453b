use std::time::Duration;

use rand::Rng;
use tracing::warn;

use super::error::{ResolveError, ResolveResult};

pub const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 400;
const RETRY_JITTER_MS: u64 = 300;

/// GET with the browser-ish header set and a small retry loop
///
/// network errors and non-success statuses both get retried, the delay grows
/// with the attempt number plus a random bit so the requests don't land in a
/// perfectly even rhythm. whatever is left on the last attempt is the error
/// the caller sees
pub async fn get_text_with_retry(
    client: &reqwest::Client,
    url: &str,
    referer: Option<&str>,
) -> ResolveResult<String> {
    let mut attempt = 1;

    loop {
        let mut request = client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Connection", "keep-alive")
            .header("Upgrade-Insecure-Requests", "1");

        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(ResolveError::Network {
                            url: url.to_string(),
                            attempts: attempt,
                            source: e,
                        });
                    }
                    warn!(
                        "attempt {}/{} for {} died reading the body: {}",
                        attempt, MAX_ATTEMPTS, url, e
                    );
                }
            },
            Ok(response) => {
                if attempt >= MAX_ATTEMPTS {
                    return Err(ResolveError::HttpStatus {
                        url: url.to_string(),
                        status: response.status(),
                    });
                }
                warn!(
                    "attempt {}/{} for {} returned {}, retrying",
                    attempt,
                    MAX_ATTEMPTS,
                    url,
                    response.status()
                );
            }
            Err(e) => {
                if attempt >= MAX_ATTEMPTS {
                    return Err(ResolveError::Network {
                        url: url.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
                warn!(
                    "attempt {}/{} for {} failed: {}, retrying",
                    attempt, MAX_ATTEMPTS, url, e
                );
            }
        }

        let jitter = rand::rng().random_range(0..RETRY_JITTER_MS);
        tokio::time::sleep(Duration::from_millis(
            RETRY_BASE_DELAY_MS * attempt as u64 + jitter,
        ))
        .await;
        attempt += 1;
    }
}
