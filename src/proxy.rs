use log::warn;
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// User agents to rotate through to avoid bot detection
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())]
}

/// How a relay endpoint expects the target URL to be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyStyle {
    /// Target URL percent-encoded into a query parameter.
    EncodedQuery,
    /// Target URL appended raw to the endpoint base.
    RawAppend,
}

#[derive(Debug, Clone)]
pub struct ProxyEndpoint {
    pub base: String,
    pub style: ProxyStyle,
}

impl ProxyEndpoint {
    pub fn new(base: impl Into<String>, style: ProxyStyle) -> Self {
        Self {
            base: base.into(),
            style,
        }
    }

    /// Full relay URL for the given target.
    pub fn proxied_url(&self, target: &str) -> String {
        match self.style {
            ProxyStyle::EncodedQuery => format!("{}{}", self.base, urlencoding::encode(target)),
            ProxyStyle::RawAppend => format!("{}{}", self.base, target),
        }
    }
}

/// Routes requests through an ordered, rotating list of CORS relay
/// endpoints, falling back to a direct fetch when every relay fails.
pub struct ProxyFetcher {
    client: Client,
    proxies: Vec<ProxyEndpoint>,
    /// Starting offset into the proxy list; advanced per request to spread
    /// load. Benign races only cost a suboptimal pick.
    rotation: AtomicUsize,
    rate_limit_backoff: Duration,
}

impl ProxyFetcher {
    pub fn new(client: Client, proxies: Vec<ProxyEndpoint>, rate_limit_backoff: Duration) -> Self {
        Self {
            client,
            proxies,
            rotation: AtomicUsize::new(0),
            rate_limit_backoff,
        }
    }

    /// Fetch `target` through the relay list. Each relay gets one attempt
    /// per request: a 2xx wins, a 429 backs off once then moves on, any
    /// other failure moves on immediately. The final direct fetch is the
    /// only path whose error reaches the caller.
    pub async fn fetch(&self, target: &str) -> Result<Response, reqwest::Error> {
        let start = self.rotation.fetch_add(1, Ordering::Relaxed);
        for offset in 0..self.proxies.len() {
            let proxy = &self.proxies[(start + offset) % self.proxies.len()];
            let url = proxy.proxied_url(target);
            match self
                .client
                .get(&url)
                .header("User-Agent", random_user_agent())
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    warn!("proxy {} rate limited, backing off", proxy.base);
                    sleep(self.rate_limit_backoff).await;
                }
                Ok(response) => {
                    warn!("proxy {} returned {}", proxy.base, response.status());
                }
                Err(e) => {
                    warn!("proxy {} failed: {}", proxy.base, e);
                }
            }
        }

        // Last resort: unproxied fetch. Some providers allow direct access
        // intermittently.
        self.client
            .get(target)
            .header("User-Agent", random_user_agent())
            .send()
            .await
    }

    /// Fetch and decode the response body as text.
    pub async fn fetch_text(&self, target: &str) -> Result<String, reqwest::Error> {
        let response = self.fetch(target).await?;
        response.text().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_query_style_percent_encodes_target() {
        let proxy = ProxyEndpoint::new("https://relay.example/raw?url=", ProxyStyle::EncodedQuery);
        assert_eq!(
            proxy.proxied_url("https://api.example.org/manga?title=one piece"),
            "https://relay.example/raw?url=https%3A%2F%2Fapi.example.org%2Fmanga%3Ftitle%3Done%20piece"
        );
    }

    #[test]
    fn raw_append_style_keeps_target_verbatim() {
        let proxy = ProxyEndpoint::new("https://relay.example/?", ProxyStyle::RawAppend);
        assert_eq!(
            proxy.proxied_url("https://api.example.org/manga"),
            "https://relay.example/?https://api.example.org/manga"
        );
    }

    #[test]
    fn user_agent_pool_is_used() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
    }
}
