//! Rate-limited client for the Jikan catalog API.
//!
//! Jikan throttles aggressively (~3 req/s shared), so every call in the
//! process funnels through one FIFO gate with fixed spacing before each
//! outbound request. A 429 gets a longer sleep and exactly one retry;
//! anything after that fails the call without stalling the queue.

use crate::content_filter::is_safe;
use crate::models::{CatalogEntry, SearchFilters};
use log::warn;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::error::Error;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::sleep;

/// Adult genre ids the catalog can exclude server-side (Hentai, Erotica,
/// Doujinshi). Belt-and-suspenders with the client-side filter.
const ADULT_GENRE_IDS: &str = "12,49,28";

/// FIFO turn-taker enforcing a minimum spacing between requests.
///
/// The tokio mutex hands out locks in acquisition order, so callers are
/// served strictly first-come-first-served; each turn sleeps the spacing
/// interval before its request goes out.
pub struct RequestPacer {
    gate: Mutex<()>,
    spacing: Duration,
}

impl RequestPacer {
    pub fn new(spacing: Duration) -> Self {
        Self {
            gate: Mutex::new(()),
            spacing,
        }
    }

    /// Wait for all earlier turns to finish, then for the spacing interval.
    /// The guard must be held until the request completes.
    pub async fn turn(&self) -> MutexGuard<'_, ()> {
        let guard = self.gate.lock().await;
        sleep(self.spacing).await;
        guard
    }
}

pub struct CatalogClient {
    client: Client,
    base_url: String,
    pacer: RequestPacer,
    retry_backoff: Duration,
}

impl CatalogClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        spacing: Duration,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            pacer: RequestPacer::new(spacing),
            retry_backoff,
        }
    }

    /// Issue one paced request and return the parsed JSON body. Catalog
    /// calls go direct, not through the proxy layer; Jikan sends permissive
    /// CORS headers and only needs the pacing.
    async fn request(&self, endpoint: &str) -> Result<Value, Box<dyn Error>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let _turn = self.pacer.turn().await;

        let mut response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!("catalog throttled on {}, retrying once", endpoint);
            sleep(self.retry_backoff).await;
            response = self.client.get(&url).send().await?;
        }
        let response = response.error_for_status()?;
        let body: Value = response.json().await?;
        Ok(body)
    }

    /// Fetch a listing endpoint and apply the content-safety filter
    /// element-wise.
    async fn fetch_list(
        &self,
        endpoint: &str,
        allow_nsfw: bool,
    ) -> Result<Vec<CatalogEntry>, Box<dyn Error>> {
        let body = self.request(endpoint).await?;
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        let entries: Vec<CatalogEntry> = serde_json::from_value(data)?;
        Ok(entries
            .into_iter()
            .filter(|e| is_safe(e, allow_nsfw))
            .collect())
    }

    /// Fetch a single-entry endpoint. A filtered-out entry surfaces as
    /// `None` ("not found"), not as an error.
    async fn fetch_one(
        &self,
        endpoint: &str,
        allow_nsfw: bool,
    ) -> Result<Option<CatalogEntry>, Box<dyn Error>> {
        let body = self.request(endpoint).await?;
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        if data.is_null() {
            return Ok(None);
        }
        let entry: CatalogEntry = serde_json::from_value(data)?;
        Ok(if is_safe(&entry, allow_nsfw) {
            Some(entry)
        } else {
            None
        })
    }

    /// Top currently-publishing series.
    pub async fn trending(&self) -> Result<Vec<CatalogEntry>, Box<dyn Error>> {
        self.fetch_list("/top/manga?filter=publishing&limit=25&sfw=true", false)
            .await
    }

    /// Top series by popularity.
    pub async fn top(&self) -> Result<Vec<CatalogEntry>, Box<dyn Error>> {
        self.fetch_list("/top/manga?filter=bypopularity&limit=25&sfw=true", false)
            .await
    }

    /// Popular manhwa.
    pub async fn manhwa(&self) -> Result<Vec<CatalogEntry>, Box<dyn Error>> {
        self.fetch_list(
            "/manga?type=manhwa&order_by=popularity&sort=desc&limit=25&sfw=true",
            false,
        )
        .await
    }

    /// Free-text search with optional genre/status filters.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<CatalogEntry>, Box<dyn Error>> {
        let endpoint = search_endpoint(query, filters);
        self.fetch_list(&endpoint, filters.nsfw).await
    }

    /// Detail lookup by catalog id. Bypasses the safety filter: deep links
    /// always resolve regardless of rating.
    pub async fn by_id(&self, mal_id: i64) -> Result<Option<CatalogEntry>, Box<dyn Error>> {
        self.fetch_one(&format!("/manga/{}", mal_id), true).await
    }
}

fn search_endpoint(query: &str, filters: &SearchFilters) -> String {
    let mut endpoint = format!("/manga?q={}&limit=25", urlencoding::encode(query));
    if !filters.genres.is_empty() {
        let ids: Vec<String> = filters.genres.iter().map(|g| g.to_string()).collect();
        endpoint.push_str(&format!("&genres={}", ids.join(",")));
    }
    if let Some(status) = filters.status.as_deref() {
        if status != "any" {
            endpoint.push_str(&format!("&status={}", status));
        }
    }
    if !filters.nsfw {
        endpoint.push_str("&sfw=true&genres_exclude=");
        endpoint.push_str(ADULT_GENRE_IDS);
    }
    endpoint
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn search_endpoint_plain_query() {
        let endpoint = search_endpoint("one piece", &SearchFilters::default());
        assert_eq!(
            endpoint,
            "/manga?q=one%20piece&limit=25&sfw=true&genres_exclude=12,49,28"
        );
    }

    #[test]
    fn search_endpoint_with_filters() {
        let filters = SearchFilters {
            genres: vec![1, 4],
            status: Some("publishing".to_string()),
            nsfw: true,
        };
        let endpoint = search_endpoint("berserk", &filters);
        assert_eq!(
            endpoint,
            "/manga?q=berserk&limit=25&genres=1,4&status=publishing"
        );
    }

    #[test]
    fn search_endpoint_ignores_any_status() {
        let filters = SearchFilters {
            status: Some("any".to_string()),
            ..Default::default()
        };
        let endpoint = search_endpoint("x", &filters);
        assert!(!endpoint.contains("status="));
    }

    #[tokio::test]
    async fn pacer_spaces_concurrent_turns() {
        let spacing = Duration::from_millis(50);
        let pacer = Arc::new(RequestPacer::new(spacing));
        let stamps = Arc::new(Mutex::new(Vec::<Instant>::new()));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let pacer = pacer.clone();
            let stamps = stamps.clone();
            handles.push(tokio::spawn(async move {
                let _turn = pacer.turn().await;
                stamps.lock().await.push(Instant::now());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stamps = stamps.lock().await;
        assert_eq!(stamps.len(), 5);
        let mut sorted = stamps.clone();
        sorted.sort();
        for pair in sorted.windows(2) {
            // Each turn sleeps the spacing before its request slot opens.
            assert!(pair[1].duration_since(pair[0]) >= spacing);
        }
    }

    #[tokio::test]
    async fn pacer_turn_failure_does_not_stall_queue() {
        let pacer = Arc::new(RequestPacer::new(Duration::from_millis(1)));
        {
            // Simulates a failing call: guard dropped on early exit.
            let _turn = pacer.turn().await;
        }
        // Next turn proceeds normally.
        let _turn = pacer.turn().await;
    }
}
