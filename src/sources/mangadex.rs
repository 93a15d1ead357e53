//! Feed-style provider: MangaDex. Series and chapters are keyed by UUIDs;
//! the chapter feed carries explicit page counts and external-redirect
//! markers, so unreadable entries can be filtered reliably.

use crate::models::{ChapterSource, ProviderKind, UnifiedChapter};
use crate::proxy::ProxyFetcher;
use crate::sources::{dedupe_chapters, ChapterProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use serde::Deserialize;
use std::sync::Arc;

pub const BASE_URL: &str = "https://api.mangadex.org";

/// One feed request covers a long-running series without pagination.
const FEED_LIMIT: u32 = 500;

#[derive(Deserialize)]
struct SeriesList {
    #[serde(default)]
    data: Vec<SeriesData>,
}

#[derive(Deserialize)]
struct SeriesData {
    id: String,
}

#[derive(Deserialize)]
struct ChapterFeed {
    #[serde(default)]
    data: Vec<ChapterData>,
}

#[derive(Deserialize)]
struct ChapterData {
    id: String,
    attributes: ChapterAttributes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterAttributes {
    chapter: Option<String>,
    volume: Option<String>,
    title: Option<String>,
    publish_at: Option<String>,
    #[serde(default)]
    pages: i64,
    #[serde(default)]
    external_url: Option<String>,
    translated_language: Option<String>,
}

pub struct MangaDexProvider {
    fetcher: Arc<ProxyFetcher>,
    base_url: String,
    language_priority: Vec<String>,
}

impl MangaDexProvider {
    pub fn new(
        fetcher: Arc<ProxyFetcher>,
        base_url: impl Into<String>,
        language_priority: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            language_priority,
        }
    }

    /// Ordered page-image URLs for one chapter, via the at-home server
    /// lookup. Empty on any failure.
    pub async fn page_images(&self, chapter_id: &str) -> Vec<String> {
        let url = format!("{}/at-home/server/{}", self.base_url, chapter_id);
        let body = match self.fetcher.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("mangadex at-home request failed for {}: {}", chapter_id, e);
                return Vec::new();
            }
        };
        parse_page_images(&body)
    }
}

#[async_trait]
impl ChapterProvider for MangaDexProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::MangaDex
    }

    async fn find_series_id(&self, title: &str) -> Option<String> {
        let url = format!(
            "{}/manga?title={}&limit=1",
            self.base_url,
            urlencoding::encode(title)
        );
        let body = match self.fetcher.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("mangadex search failed for '{}': {}", title, e);
                return None;
            }
        };
        match serde_json::from_str::<SeriesList>(&body) {
            Ok(list) => list.data.into_iter().next().map(|s| s.id),
            Err(e) => {
                warn!("mangadex search parse error: {}", e);
                None
            }
        }
    }

    async fn fetch_chapters(&self, series_id: &str, language: &str) -> Vec<UnifiedChapter> {
        let url = format!(
            "{}/manga/{}/feed?limit={}&translatedLanguage[]={}&order[chapter]=desc\
             &contentRating[]=safe&contentRating[]=suggestive&contentRating[]=erotica&contentRating[]=pornographic",
            self.base_url, series_id, FEED_LIMIT, language
        );
        let body = match self.fetcher.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("mangadex feed failed for {}: {}", series_id, e);
                return Vec::new();
            }
        };
        parse_chapter_feed(&body, &self.language_priority)
    }
}

/// Normalize a raw feed payload. Records without a chapter number, with no
/// readable pages, or redirecting to an external site are dropped.
pub fn parse_chapter_feed(body: &str, language_priority: &[String]) -> Vec<UnifiedChapter> {
    let feed: ChapterFeed = match serde_json::from_str(body) {
        Ok(feed) => feed,
        Err(e) => {
            warn!("mangadex feed parse error: {}", e);
            return Vec::new();
        }
    };

    let mut chapters = Vec::new();
    for record in feed.data {
        let attrs = record.attributes;
        let number = match attrs.chapter {
            Some(n) if !n.is_empty() => n,
            _ => continue,
        };
        if attrs.pages <= 0 || attrs.external_url.is_some() {
            continue;
        }
        chapters.push(UnifiedChapter {
            number,
            volume: attrs.volume,
            title: attrs.title,
            published_at: parse_timestamp(attrs.publish_at.as_deref()),
            language: attrs.translated_language.unwrap_or_else(|| "en".to_string()),
            source: ChapterSource::new(ProviderKind::MangaDex, record.id),
        });
    }
    dedupe_chapters(chapters, language_priority)
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtHome {
    base_url: String,
    chapter: AtHomeChapter,
}

#[derive(Deserialize)]
struct AtHomeChapter {
    hash: String,
    #[serde(default)]
    data: Vec<String>,
}

/// Expand an at-home payload into full image URLs:
/// `{baseUrl}/data/{hash}/{filename}`.
pub fn parse_page_images(body: &str) -> Vec<String> {
    let meta: AtHome = match serde_json::from_str(body) {
        Ok(meta) => meta,
        Err(e) => {
            warn!("mangadex at-home parse error: {}", e);
            return Vec::new();
        }
    };
    meta.chapter
        .data
        .iter()
        .map(|file| format!("{}/data/{}/{}", meta.base_url, meta.chapter.hash, file))
        .collect()
}
