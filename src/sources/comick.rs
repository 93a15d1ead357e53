//! Chapter-list-style provider: Comick. Series and chapters are keyed by
//! short alphanumeric tokens ("hid"). The list carries no reliable page
//! count or external-link marker, so only records missing a chapter number
//! can be rejected up front.

use crate::models::{ChapterSource, ProviderKind, UnifiedChapter};
use crate::proxy::ProxyFetcher;
use crate::sources::{dedupe_chapters, ChapterProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use serde::Deserialize;
use std::sync::Arc;

pub const BASE_URL: &str = "https://api.comick.io";
pub const IMAGE_CDN_BASE: &str = "https://meo.comick.pictures";

/// High enough to cover long-running series in one call.
const CHAPTER_LIMIT: u32 = 1000;

#[derive(Deserialize)]
struct SearchHit {
    hid: String,
}

#[derive(Deserialize)]
struct ChapterList {
    #[serde(default)]
    chapters: Vec<ComickChapter>,
}

#[derive(Deserialize)]
struct ComickChapter {
    hid: String,
    chap: Option<String>,
    vol: Option<String>,
    title: Option<String>,
    created_at: Option<String>,
    lang: Option<String>,
}

pub struct ComickProvider {
    fetcher: Arc<ProxyFetcher>,
    base_url: String,
    image_cdn_base: String,
    language_priority: Vec<String>,
}

impl ComickProvider {
    pub fn new(
        fetcher: Arc<ProxyFetcher>,
        base_url: impl Into<String>,
        image_cdn_base: impl Into<String>,
        language_priority: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            image_cdn_base: image_cdn_base.into(),
            language_priority,
        }
    }

    /// Ordered page-image URLs for one chapter. Empty on any failure.
    pub async fn page_images(&self, chapter_hid: &str) -> Vec<String> {
        let url = format!("{}/chapter/{}", self.base_url, chapter_hid);
        let body = match self.fetcher.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("comick chapter request failed for {}: {}", chapter_hid, e);
                return Vec::new();
            }
        };
        parse_page_images(&body, &self.image_cdn_base)
    }
}

#[async_trait]
impl ChapterProvider for ComickProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Comick
    }

    async fn find_series_id(&self, title: &str) -> Option<String> {
        let url = format!(
            "{}/v1.0/search?q={}&limit=1",
            self.base_url,
            urlencoding::encode(title)
        );
        let body = match self.fetcher.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("comick search failed for '{}': {}", title, e);
                return None;
            }
        };
        match serde_json::from_str::<Vec<SearchHit>>(&body) {
            Ok(hits) => hits.into_iter().next().map(|h| h.hid),
            Err(e) => {
                warn!("comick search parse error: {}", e);
                None
            }
        }
    }

    async fn fetch_chapters(&self, series_id: &str, language: &str) -> Vec<UnifiedChapter> {
        let url = format!(
            "{}/comic/{}/chapters?lang={}&limit={}",
            self.base_url, series_id, language, CHAPTER_LIMIT
        );
        let body = match self.fetcher.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("comick chapter list failed for {}: {}", series_id, e);
                return Vec::new();
            }
        };
        parse_chapter_list(&body, &self.language_priority)
    }
}

/// Normalize a raw chapter-list payload. Records without a chapter number
/// are dropped; the list's own order stands in for page-count filtering,
/// which this provider cannot offer.
pub fn parse_chapter_list(body: &str, language_priority: &[String]) -> Vec<UnifiedChapter> {
    let list: ChapterList = match serde_json::from_str(body) {
        Ok(list) => list,
        Err(e) => {
            warn!("comick chapter list parse error: {}", e);
            return Vec::new();
        }
    };

    let mut chapters = Vec::new();
    for record in list.chapters {
        let number = match record.chap {
            Some(n) if !n.is_empty() => n,
            _ => continue,
        };
        chapters.push(UnifiedChapter {
            number,
            volume: record.vol,
            title: record.title,
            published_at: record
                .created_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|d| d.with_timezone(&Utc)),
            language: record.lang.unwrap_or_else(|| "en".to_string()),
            source: ChapterSource::new(ProviderKind::Comick, record.hid),
        });
    }
    dedupe_chapters(chapters, language_priority)
}

#[derive(Deserialize)]
struct ChapterDetail {
    chapter: Option<ChapterImages>,
}

#[derive(Deserialize)]
struct ChapterImages {
    #[serde(default)]
    images: Vec<ImageDescriptor>,
}

#[derive(Deserialize)]
struct ImageDescriptor {
    url: Option<String>,
    b2key: Option<String>,
}

/// Extract image URLs from a chapter-detail payload. Descriptors carry
/// either a direct URL or a storage key needing CDN-base expansion.
pub fn parse_page_images(body: &str, cdn_base: &str) -> Vec<String> {
    let detail: ChapterDetail = match serde_json::from_str(body) {
        Ok(detail) => detail,
        Err(e) => {
            warn!("comick chapter detail parse error: {}", e);
            return Vec::new();
        }
    };
    let Some(chapter) = detail.chapter else {
        return Vec::new();
    };
    chapter
        .images
        .into_iter()
        .filter_map(|img| match (img.url, img.b2key) {
            (Some(url), _) => Some(url),
            (None, Some(key)) => Some(format!("{}/{}", cdn_base, key)),
            (None, None) => None,
        })
        .collect()
}
