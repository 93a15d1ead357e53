use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

/// Chapter-hosting providers known to the reconciler.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    MangaDex = 1,
    Comick = 2,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::MangaDex => "mangadex",
            ProviderKind::Comick => "comick",
        }
    }
}

/// Parse a provider name or ID string into a ProviderKind
pub fn parse_provider(s: &str) -> Option<ProviderKind> {
    let k = s.to_lowercase();
    if let Ok(n) = k.parse::<i32>() {
        return match n {
            1 => Some(ProviderKind::MangaDex),
            2 => Some(ProviderKind::Comick),
            _ => None,
        };
    }
    match k.as_str() {
        "mangadex" | "md" => Some(ProviderKind::MangaDex),
        "comick" | "ck" => Some(ProviderKind::Comick),
        _ => None,
    }
}

/// Provider-native chapter identifier plus the provider that owns it.
///
/// Carried on every [`UnifiedChapter`] so image resolution never has to
/// guess where an id came from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChapterSource {
    pub provider: ProviderKind,
    pub id: String,
}

static UUID_RE: OnceLock<Regex> = OnceLock::new();

fn uuid_re() -> &'static Regex {
    UUID_RE.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .expect("uuid pattern")
    })
}

impl ChapterSource {
    pub fn new(provider: ProviderKind, id: impl Into<String>) -> Self {
        Self {
            provider,
            id: id.into(),
        }
    }

    /// Infer the owning provider from the id shape, for callers that only
    /// hold a bare chapter id (deep links). MangaDex ids are UUIDs; Comick
    /// ids are short alphanumeric tokens. Heuristic — internal code should
    /// carry the explicit tag instead.
    pub fn from_raw_id(id: &str) -> Self {
        let provider = if uuid_re().is_match(id) {
            ProviderKind::MangaDex
        } else {
            ProviderKind::Comick
        };
        Self::new(provider, id)
    }
}

/// One chapter, normalized across providers.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UnifiedChapter {
    /// Chapter number as published; may be fractional ("10.5").
    pub number: String,
    pub volume: Option<String>,
    pub title: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Translated-language code, e.g. "pt-br" or "en".
    pub language: String,
    pub source: ChapterSource,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublicationStatus {
    Ongoing,
    Finished,
    #[default]
    Unknown,
}

impl PublicationStatus {
    pub fn from_label(s: &str) -> Self {
        let k = s.to_lowercase();
        if k.contains("publishing") || k.contains("ongoing") {
            PublicationStatus::Ongoing
        } else if k.contains("finished") || k.contains("complete") {
            PublicationStatus::Finished
        } else {
            PublicationStatus::Unknown
        }
    }
}

fn de_status<'de, D>(deserializer: D) -> Result<PublicationStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(label
        .map(|s| PublicationStatus::from_label(&s))
        .unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EntryImages {
    #[serde(default)]
    pub jpg: ImageSet,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Genre {
    #[serde(default)]
    pub mal_id: Option<i64>,
    pub name: String,
}

/// One catalog series as returned by the Jikan API. Request-scoped
/// snapshot; never written back.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogEntry {
    pub mal_id: i64,
    pub title: String,
    #[serde(default)]
    pub images: EntryImages,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub popularity: Option<i64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, rename = "status", deserialize_with = "de_status")]
    pub status: PublicationStatus,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub rating: Option<String>,
}

/// Per-search options forwarded to the catalog.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Catalog genre ids to require.
    pub genres: Vec<u32>,
    /// Publication status filter ("publishing", "complete", ...); None or
    /// "any" means no filter.
    pub status: Option<String>,
    /// When false, explicit content is excluded both server- and client-side.
    pub nsfw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_shaped_id_routes_to_mangadex() {
        let source = ChapterSource::from_raw_id("3f9a1b2c-4d5e-6f70-8190-a1b2c3d4e5f6");
        assert_eq!(source.provider, ProviderKind::MangaDex);
    }

    #[test]
    fn short_token_routes_to_comick() {
        let source = ChapterSource::from_raw_id("ab12cd");
        assert_eq!(source.provider, ProviderKind::Comick);
    }

    #[test]
    fn malformed_uuid_is_not_mangadex() {
        // Right length, wrong hyphen placement
        let source = ChapterSource::from_raw_id("3f9a1b2c4-d5e-6f70-8190-a1b2c3d4e5f6");
        assert_eq!(source.provider, ProviderKind::Comick);
    }

    #[test]
    fn status_labels_parse() {
        assert_eq!(
            PublicationStatus::from_label("Publishing"),
            PublicationStatus::Ongoing
        );
        assert_eq!(
            PublicationStatus::from_label("Finished"),
            PublicationStatus::Finished
        );
        assert_eq!(
            PublicationStatus::from_label("On Hiatus"),
            PublicationStatus::Unknown
        );
    }

    #[test]
    fn parse_provider_accepts_names_and_ids() {
        assert_eq!(parse_provider("mangadex"), Some(ProviderKind::MangaDex));
        assert_eq!(parse_provider("2"), Some(ProviderKind::Comick));
        assert_eq!(parse_provider("unknown"), None);
    }

    #[test]
    fn catalog_entry_deserializes_from_jikan_payload() {
        let raw = r#"{
            "mal_id": 13,
            "title": "One Piece",
            "images": {"jpg": {"image_url": "https://cdn.example/13.jpg", "large_image_url": "https://cdn.example/13l.jpg"}},
            "synopsis": "Pirates.",
            "score": 9.2,
            "popularity": 3,
            "year": 1997,
            "status": "Publishing",
            "type": "Manga",
            "genres": [{"mal_id": 1, "name": "Action"}],
            "rating": null
        }"#;
        let entry: CatalogEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.mal_id, 13);
        assert_eq!(entry.status, PublicationStatus::Ongoing);
        assert_eq!(entry.genres[0].name, "Action");
        assert!(entry.rating.is_none());
    }
}
