//! Chapter-hosting provider adapters and shared normalization helpers.

pub mod comick;
pub mod mangadex;

use crate::models::{ProviderKind, UnifiedChapter};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Common surface of a chapter-hosting provider.
///
/// Implementations absorb every upstream failure: a search miss or a broken
/// feed comes back as `None`/empty, logged, never as an error.
#[async_trait]
pub trait ChapterProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Fuzzy title search; id of the top-ranked match.
    async fn find_series_id(&self, title: &str) -> Option<String>;

    /// Full chapter feed for one language, normalized, deduplicated and
    /// sorted descending by numeric chapter value.
    async fn fetch_chapters(&self, series_id: &str, language: &str) -> Vec<UnifiedChapter>;
}

/// Numeric value of a chapter number string. Fractional numbers ("10.5")
/// are expected; anything unparsable sorts last.
pub fn chapter_value(number: &str) -> f64 {
    number.trim().parse().unwrap_or(f64::NEG_INFINITY)
}

/// Rank of a language in the preference list; lower is better, unknown
/// languages rank below every listed one.
pub fn language_rank(language: &str, priority: &[String]) -> usize {
    priority
        .iter()
        .position(|l| l == language)
        .unwrap_or(priority.len())
}

/// Sort chapters by descending numeric chapter value.
pub fn sort_descending(chapters: &mut [UnifiedChapter]) {
    chapters.sort_by(|a, b| {
        chapter_value(&b.number)
            .partial_cmp(&chapter_value(&a.number))
            .unwrap_or(Ordering::Equal)
    });
}

/// Collapse a raw feed to one entry per chapter number.
///
/// A number already seen keeps its entry unless the incoming record carries
/// a strictly higher-priority language; equal or lower priority never
/// overwrites, so a feed's own order (first-seen) wins within one language.
pub fn dedupe_chapters(
    chapters: Vec<UnifiedChapter>,
    language_priority: &[String],
) -> Vec<UnifiedChapter> {
    let mut by_number: HashMap<String, UnifiedChapter> = HashMap::new();
    for incoming in chapters {
        match by_number.get(&incoming.number) {
            Some(existing)
                if language_rank(&incoming.language, language_priority)
                    >= language_rank(&existing.language, language_priority) => {}
            _ => {
                by_number.insert(incoming.number.clone(), incoming);
            }
        }
    }
    let mut out: Vec<UnifiedChapter> = by_number.into_values().collect();
    sort_descending(&mut out);
    out
}
