use crate::models::CatalogEntry;

/// Genre names that mark an entry as adult-only.
const PROHIBITED_GENRES: &[&str] = &["Hentai", "Erotica", "Doujinshi"];

/// Content-safety gate applied to every catalog listing and search result.
/// Detail-by-id lookups bypass it: deep links always resolve.
pub fn is_safe(entry: &CatalogEntry, allow_nsfw: bool) -> bool {
    if allow_nsfw {
        return true;
    }
    if let Some(rating) = &entry.rating {
        if rating.contains("Rx") || rating.contains("Hentai") {
            return false;
        }
    }
    !entry
        .genres
        .iter()
        .any(|g| PROHIBITED_GENRES.contains(&g.name.as_str()))
}
