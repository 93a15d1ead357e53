//! Routes a unified chapter to its owning provider's page-image endpoint.

use crate::models::{ChapterSource, ProviderKind};
use crate::sources::comick::ComickProvider;
use crate::sources::mangadex::MangaDexProvider;
use std::sync::Arc;

/// Resolves ordered page-image URLs for a chapter. Never fails loudly:
/// callers treat an empty list as "failed to load".
pub struct ImageResolver {
    mangadex: Arc<MangaDexProvider>,
    comick: Arc<ComickProvider>,
}

impl ImageResolver {
    pub fn new(mangadex: Arc<MangaDexProvider>, comick: Arc<ComickProvider>) -> Self {
        Self { mangadex, comick }
    }

    /// Ordered page-image URLs for the chapter, or empty on any failure.
    pub async fn page_images(&self, source: &ChapterSource) -> Vec<String> {
        match source.provider {
            ProviderKind::MangaDex => self.mangadex.page_images(&source.id).await,
            ProviderKind::Comick => self.comick.page_images(&source.id).await,
        }
    }

    /// Convenience for deep-link callers holding only a bare chapter id;
    /// the owning provider is inferred from the id shape.
    pub async fn page_images_for_raw_id(&self, chapter_id: &str) -> Vec<String> {
        self.page_images(&ChapterSource::from_raw_id(chapter_id))
            .await
    }
}
