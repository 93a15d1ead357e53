//! Multi-provider chapter reconciliation.
//!
//! One complete, internally-consistent chapter list from a single
//! provider+language beats a partial merge across providers: numbering
//! schemes (volume splits, one-shot insertions) are not compatible across
//! sources. The reconciler therefore walks a fixed fallback chain and
//! returns the first non-empty fetch outright.

use crate::models::{ProviderKind, UnifiedChapter};
use crate::sources::ChapterProvider;
use futures::future::join_all;
use log::info;
use std::sync::Arc;

pub struct ChapterReconciler {
    /// Priority order; the first provider is preferred at every language
    /// tier.
    providers: Vec<Arc<dyn ChapterProvider>>,
    /// Language preference order, most preferred first.
    languages: Vec<String>,
}

impl ChapterReconciler {
    pub fn new(providers: Vec<Arc<dyn ChapterProvider>>, languages: Vec<String>) -> Self {
        Self {
            providers,
            languages,
        }
    }

    /// The (provider, language) pairs in the order they will be tried.
    pub fn fallback_chain(&self) -> Vec<(ProviderKind, &str)> {
        let mut chain = Vec::new();
        for language in &self.languages {
            for provider in &self.providers {
                chain.push((provider.kind(), language.as_str()));
            }
        }
        chain
    }

    /// Resolve the title against every provider concurrently, then walk the
    /// fallback chain until one pair yields chapters. Empty when nothing
    /// does.
    pub async fn get_chapters(&self, series_title: &str) -> Vec<UnifiedChapter> {
        let searches = self
            .providers
            .iter()
            .map(|p| p.find_series_id(series_title));
        let series_ids = join_all(searches).await;

        for language in &self.languages {
            for (provider, series_id) in self.providers.iter().zip(series_ids.iter()) {
                let Some(id) = series_id else { continue };
                let chapters = provider.fetch_chapters(id, language).await;
                if !chapters.is_empty() {
                    info!(
                        "serving {} chapters for '{}' from {} [{}]",
                        chapters.len(),
                        series_title,
                        provider.kind().name(),
                        language
                    );
                    return chapters;
                }
            }
        }

        info!("no chapters found for '{}' on any provider", series_title);
        Vec::new()
    }
}
