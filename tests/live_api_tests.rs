//! Live upstream smoke tests. Network access is not guaranteed in CI, so
//! every test tolerates failure and only asserts on successful responses.

use rust_manga_reader::config::Config;
use rust_manga_reader::content_filter::is_safe;
use rust_manga_reader::models::SearchFilters;
use rust_manga_reader::reconciler::ChapterReconciler;
use rust_manga_reader::sources::comick::ComickProvider;
use rust_manga_reader::sources::mangadex::MangaDexProvider;
use rust_manga_reader::sources::ChapterProvider;
use std::sync::Arc;

#[tokio::test]
async fn catalog_search_results_are_safe() {
    let cfg = Config::default();
    let catalog = cfg.catalog.create_client().expect("client");

    match catalog.search("one piece", &SearchFilters::default()).await {
        Ok(entries) => {
            for entry in &entries {
                assert!(is_safe(entry, false));
            }
        }
        Err(e) => {
            eprintln!("Warning: catalog unreachable (may be expected in CI): {}", e);
        }
    }
}

#[tokio::test]
async fn reconciler_never_panics_on_live_lookup() {
    let cfg = Config::default();
    let fetcher = Arc::new(cfg.proxy.create_fetcher(reqwest::Client::new()));
    let mangadex = Arc::new(MangaDexProvider::new(
        fetcher.clone(),
        cfg.providers.mangadex_base_url.clone(),
        cfg.languages.clone(),
    ));
    let comick = Arc::new(ComickProvider::new(
        fetcher,
        cfg.providers.comick_base_url.clone(),
        cfg.providers.comick_image_cdn.clone(),
        cfg.languages.clone(),
    ));
    let providers: Vec<Arc<dyn ChapterProvider>> = vec![mangadex, comick];
    let reconciler = ChapterReconciler::new(providers, cfg.languages.clone());

    // Upstream failures must surface as an empty list, never an error.
    let chapters = reconciler.get_chapters("One Piece").await;
    for pair in chapters.windows(2) {
        let a: f64 = pair[0].number.parse().unwrap_or(f64::NEG_INFINITY);
        let b: f64 = pair[1].number.parse().unwrap_or(f64::NEG_INFINITY);
        assert!(a >= b, "chapter list must be sorted descending");
    }
}
