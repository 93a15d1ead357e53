use log::info;
use rust_manga_reader::config::Config;
use rust_manga_reader::images::ImageResolver;
use rust_manga_reader::models::SearchFilters;
use rust_manga_reader::reconciler::ChapterReconciler;
use rust_manga_reader::sources::comick::ComickProvider;
use rust_manga_reader::sources::mangadex::MangaDexProvider;
use rust_manga_reader::sources::ChapterProvider;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file("log4rs.yml", Default::default())?;

    let cfg = Config::load();
    let title = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "One Piece".to_string());

    let catalog = cfg.catalog.create_client()?;
    let fetcher = Arc::new(cfg.proxy.create_fetcher(reqwest::Client::new()));

    let mangadex = Arc::new(MangaDexProvider::new(
        fetcher.clone(),
        cfg.providers.mangadex_base_url.clone(),
        cfg.languages.clone(),
    ));
    let comick = Arc::new(ComickProvider::new(
        fetcher.clone(),
        cfg.providers.comick_base_url.clone(),
        cfg.providers.comick_image_cdn.clone(),
        cfg.languages.clone(),
    ));
    let providers: Vec<Arc<dyn ChapterProvider>> = vec![mangadex.clone(), comick.clone()];
    let reconciler = ChapterReconciler::new(providers, cfg.languages.clone());
    let resolver = ImageResolver::new(mangadex.clone(), comick.clone());

    info!("searching catalog for '{}'", title);
    let results = catalog.search(&title, &SearchFilters::default()).await?;
    for entry in results.iter().take(5) {
        println!(
            "{:>8}  {}  (score {})",
            entry.mal_id,
            entry.title,
            entry.score.map(|s| s.to_string()).unwrap_or_default()
        );
    }

    let chapters = reconciler.get_chapters(&title).await;
    println!("{} chapters found", chapters.len());
    for chapter in chapters.iter().take(10) {
        println!(
            "  ch. {:>6}  [{}] {} ({})",
            chapter.number,
            chapter.language,
            chapter.title.as_deref().unwrap_or("-"),
            chapter.source.provider.name()
        );
    }

    if let Some(first) = chapters.first() {
        let images = resolver.page_images(&first.source).await;
        println!("first chapter has {} pages", images.len());
    }

    Ok(())
}
