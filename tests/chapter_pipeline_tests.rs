//! Cross-module tests for the normalization pipeline, driven by captured
//! payload shapes instead of live upstreams.

use rust_manga_reader::models::{ChapterSource, ProviderKind};
use rust_manga_reader::sources::{chapter_value, comick, mangadex};

fn languages() -> Vec<String> {
    vec!["pt-br".to_string(), "en".to_string()]
}

#[test]
fn mangadex_feed_to_unified_chapters() {
    let body = r#"{"result":"ok","response":"collection","data":[
        {"id":"11111111-2222-3333-4444-555555555555","attributes":{
            "chapter":"1100","volume":null,"title":"A Long Awaited Chapter",
            "publishAt":"2024-01-07T12:00:00+00:00","pages":17,
            "externalUrl":null,"translatedLanguage":"en"}},
        {"id":"11111111-2222-3333-4444-666666666666","attributes":{
            "chapter":"1100","volume":null,"title":null,
            "publishAt":"2024-01-08T12:00:00+00:00","pages":17,
            "externalUrl":null,"translatedLanguage":"pt-br"}},
        {"id":"11111111-2222-3333-4444-777777777777","attributes":{
            "chapter":"1099","volume":null,"title":"External Only",
            "publishAt":"2024-01-01T12:00:00+00:00","pages":0,
            "externalUrl":"https://official.example/1099","translatedLanguage":"en"}}
    ]}"#;

    let chapters = mangadex::parse_chapter_feed(body, &languages());
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].number, "1100");
    assert_eq!(chapters[0].language, "pt-br");
    assert_eq!(chapters[0].source.provider, ProviderKind::MangaDex);
    // The pt-br variant's id is what image resolution will use.
    assert_eq!(chapters[0].source.id, "11111111-2222-3333-4444-666666666666");
}

#[test]
fn comick_list_to_unified_chapters() {
    let body = r#"{"chapters":[
        {"hid":"ab12cd","chap":"3","vol":"1","title":null,"created_at":"2023-06-01T00:00:00Z","lang":"pt-br"},
        {"hid":"ef34gh","chap":"2.5","vol":"1","title":"Extra","created_at":"2023-05-20T00:00:00Z","lang":"pt-br"},
        {"hid":"ij56kl","chap":"2","vol":"1","title":null,"created_at":"2023-05-01T00:00:00Z","lang":"pt-br"}
    ]}"#;

    let chapters = comick::parse_chapter_list(body, &languages());
    let numbers: Vec<&str> = chapters.iter().map(|c| c.number.as_str()).collect();
    assert_eq!(numbers, vec!["3", "2.5", "2"]);
    for pair in chapters.windows(2) {
        assert!(chapter_value(&pair[0].number) > chapter_value(&pair[1].number));
    }
}

#[test]
fn provider_id_namespaces_are_distinguishable() {
    // MangaDex chapter ids are UUIDs, Comick ids short tokens; a bare id
    // from a deep link still routes to the right provider.
    let feed = ChapterSource::from_raw_id("11111111-2222-3333-4444-555555555555");
    let list = ChapterSource::from_raw_id("ab12cd");
    assert_eq!(feed.provider, ProviderKind::MangaDex);
    assert_eq!(list.provider, ProviderKind::Comick);
}

#[test]
fn image_expansion_matches_provider_rules() {
    let md_body = r#"{"result":"ok","baseUrl":"https://node7.example","chapter":{"hash":"deadbeef","data":["a.png","b.png","c.png"]}}"#;
    let md_urls = mangadex::parse_page_images(md_body);
    assert_eq!(md_urls.len(), 3);
    assert!(md_urls[0].starts_with("https://node7.example/data/deadbeef/"));

    let ck_body = r#"{"chapter":{"images":[{"url":null,"b2key":"p1.jpg"},{"url":"https://direct.example/p2.jpg","b2key":null}]}}"#;
    let ck_urls = comick::parse_page_images(ck_body, "https://meo.comick.pictures");
    assert_eq!(
        ck_urls,
        vec![
            "https://meo.comick.pictures/p1.jpg",
            "https://direct.example/p2.jpg"
        ]
    );
}
