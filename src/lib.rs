//! Unified manga catalog and chapter aggregation core.
//!
//! Joins the Jikan metadata catalog with two independent chapter-hosting
//! providers (MangaDex, Comick) behind one deduplicated,
//! language-prioritized chapter list, with the request shaping — CORS relay
//! rotation and strict catalog rate limiting — needed to stay inside the
//! upstream APIs' limits.

pub mod catalog;
pub mod config;
pub mod content_filter;
pub mod images;
pub mod models;
pub mod proxy;
pub mod reconciler;
pub mod sources;
