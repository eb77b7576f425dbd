//! Article page scrapers.
//!
//! The FCV site is the only source. Its scraper drives a shared headless
//! browser instance because the article pages assemble their content with
//! JavaScript; plain HTTP fetches return an empty shell.
//!
//! The scraper exports:
//! - `fetch_articles(browser, ids, max_concurrent)`: bounded concurrent
//!   fetch over a list of numeric article IDs
//! - `fetch_article(browser, id)`: one ID, one tab, one [`FetchResult`]
//!
//! Failures never propagate: every error path is folded into the returned
//! `FetchResult` so a bad ID costs nothing but a log line.
//!
//! [`FetchResult`]: crate::models::FetchResult

pub mod fcv;
