//! FCV article page scraper.
//!
//! Article detail pages live at `https://fcv.org.br/site/noticia/detalhe/{id}`
//! and render their content client-side, so each fetch drives a headless
//! browser tab: navigate, wait for the three known content regions, pull
//! their text, and collect the gallery thumbnail URLs.
//!
//! # Selectors
//!
//! | Region | Selector |
//! |--------|----------|
//! | Title | `.titulo_det` |
//! | Publish date | `.date-cad` |
//! | Body | `.detalhe_texto` |
//! | Gallery images | `img.ug-thumb-image` |

use crate::models::FetchResult;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, Element, Page};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use url::Url;

const ARTICLE_BASE_URL: &str = "https://fcv.org.br/site/noticia/detalhe";

const TITLE_SELECTOR: &str = ".titulo_det";
const DATE_SELECTOR: &str = ".date-cad";
const BODY_SELECTOR: &str = ".detalhe_texto";
const IMAGE_SELECTOR: &str = "img.ug-thumb-image";

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(20);
const SELECTOR_TIMEOUT: Duration = Duration::from_millis(1500);
const SELECTOR_POLL: Duration = Duration::from_millis(100);

/// Failure modes of a single page fetch. Rendered into the
/// [`FetchResult::error`] string; never raised past the fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("navigation to {url} timed out after {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },
    #[error("selector `{selector}` did not appear within {timeout:?}")]
    SelectorTimeout {
        selector: &'static str,
        timeout: Duration,
    },
    #[error(transparent)]
    Cdp(#[from] CdpError),
}

/// Fetch all requested article pages with bounded tab concurrency.
///
/// Failed fetches surface as error-carrying results; the batch itself never
/// fails.
#[instrument(level = "info", skip_all, fields(count = ids.len()))]
pub async fn fetch_articles(
    browser: &Browser,
    ids: &[u32],
    max_concurrent: usize,
) -> Vec<FetchResult> {
    let results: Vec<FetchResult> = stream::iter(ids.iter().copied())
        .map(|id| fetch_article(browser, id))
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    info!(count = results.len(), "Fetched FCV article pages");
    results
}

/// Fetch a single article page.
///
/// Opens one tab, extracts the content regions, and closes the tab on
/// success and failure alike.
#[instrument(level = "info", skip_all, fields(%id))]
pub async fn fetch_article(browser: &Browser, id: u32) -> FetchResult {
    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => return FetchResult::failed(id, format!("could not open a tab: {e}")),
    };

    let outcome = extract_fields(&page, id).await;

    if let Err(e) = page.close().await {
        warn!(id, error = %e, "Failed to close tab");
    }

    match outcome {
        Ok(result) => result,
        Err(e) => FetchResult::failed(id, e.to_string()),
    }
}

async fn extract_fields(page: &Page, id: u32) -> Result<FetchResult, FetchError> {
    let url = article_url(id);
    debug!(id, %url, "Navigating to article page");

    match timeout(NAVIGATION_TIMEOUT, page.goto(url.clone())).await {
        Ok(navigated) => {
            navigated?;
        }
        Err(_) => {
            return Err(FetchError::NavigationTimeout {
                url,
                timeout: NAVIGATION_TIMEOUT,
            });
        }
    }

    let title_el = wait_for_selector(page, TITLE_SELECTOR).await?;
    let date_el = wait_for_selector(page, DATE_SELECTOR).await?;
    let body_el = wait_for_selector(page, BODY_SELECTOR).await?;

    let title = element_text(&title_el).await?;
    let date = element_text(&date_el).await?;
    let body = element_text(&body_el).await?;
    let image_links = image_links(page, &url).await;

    debug!(
        id,
        images = image_links.len(),
        body_bytes = body.as_deref().map(str::len).unwrap_or(0),
        "Extracted article page"
    );

    Ok(FetchResult {
        id,
        title,
        date,
        body,
        image_links: Some(image_links),
        error: None,
    })
}

fn article_url(id: u32) -> String {
    format!("{ARTICLE_BASE_URL}/{id}")
}

/// Poll for a selector until it appears or its timeout elapses.
///
/// The page builds its DOM after navigation settles, so a single
/// `find_element` call right after `goto` races the render.
async fn wait_for_selector(page: &Page, selector: &'static str) -> Result<Element, FetchError> {
    let deadline = tokio::time::Instant::now() + SELECTOR_TIMEOUT;
    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Ok(element);
        }
        if tokio::time::Instant::now() + SELECTOR_POLL > deadline {
            return Err(FetchError::SelectorTimeout {
                selector,
                timeout: SELECTOR_TIMEOUT,
            });
        }
        tokio::time::sleep(SELECTOR_POLL).await;
    }
}

/// Trimmed text content of an element; empty text maps to `None`.
async fn element_text(element: &Element) -> Result<Option<String>, FetchError> {
    let text = element.inner_text().await?;
    Ok(text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty()))
}

/// Collect the gallery thumbnail `src` attributes, resolved to absolute URLs.
///
/// A page without a gallery yields an empty list, not an error.
async fn image_links(page: &Page, page_url: &str) -> Vec<String> {
    let elements = match page.find_elements(IMAGE_SELECTOR).await {
        Ok(elements) => elements,
        Err(_) => return Vec::new(),
    };

    let base = Url::parse(page_url).ok();
    let mut links = Vec::new();
    for element in elements {
        if let Ok(Some(src)) = element.attribute("src").await {
            links.push(resolve_image_src(base.as_ref(), src));
        }
    }
    links
}

fn resolve_image_src(base: Option<&Url>, src: String) -> String {
    match base.and_then(|b| b.join(&src).ok()) {
        Some(resolved) => resolved.to_string(),
        None => src,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_url() {
        assert_eq!(
            article_url(1301),
            "https://fcv.org.br/site/noticia/detalhe/1301"
        );
    }

    #[test]
    fn test_resolve_relative_image_src() {
        let base = Url::parse("https://fcv.org.br/site/noticia/detalhe/1301").unwrap();
        assert_eq!(
            resolve_image_src(Some(&base), "/uploads/thumb.jpg".to_string()),
            "https://fcv.org.br/uploads/thumb.jpg"
        );
    }

    #[test]
    fn test_resolve_absolute_image_src() {
        let base = Url::parse("https://fcv.org.br/site/noticia/detalhe/1301").unwrap();
        assert_eq!(
            resolve_image_src(Some(&base), "https://cdn.fcv.org.br/a.jpg".to_string()),
            "https://cdn.fcv.org.br/a.jpg"
        );
    }

    #[test]
    fn test_resolve_without_base_keeps_raw_src() {
        assert_eq!(
            resolve_image_src(None, "/uploads/thumb.jpg".to_string()),
            "/uploads/thumb.jpg"
        );
    }
}
