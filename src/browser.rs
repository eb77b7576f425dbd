//! Headless Chrome lifecycle.
//!
//! One browser instance is shared by every page fetch in a run. Launching
//! returns the [`Browser`] handle together with the join handle of the CDP
//! event loop; [`shutdown`] closes the browser and reaps that loop after all
//! scraping and enrichment work has finished.

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::error::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Launch a headless Chrome instance and its CDP handler task.
///
/// The executable is autodetected unless `chrome_path` overrides it. The
/// extra flags keep Chrome usable inside containers and CI runners.
pub async fn launch(
    chrome_path: Option<&str>,
) -> Result<(Browser, JoinHandle<()>), Box<dyn Error>> {
    let mut builder = BrowserConfig::builder()
        .arg("--disable-dev-shm-usage")
        .arg("--no-sandbox")
        .arg("--disable-gpu");

    if let Some(path) = chrome_path {
        builder = builder.chrome_executable(path);
    }

    let config = builder
        .build()
        .map_err(|e| format!("failed to build browser config: {e}"))?;

    info!("Launching headless browser");
    let (browser, mut handler) = Browser::launch(config).await?;

    // CDP event loop; ends when the browser connection drops.
    let handler = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    Ok((browser, handler))
}

/// Close the browser and wait for its event loop to drain.
///
/// Called exactly once per run, strictly after every fetch and enrichment
/// task has been joined.
pub async fn shutdown(mut browser: Browser, handler: JoinHandle<()>) {
    match browser.close().await {
        Ok(_) => {
            if let Err(e) = handler.await {
                warn!(error = %e, "Browser handler task ended abnormally");
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to close browser cleanly");
            handler.abort();
        }
    }
    info!("Browser shut down");
}
