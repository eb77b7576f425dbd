//! # FCV News
//!
//! A one-shot batch pipeline that scrapes news articles from the Fundação
//! Cristiano Varella site, enriches each with an LLM-generated summary and
//! tag list, and writes the assembled records to a JSON file.
//!
//! ## Pipeline
//!
//! 1. **Fetching**: drive a shared headless Chrome instance over the
//!    configured article IDs (bounded tab concurrency), extracting
//!    title/date/body/images per page
//! 2. **Enrichment**: for each complete fetch, two concurrent OpenRouter
//!    chat-completion calls produce the summary and the tags
//! 3. **Assembly**: normalize the publish date to epoch seconds against a
//!    configured UTC offset and build the final records
//! 4. **Output**: write the batch as JSON
//!
//! All enrichment work is joined before the browser is released, and every
//! skipped ID leaves a log line naming the reason.
//!
//! ## Usage
//!
//! ```sh
//! OPEN_ROUTER_KEY=sk-... fcv_news -j ./json
//! ```

use chrono::{FixedOffset, Local};
use clap::Parser;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod browser;
mod cli;
mod dates;
mod models;
mod outputs;
mod scrapers;
mod utils;

use api::EnrichmentClient;
use cli::Cli;
use models::{FetchResult, Noticia, NoticiaBatch};
use utils::ensure_writable_dir;

/// Enrichment calls in flight at once across all fetch results.
const ENRICH_CONCURRENCY: usize = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("fcv_news starting up");

    // Parse CLI; a missing OpenRouter key aborts here, before any I/O.
    let args = Cli::parse();
    debug!(?args.ids, ?args.json_output_dir, ?args.model, "Parsed CLI arguments");

    let offset = args.utc_offset()?;

    // Early check: ensure the JSON output dir is writable
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let client = EnrichmentClient::new(args.open_router_key.clone(), args.model.clone())?;

    // ---- Fetch article pages ----
    let (browser, handler) = browser::launch(args.chrome_path.as_deref()).await?;

    let results =
        scrapers::fcv::fetch_articles(&browser, &args.ids, args.max_concurrent_pages).await;
    let fetched = results.iter().filter(|r| r.error.is_none()).count();
    info!(
        requested = args.ids.len(),
        fetched,
        failed = args.ids.len() - fetched,
        "Fetch phase complete"
    );

    // ---- Enrich and assemble ----
    // Every enrichment future is collected here, so the browser outlives all
    // in-flight work and nothing is dropped mid-call at process exit.
    let noticias: Vec<Noticia> = stream::iter(results)
        .map(|result| process_result(&client, result, offset))
        .buffer_unordered(ENRICH_CONCURRENCY)
        .collect::<Vec<Option<Noticia>>>()
        .await
        .into_iter()
        .flatten()
        .collect();

    browser::shutdown(browser, handler).await;

    let kept = noticias.len();
    info!(
        requested = args.ids.len(),
        kept,
        skipped = args.ids.len() - kept,
        "Enrichment phase complete"
    );

    // ---- Output ----
    let batch = NoticiaBatch {
        local_date: Local::now().date_naive().to_string(),
        local_time: Local::now().time().to_string(),
        noticias,
    };
    outputs::json::write_batch(&batch, &args.json_output_dir).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        articles = kept,
        "Execution complete"
    );

    Ok(())
}

/// Enrich one fetch result into a publish-ready record.
///
/// Returns `None` when the ID is skipped. Every skip path logs the reason
/// (fetch errors and enrichment failures at `warn`, incomplete pages at
/// `debug`), so no article disappears without a trace.
async fn process_result(
    client: &EnrichmentClient,
    result: FetchResult,
    offset: FixedOffset,
) -> Option<Noticia> {
    if let Some(error) = &result.error {
        warn!(id = result.id, error = %error, "Fetch failed; skipping");
        return None;
    }
    if !result.is_complete() {
        debug!(id = result.id, "Page is missing title, date, or body; skipping");
        return None;
    }

    let FetchResult {
        id,
        title,
        date,
        body,
        image_links,
        ..
    } = result;
    let (Some(title), Some(date), Some(body)) = (title, date, body) else {
        return None;
    };

    let (resumo, tags) = futures::join!(
        client.summarize(&body),
        client.generate_tags(id, &body)
    );

    let resumo = match resumo {
        Ok(resumo) => resumo,
        Err(e) => {
            warn!(id, error = %e, "Summary enrichment failed; skipping");
            return None;
        }
    };
    let tags = match tags {
        // The model occasionally repeats itself; keep first occurrences.
        Ok(tags) => tags.into_iter().unique().collect::<Vec<String>>(),
        Err(e) => {
            warn!(id, error = %e, "Tag enrichment failed; skipping");
            return None;
        }
    };

    let data_publicacao = match dates::normalize(&date, offset) {
        Ok(timestamp) => timestamp,
        Err(e) => {
            warn!(id, error = %e, "Publish date did not normalize; skipping");
            return None;
        }
    };

    info!(id, tags = tags.len(), "Enriched article");
    Some(Noticia {
        titulo: title,
        resumo,
        conteudo: body,
        data_publicacao,
        local_id: Some(id),
        tags: Some(tags),
        imagens: image_links.filter(|links| !links.is_empty()),
    })
}
