//! JSON output for the assembled article batch.
//!
//! One file per run date:
//! ```text
//! json_output_dir/
//! └── 2024-01-01.json
//! ```

use crate::models::NoticiaBatch;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`NoticiaBatch`] to `{json_output_dir}/{local_date}.json`.
///
/// Creates the output directory if needed. A second run on the same date
/// overwrites the earlier file.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_batch(
    batch: &NoticiaBatch,
    json_output_dir: &str,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string(batch)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_path = format!(
        "{}/{}.json",
        json_output_dir.trim_end_matches('/'),
        batch.local_date
    );

    info!(path = %output_path, "Writing JSON");
    fs::write(&output_path, json).await?;
    info!(path = %output_path, count = batch.noticias.len(), "Wrote noticias JSON file");

    Ok(())
}
