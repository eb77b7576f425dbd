//! Command-line interface definitions.
//!
//! All configuration comes in through `clap`: the article ID list, the
//! output directory, the enrichment credentials, and the knobs the original
//! deployment hardcoded (model, timezone offset, tab concurrency). The
//! OpenRouter key is required up front so a missing credential fails the run
//! before any network work starts.

use chrono::FixedOffset;
use clap::Parser;

/// Command-line arguments for the FCV news scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the default ID range into ./json
/// fcv_news -j ./json
///
/// # Explicit IDs, different model
/// fcv_news -j ./json --ids 1310,1311 --model qwen/qwen-2.5-7b-instruct:free
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Article IDs to scrape, comma separated
    #[arg(
        short,
        long,
        value_delimiter = ',',
        num_args = 1..,
        default_values_t = [1301u32, 1302, 1303, 1304, 1305, 1306, 1307, 1308, 1309]
    )]
    pub ids: Vec<u32>,

    /// Output directory for the JSON batch file
    #[arg(short, long)]
    pub json_output_dir: String,

    /// OpenRouter API key used for the enrichment calls
    #[arg(long, env = "OPEN_ROUTER_KEY", hide_env_values = true)]
    pub open_router_key: String,

    /// Chat model used for summary and tag generation
    #[arg(long, default_value = "meta-llama/llama-3.3-8b-instruct:free")]
    pub model: String,

    /// UTC offset, in whole hours, in which the site's publish dates are
    /// interpreted (the site publishes in Brasília time)
    #[arg(long, default_value_t = -3, allow_negative_numbers = true)]
    pub utc_offset_hours: i32,

    /// Maximum number of browser tabs open at once
    #[arg(long, default_value_t = 6)]
    pub max_concurrent_pages: usize,

    /// Path to the Chrome/Chromium executable (autodetected when unset)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<String>,
}

impl Cli {
    /// The configured publish-date timezone as a `chrono` offset.
    pub fn utc_offset(&self) -> Result<FixedOffset, String> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            format!(
                "--utc-offset-hours {} is out of range",
                self.utc_offset_hours
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from([
            "fcv_news",
            "--json-output-dir",
            "./json",
            "--open-router-key",
            "test-key",
        ]);

        assert_eq!(cli.ids, (1301..=1309).collect::<Vec<u32>>());
        assert_eq!(cli.json_output_dir, "./json");
        assert_eq!(cli.model, "meta-llama/llama-3.3-8b-instruct:free");
        assert_eq!(cli.utc_offset_hours, -3);
        assert_eq!(cli.max_concurrent_pages, 6);
        assert!(cli.chrome_path.is_none());
    }

    #[test]
    fn test_cli_explicit_ids() {
        let cli = Cli::parse_from([
            "fcv_news",
            "-j",
            "/tmp/json",
            "--open-router-key",
            "test-key",
            "--ids",
            "1310,1311",
        ]);

        assert_eq!(cli.ids, vec![1310, 1311]);
    }

    #[test]
    fn test_utc_offset_default_is_brasilia() {
        let cli = Cli::parse_from([
            "fcv_news",
            "-j",
            "./json",
            "--open-router-key",
            "test-key",
        ]);

        let offset = cli.utc_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_utc_offset_out_of_range() {
        let cli = Cli::parse_from([
            "fcv_news",
            "-j",
            "./json",
            "--open-router-key",
            "test-key",
            "--utc-offset-hours",
            "30",
        ]);

        assert!(cli.utc_offset().is_err());
    }
}
