//! rustopenreview - OpenReview tables for ICLR venues
//!
//! Exports submissions, official reviews and official comments of a venue to
//! CSV, and classifies accepted papers into primary areas with an LLM.
//!
//! ## Usage
//!
//! ```bash
//! rustopenreview which-api --venue_id ICLR.cc/2024/Conference
//! rustopenreview v1 --venue_year 2019 --save_dir data/2019
//! rustopenreview v2 --venue_id ICLR.cc/2024/Conference --save_dir data/2024
//! rustopenreview primary-area --year 2024 --submissions_dir data --json_pred_path areas.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rustopenreview::client::{default_base_url, OpenReviewClient};
use rustopenreview::note::ApiVersion;
use rustopenreview::primary_area::{self, LlmConfig, OpenAiClient, PredictionCache};
use rustopenreview::prompts::PRIMARY_AREA_TEMPLATE;
use rustopenreview::source::detect_api_version;
use rustopenreview::table::Table;
use rustopenreview::venues::VenueYear;
use rustopenreview::{api_v1, api_v2, credentials};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

const SUBMISSIONS_FILE: &str = "submissions.csv";
const REVIEWS_FILE: &str = "official_reviews.csv";
const COMMENTS_FILE: &str = "official_comments.csv";

// ============================================================================
// CLI Definition
// ============================================================================

/// OpenReview tables for ICLR venues
#[derive(Parser)]
#[command(name = "rustopenreview")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// INI file with a [BASIC] section holding the credentials
    #[arg(long = "credentials_path", global = true, default_value = "../credentials.ini")]
    credentials_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Which tables to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Tables {
    /// submissions.csv
    Submissions,
    /// official_reviews.csv and official_comments.csv
    Discussions,
    All,
}

impl Tables {
    fn submissions(self) -> bool {
        matches!(self, Tables::Submissions | Tables::All)
    }

    fn discussions(self) -> bool {
        matches!(self, Tables::Discussions | Tables::All)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print which OpenReview API version serves a venue
    WhichApi {
        #[arg(long = "venue_id")]
        venue_id: String,

        /// API v2 base URL
        #[arg(long = "base_url")]
        base_url: Option<String>,
    },

    /// Export an ICLR year served by API v1 (2017 to 2023)
    V1 {
        #[arg(long = "venue_year")]
        venue_year: u16,

        /// Directory to write the CSV files to
        #[arg(long = "save_dir")]
        save_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = Tables::All)]
        tables: Tables,

        /// API v1 base URL
        #[arg(long = "base_url")]
        base_url: Option<String>,
    },

    /// Export a venue served by API v2
    V2 {
        #[arg(long = "venue_id")]
        venue_id: String,

        /// Directory to write the CSV files to
        #[arg(long = "save_dir")]
        save_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = Tables::All)]
        tables: Tables,

        /// API v2 base URL
        #[arg(long = "base_url")]
        base_url: Option<String>,
    },

    /// Classify accepted papers of a year into primary areas
    PrimaryArea {
        /// Year; submissions are read from <submissions_dir>/<year>/submissions.csv
        #[arg(long)]
        year: u16,

        #[arg(long = "openai_model_name", default_value = primary_area::DEFAULT_MODEL)]
        openai_model_name: String,

        /// JSON file holding the predictions, updated after every paper
        #[arg(long = "json_pred_path")]
        json_pred_path: PathBuf,

        #[arg(long = "openai_base_url", default_value = primary_area::DEFAULT_BASE_URL)]
        openai_base_url: String,

        /// Prompt template overriding the built-in one
        #[arg(long = "prompt_path")]
        prompt_path: Option<PathBuf>,

        #[arg(long = "submissions_dir", default_value = ".")]
        submissions_dir: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let credentials_path = cli.credentials_path;
    match cli.command {
        Commands::WhichApi { venue_id, base_url } => run_which_api(&credentials_path, &venue_id, base_url).await,
        Commands::V1 {
            venue_year,
            save_dir,
            tables,
            base_url,
        } => run_v1(&credentials_path, venue_year, &save_dir, tables, base_url).await,
        Commands::V2 {
            venue_id,
            save_dir,
            tables,
            base_url,
        } => run_v2(&credentials_path, &venue_id, &save_dir, tables, base_url).await,
        Commands::PrimaryArea {
            year,
            openai_model_name,
            json_pred_path,
            openai_base_url,
            prompt_path,
            submissions_dir,
        } => {
            run_primary_area(
                &credentials_path,
                year,
                openai_model_name,
                &json_pred_path,
                openai_base_url,
                prompt_path,
                &submissions_dir,
            )
            .await
        }
    }
}

// ============================================================================
// OpenReview Export
// ============================================================================

async fn login(credentials_path: &Path, api: ApiVersion, base_url: Option<String>) -> Result<OpenReviewClient> {
    let creds = credentials::load_login(credentials_path)
        .with_context(|| format!("Failed to load credentials from {}", credentials_path.display()))?;
    let base_url = base_url.unwrap_or_else(|| default_base_url(api).to_string());
    OpenReviewClient::login(&base_url, api, &creds.username, &creds.password)
        .await
        .with_context(|| format!("Failed to log in to {}", base_url))
}

async fn run_which_api(credentials_path: &Path, venue_id: &str, base_url: Option<String>) -> Result<()> {
    let client = login(credentials_path, ApiVersion::V2, base_url).await?;
    let api = detect_api_version(&client, venue_id)
        .await
        .with_context(|| format!("Failed to look up venue {}", venue_id))?;
    println!("venue {} uses api version {}", venue_id, api);
    Ok(())
}

async fn run_v1(
    credentials_path: &Path,
    venue_year: u16,
    save_dir: &Path,
    tables: Tables,
    base_url: Option<String>,
) -> Result<()> {
    let venue = VenueYear::get(venue_year)?;
    let client = login(credentials_path, ApiVersion::V1, base_url).await?;
    std::fs::create_dir_all(save_dir).context("Failed to create output directory")?;

    if tables.submissions() {
        let table = api_v1::make_submissions(&client, venue)
            .await
            .context("Failed to build submissions table")?;
        save(&table, save_dir, SUBMISSIONS_FILE)?;
    }
    if tables.discussions() {
        let (reviews, comments) = api_v1::make_discussions(&client, venue)
            .await
            .context("Failed to build discussion tables")?;
        save(&reviews, save_dir, REVIEWS_FILE)?;
        save(&comments, save_dir, COMMENTS_FILE)?;
    }
    Ok(())
}

async fn run_v2(
    credentials_path: &Path,
    venue_id: &str,
    save_dir: &Path,
    tables: Tables,
    base_url: Option<String>,
) -> Result<()> {
    let client = login(credentials_path, ApiVersion::V2, base_url).await?;
    let venue = api_v2::Venue::fetch(&client, venue_id)
        .await
        .with_context(|| format!("Failed to load venue group {}", venue_id))?;
    std::fs::create_dir_all(save_dir).context("Failed to create output directory")?;

    if tables.submissions() {
        let table = api_v2::make_submissions(&client, &venue)
            .await
            .context("Failed to build submissions table")?;
        save(&table, save_dir, SUBMISSIONS_FILE)?;
    }
    if tables.discussions() {
        let (reviews, comments) = api_v2::make_discussions(&client, &venue)
            .await
            .context("Failed to build discussion tables")?;
        save(&reviews, save_dir, REVIEWS_FILE)?;
        save(&comments, save_dir, COMMENTS_FILE)?;
    }
    Ok(())
}

fn save(table: &Table, dir: &Path, name: &str) -> Result<()> {
    let path = dir.join(name);
    table
        .write_csv(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("created {}", name);
    Ok(())
}

// ============================================================================
// Primary Area Classification
// ============================================================================

async fn run_primary_area(
    credentials_path: &Path,
    year: u16,
    model: String,
    json_pred_path: &Path,
    base_url: String,
    prompt_path: Option<PathBuf>,
    submissions_dir: &Path,
) -> Result<()> {
    let keys = credentials::load_api_keys(credentials_path)
        .with_context(|| format!("Failed to load API keys from {}", credentials_path.display()))?;

    let template = match prompt_path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read prompt template {}", path.display()))?,
        None => PRIMARY_AREA_TEMPLATE.to_string(),
    };

    let year = year.to_string();
    let submissions_path = submissions_dir.join(&year).join(SUBMISSIONS_FILE);
    let submissions = primary_area::load_accepted(&submissions_path)
        .with_context(|| format!("Failed to read {}", submissions_path.display()))?;
    println!("found {} accepted submissions", submissions.len());

    let mut cache = PredictionCache::load(json_pred_path)
        .with_context(|| format!("Failed to read predictions from {}", json_pred_path.display()))?;
    info!(cached = cache.len(), path = %json_pred_path.display(), "Loaded prediction cache");

    let client = OpenAiClient::new(LlmConfig {
        base_url,
        api_key: keys.openai_api_key,
        model,
    })?;

    let mut rng = rand::thread_rng();
    let summary = primary_area::run(&client, submissions, &mut cache, &template, &year, &mut rng).await?;
    println!(
        "classified {} submissions ({} already cached)",
        summary.classified, summary.cached
    );
    Ok(())
}
