//! # rustopenreview
//!
//! OpenReview submission, review and comment export to CSV tables.
//!
//! ## Modules
//!
//! - [`client`] - OpenReview HTTP client (API v1 and v2)
//! - [`api_v1`] / [`api_v2`] - table pipelines per API version
//! - [`outcome`] - decision outcome classification
//! - [`normalize`] / [`schema`] - record to row normalization
//! - [`table`] - CSV serialization with escaping fallback
//! - [`primary_area`] - resumable LLM primary-area classification
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustopenreview::client::{OpenReviewClient, API_V2_BASE};
//! use rustopenreview::{api_v2, note::ApiVersion};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OpenReviewClient::login(API_V2_BASE, ApiVersion::V2, "me@example.com", "secret").await?;
//!     let venue = api_v2::Venue::fetch(&client, "ICLR.cc/2024/Conference").await?;
//!     let table = api_v2::make_submissions(&client, &venue).await?;
//!     println!("Found {} submissions", table.len());
//!     Ok(())
//! }
//! ```

pub mod api_v1;
pub mod api_v2;
pub mod client;
pub mod content;
pub mod credentials;
pub mod error;
pub mod normalize;
pub mod note;
pub mod outcome;
pub mod primary_area;
pub mod prompts;
pub mod schema;
pub mod source;
pub mod table;
pub mod venues;

pub use error::{OpenReviewError, Result};
