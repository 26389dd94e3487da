//! Credential loading from an INI file.
//!
//! The file holds a single `[BASIC]` section:
//!
//! ```ini
//! [BASIC]
//! USERNAME = <username>
//! PASSWORD = <password>
//! SERPER_API_KEY = <api_key>
//! OPENAI_API_KEY = <api_key>
//! ```
//!
//! Key lookup is ASCII case-insensitive. A missing file, section or key is
//! fatal and is reported before any network activity.

use crate::error::{OpenReviewError, Result};
use ini::Ini;
use std::path::Path;
use tracing::debug;

/// Section holding every credential
const SECTION: &str = "BASIC";

/// OpenReview login pair
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// API keys used by the primary-area classifier
#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub serper_api_key: String,
    pub openai_api_key: String,
}

/// Read the two named keys from `[BASIC]`.
pub fn load_pair(path: &Path, first: &str, second: &str) -> Result<(String, String)> {
    let ini = Ini::load_from_file(path)?;
    debug!(path = %path.display(), "Loaded credentials file");

    let section = ini
        .section(Some(SECTION))
        .ok_or_else(|| OpenReviewError::MissingCredential {
            key: first.to_string(),
        })?;

    let lookup = |key: &str| -> Result<String> {
        section
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.to_string())
            .ok_or_else(|| OpenReviewError::MissingCredential {
                key: key.to_string(),
            })
    };

    Ok((lookup(first)?, lookup(second)?))
}

/// Load `USERNAME`/`PASSWORD`.
pub fn load_login(path: &Path) -> Result<Credentials> {
    let (username, password) = load_pair(path, "USERNAME", "PASSWORD")?;
    Ok(Credentials { username, password })
}

/// Load `SERPER_API_KEY`/`OPENAI_API_KEY`.
pub fn load_api_keys(path: &Path) -> Result<ApiKeys> {
    let (serper_api_key, openai_api_key) = load_pair(path, "SERPER_API_KEY", "OPENAI_API_KEY")?;
    Ok(ApiKeys {
        serper_api_key,
        openai_api_key,
    })
}
