//! OpenReview HTTP client.
//!
//! Implements [`RecordSource`] for both API generations. Both expose the same
//! endpoints (`/login`, `/notes`, `/groups`); they differ in base URL and in
//! the shape of note content, which is handled downstream.

use crate::error::{OpenReviewError, Result};
use crate::note::{ApiVersion, Group, Note};
use crate::source::{NoteQuery, RecordSource};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

/// API v1 base URL
pub const API_V1_BASE: &str = "https://api.openreview.net";

/// API v2 base URL
pub const API_V2_BASE: &str = "https://api2.openreview.net";

/// Maximum notes per page
const PAGE_SIZE: usize = 1000;

/// Default base URL for an API version
pub fn default_base_url(api: ApiVersion) -> &'static str {
    match api {
        ApiVersion::V1 => API_V1_BASE,
        ApiVersion::V2 => API_V2_BASE,
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct NotesResponse {
    #[serde(default)]
    notes: Vec<Note>,
}

#[derive(Debug, Deserialize)]
struct GroupsResponse {
    #[serde(default)]
    groups: Vec<Group>,
}

/// Authenticated OpenReview client
#[derive(Debug, Clone)]
pub struct OpenReviewClient {
    http: Client,
    base_url: Url,
    api: ApiVersion,
    token: Option<String>,
    page_size: usize,
}

impl OpenReviewClient {
    /// Client without credentials; only public data is visible.
    pub fn anonymous(base_url: &str, api: ApiVersion) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("rustopenreview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OpenReviewError::Config(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = Url::parse(base_url)
            .map_err(|e| OpenReviewError::Config(format!("Invalid base URL {}: {}", base_url, e)))?;

        Ok(Self {
            http,
            base_url,
            api,
            token: None,
            page_size: PAGE_SIZE,
        })
    }

    /// Log in and keep the returned token for later requests.
    pub async fn login(base_url: &str, api: ApiVersion, username: &str, password: &str) -> Result<Self> {
        let mut client = Self::anonymous(base_url, api)?;

        let response = client
            .http
            .post(client.endpoint("login")?)
            .json(&serde_json::json!({ "id": username, "password": password }))
            .send()
            .await?;
        let login: LoginResponse = check_status(response).await?.json().await?;
        client.token = Some(login.token);

        info!(base_url = %client.base_url, api = %api, "Logged in to OpenReview");
        Ok(client)
    }

    /// Override the page size used when listing notes
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| OpenReviewError::Config(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_page(&self, query: &NoteQuery, offset: usize) -> Result<Vec<Note>> {
        let mut params: Vec<(String, String)> = vec![
            ("offset".to_string(), offset.to_string()),
            ("limit".to_string(), self.page_size.to_string()),
        ];
        if let Some(invitation) = &query.invitation {
            params.push(("invitation".to_string(), invitation.clone()));
        }
        if let Some((field, value)) = &query.content {
            params.push((format!("content.{}", field), value.clone()));
        }
        if let Some(details) = &query.details {
            params.push(("details".to_string(), details.clone()));
        }

        debug!(query = ?query, offset = offset, "Fetching notes page");
        let response = self.get(self.endpoint("notes")?).query(&params).send().await?;
        let page: NotesResponse = check_status(response).await?.json().await?;
        Ok(page.notes)
    }
}

impl RecordSource for OpenReviewClient {
    fn api_version(&self) -> ApiVersion {
        self.api
    }

    async fn notes(&self, query: &NoteQuery) -> Result<Vec<Note>> {
        let mut notes = Vec::new();
        loop {
            let page = self.fetch_page(query, notes.len()).await?;
            let short = page.len() < self.page_size;
            notes.extend(page);
            if short {
                break;
            }
        }
        debug!(query = ?query, count = notes.len(), "Fetched notes");
        Ok(notes)
    }

    async fn group(&self, id: &str) -> Result<Group> {
        let response = self
            .get(self.endpoint("groups")?)
            .query(&[("id", id)])
            .send()
            .await?;
        let groups: GroupsResponse = check_status(response).await?.json().await?;
        groups.groups.into_iter().next().ok_or_else(|| OpenReviewError::Api {
            code: 404,
            message: format!("Group Not Found: {}", id),
        })
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(OpenReviewError::Api {
        code: status.as_u16() as i32,
        message: format!("OpenReview API error: {} - {}", status, message),
    })
}
