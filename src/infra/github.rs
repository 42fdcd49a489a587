//! Blob store backed by the GitHub repository contents API.
//!
//! Each collection is one file in the repository; the file's blob sha is the
//! revision token.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::application::store::{Blob, BlobStore, Revision, StoreError, WriteCondition};

const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw+json";
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base: Url,
    pub owner: String,
    pub repo: String,
    /// Branch to read from and commit to; the repository default when unset.
    pub branch: Option<String>,
    pub token: String,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GitHubContentStore {
    client: Client,
    config: GitHubConfig,
}

impl GitHubContentStore {
    pub fn new(config: GitHubConfig) -> Result<Self, StoreError> {
        let mut builder = Client::builder().user_agent(user_agent());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(StoreError::transport)?;
        Ok(Self { client, config })
    }

    fn contents_url(&self, path: &str, with_ref: bool) -> Result<Url, StoreError> {
        let segments = blob_segments(path)?;
        let mut url = self.config.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidPath {
                path: path.to_string(),
            })?
            .pop_if_empty()
            .extend([
                "repos",
                self.config.owner.as_str(),
                self.config.repo.as_str(),
                "contents",
            ])
            .extend(segments);

        if with_ref && let Some(branch) = &self.config.branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, accept: &'static str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header(header::ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Files above the contents API inline limit come back without a body;
    /// fetch those through the raw media type.
    async fn fetch_raw(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.contents_url(path, true)?;
        let response = self
            .request(Method::GET, url, ACCEPT_RAW)
            .send()
            .await
            .map_err(StoreError::transport)?;
        if !response.status().is_success() {
            return Err(error_for(path, response, false).await);
        }
        let bytes = response.bytes().await.map_err(StoreError::transport)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl BlobStore for GitHubContentStore {
    #[instrument(skip(self), fields(repo = %self.config.repo))]
    async fn get(&self, path: &str) -> Result<Option<Blob>, StoreError> {
        let url = self.contents_url(path, true)?;
        let response = self
            .request(Method::GET, url, ACCEPT_JSON)
            .send()
            .await
            .map_err(StoreError::transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "blob not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_for(path, response, false).await);
        }

        let body: ContentsResponse = response.json().await.map_err(StoreError::decode)?;
        let content = match body.encoding.as_deref() {
            Some("base64") if !body.content.is_empty() || body.size == 0 => {
                decode_base64(&body.content)?
            }
            _ if body.size == 0 => Vec::new(),
            _ => self.fetch_raw(path).await?,
        };

        Ok(Some(Blob {
            content,
            revision: Revision::new(body.sha),
        }))
    }

    #[instrument(
        skip(self, content, message),
        fields(repo = %self.config.repo, bytes = content.len())
    )]
    async fn put(
        &self,
        path: &str,
        content: Vec<u8>,
        message: &str,
        condition: WriteCondition,
    ) -> Result<Revision, StoreError> {
        let conditional = !matches!(condition, WriteCondition::Unconditional);
        // The API wants the current sha to replace an existing file.
        let sha = match condition {
            WriteCondition::Unconditional => self.get(path).await?.map(|blob| blob.revision),
            WriteCondition::Absent => None,
            WriteCondition::Matches(revision) => Some(revision),
        };

        let body = PutRequest {
            message,
            content: STANDARD.encode(&content),
            branch: self.config.branch.as_deref(),
            sha: sha.as_ref().map(Revision::as_str),
        };
        let url = self.contents_url(path, false)?;
        let response = self
            .request(Method::PUT, url, ACCEPT_JSON)
            .json(&body)
            .send()
            .await
            .map_err(StoreError::transport)?;

        if !response.status().is_success() {
            return Err(error_for(path, response, conditional).await);
        }

        let stored: PutResponse = response.json().await.map_err(StoreError::decode)?;
        debug!(path, sha = %stored.content.sha, "committed blob");
        Ok(Revision::new(stored.content.sha))
    }
}

fn user_agent() -> &'static str {
    concat!("folio/", env!("CARGO_PKG_VERSION"))
}

/// Split a repository-relative path, refusing anything that could escape it.
fn blob_segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let segments: Vec<&str> = path.split('/').collect();
    let valid = !path.is_empty()
        && segments
            .iter()
            .all(|segment| !segment.is_empty() && *segment != "." && *segment != "..");
    if valid {
        Ok(segments)
    } else {
        Err(StoreError::InvalidPath {
            path: path.to_string(),
        })
    }
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>, StoreError> {
    let compact: String = encoded.split_whitespace().collect();
    STANDARD.decode(compact).map_err(StoreError::decode)
}

async fn error_for(path: &str, response: Response, conditional: bool) -> StoreError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized { message },
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => StoreError::conflict(path),
        StatusCode::UNPROCESSABLE_ENTITY if conditional => StoreError::conflict(path),
        _ => {
            warn!(path, status = status.as_u16(), %message, "remote store rejected request");
            StoreError::Rejected {
                path: path.to_string(),
                status: status.as_u16(),
                message,
            }
        }
    }
}
