// src/api/client.rs
//! Pure HTTP client wrapper for the OSF API.
//!
//! This module provides a thin wrapper around reqwest for making
//! GET requests to the OSF v2 API. It handles authentication and URL
//! construction; parsing lives in `parser`.

use super::parser::{parse_list_page, parse_single_resource};
use super::responses::{Page, Resource};
use crate::constants::{OSF_MEDIA_TYPE, PROJECT_TREE_EMBEDS};
use crate::error::{AppError, FetchFailure};
use crate::types::{ApiToken, Guid, ResourceKind};
use reqwest::{header, Client};
use url::Url;

/// A thin wrapper around reqwest Client for OSF API requests.
#[derive(Clone)]
pub struct OsfHttpClient {
    client: Client,
    base_url: Url,
}

impl OsfHttpClient {
    /// Creates a new HTTP client, authenticated when a token is given.
    pub fn new(base_url: &Url, api_token: Option<&ApiToken>) -> Result<Self, AppError> {
        if base_url.cannot_be_a_base() {
            return Err(AppError::MissingConfiguration(format!(
                "OSF base URL cannot carry paths: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .default_headers(Self::create_headers(api_token)?)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.clone(),
        })
    }

    /// Creates the default headers for OSF API requests.
    fn create_headers(api_token: Option<&ApiToken>) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        if let Some(token) = api_token {
            let auth_header = format!("Bearer {}", token.as_str());
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&auth_header).map_err(|e| {
                    AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
                })?,
            );
        }

        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(OSF_MEDIA_TYPE),
        );

        Ok(headers)
    }

    /// Builds `{base}/{segments...}/`, OSF's trailing-slash form.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    /// URL of one page of a listing.
    pub fn page_url(&self, kind: ResourceKind, subject: &Guid, page: u32) -> Url {
        let mut url = self.endpoint(&[kind.subject_collection(), subject.as_str(), kind.path()]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        url
    }

    /// URL of a project with its children and contributors embedded.
    pub fn project_tree_url(&self, node: &Guid) -> Url {
        let mut url = self.endpoint(&["nodes", node.as_str()]);
        {
            let mut query = url.query_pairs_mut();
            for embed in PROJECT_TREE_EMBEDS {
                query.append_pair("embed", embed);
            }
        }
        url
    }

    /// URL of a user profile.
    pub fn user_url(&self, user: &Guid) -> Url {
        self.endpoint(&["users", user.as_str()])
    }

    /// Makes a GET request and captures the body with its metadata.
    ///
    /// Only transport problems surface here; status handling is the parser's job.
    pub async fn get(&self, url: Url) -> Result<ApiResponse<String>, FetchFailure> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchFailure::transport(url.as_str(), &e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|e| FetchFailure::transport(final_url.as_str(), &e))?;

        Ok(ApiResponse {
            data: text,
            status,
            url: final_url,
        })
    }
}

#[async_trait::async_trait]
impl super::ResourceApi for OsfHttpClient {
    async fn fetch_page(
        &self,
        kind: ResourceKind,
        subject: &Guid,
        page: u32,
    ) -> Result<Page<Resource>, FetchFailure> {
        let response = self.get(self.page_url(kind, subject, page)).await?;
        parse_list_page(&response)
    }

    async fn fetch_project_tree(&self, node: &Guid) -> Result<Resource, FetchFailure> {
        let response = self.get(self.project_tree_url(node)).await?;
        parse_single_resource(&response)
    }

    async fn fetch_user(&self, user: &Guid) -> Result<Resource, FetchFailure> {
        let response = self.get(self.user_url(user)).await?;
        parse_single_resource(&response)
    }

    async fn follow(&self, next: &str) -> Result<Page<Resource>, FetchFailure> {
        let url = Url::parse(next).map_err(|e| FetchFailure {
            url: next.to_string(),
            status: None,
            reason: format!("unusable continuation link: {}", e),
        })?;
        let response = self.get(url).await?;
        parse_list_page(&response)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}
