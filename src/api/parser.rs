// src/api/parser.rs
//! Turns raw OSF responses into typed documents.
//!
//! Parsing never raises: a non-success status or an unreadable body becomes a
//! `FetchFailure` the caller can log and branch on.

use super::client::ApiResponse;
use super::responses::{ListDocument, Page, Resource, SingleDocument};
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::FetchFailure;

/// Parse any OSF response body into `T`, or describe why it cannot be.
pub fn parse_api_response<T>(result: &ApiResponse<String>) -> Result<T, FetchFailure>
where
    T: serde::de::DeserializeOwned,
{
    if !result.status.is_success() {
        return Err(FetchFailure::http(result.url.clone(), result.status));
    }

    serde_json::from_str(&result.data).map_err(|e| {
        log::debug!(
            "Unparseable body from {}: {}",
            result.url,
            preview(&result.data)
        );
        FetchFailure::malformed(result.url.clone(), result.status.as_u16(), e)
    })
}

/// Parse a listing response into a page of resources.
pub fn parse_list_page(result: &ApiResponse<String>) -> Result<Page<Resource>, FetchFailure> {
    parse_api_response::<ListDocument>(result).map(ListDocument::into_page)
}

/// Parse a single-resource response.
pub fn parse_single_resource(result: &ApiResponse<String>) -> Result<Resource, FetchFailure> {
    parse_api_response::<SingleDocument>(result).map(|doc| doc.data)
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}
