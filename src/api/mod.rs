// src/api/mod.rs
//! OSF API interaction: the ability to page through resources and expand
//! project trees.
//!
//! This module provides a data-oriented interface to the OSF API,
//! with clear separation between I/O operations, parsing, and the
//! collection logic built on top of them.

pub mod client;
mod fan_out;
pub mod page_collector;
pub mod parser;
pub mod profile;
pub mod responses;
pub mod tree_expander;

use crate::error::FetchFailure;
use crate::types::{Guid, ResourceKind};
use responses::{Page, Resource};

/// The ability to read resources from the OSF API.
///
/// Every operation is exactly one round trip. A refused or unreadable
/// response comes back as a `FetchFailure` value; nothing here retries.
/// Collection logic depends on this trait, never on HTTP details.
#[async_trait::async_trait]
pub trait ResourceApi: Send + Sync {
    /// One page (1-based) of a listing under `subject`.
    async fn fetch_page(
        &self,
        kind: ResourceKind,
        subject: &Guid,
        page: u32,
    ) -> Result<Page<Resource>, FetchFailure>;

    /// A project with its children and contributors embedded.
    async fn fetch_project_tree(&self, node: &Guid) -> Result<Resource, FetchFailure>;

    /// A single user profile.
    async fn fetch_user(&self, user: &Guid) -> Result<Resource, FetchFailure>;

    /// The page behind an absolute continuation link.
    async fn follow(&self, next: &str) -> Result<Page<Resource>, FetchFailure>;
}

// Re-export the public interface
pub use client::OsfHttpClient;
pub use page_collector::{Collected, PageCollector};
pub use profile::ProfileFetcher;
pub use tree_expander::{Expansion, ProjectTreeExpander};
