// src/lib.rs
//! osf2graph library: crawls the OSF API into a local SQLite store and
//! derives a staff collaboration graph from it.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `FetchFailure`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `CrawlConfig`
//! - **Domain types**: `Guid`, `ApiToken`, `ResourceKind`, row records
//! - **API client**: `ResourceApi`, `OsfHttpClient`, collectors, parsers
//! - **Store**: `Store` and its tables
//! - **Graph**: `derive_graph`, `build_collaboration_graph`

pub mod api;
mod config;
mod constants;
mod error;
pub mod graph;
pub mod pipeline;
pub mod staff;
pub mod store;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, FetchFailure, Result};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, CrawlCommand, CrawlConfig, CrawlTask};

// --- Domain Types ---
pub use crate::types::{
    ApiToken, Education, Guid, Job, Node, NodeContributor, NodeRelation, NodeTag, ProjectBatch,
    ResourceKind, ResourceRecord, Social, StaffFlag, StaffStatus, User, UserProfile,
};

// --- API Client ---
pub use crate::api::{
    client::ApiResponse,
    parser::{parse_list_page, parse_single_resource},
    Collected, Expansion, OsfHttpClient, PageCollector, ProfileFetcher, ProjectTreeExpander,
    ResourceApi,
};

// --- Store ---
pub use crate::store::{Member, Store, Table};

// --- Graph ---
pub use crate::graph::{
    build_collaboration_graph, derive_graph, CollaborationEdge, CollaborationGraph, EdgeClass,
    TieSummary,
};

// --- Crawl ---
pub use crate::pipeline::{CrawlReport, Crawler};
pub use crate::staff::StaffRoster;
