// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// OSF API boundaries
// ---------------------------------------------------------------------------

/// Base URL of the OSF v2 API.
pub const OSF_API_BASE_URL: &str = "https://api.osf.io/v2";

/// How many objects the OSF API returns per page of results.
///
/// Fixed by the upstream API; the collector's page arithmetic depends on it.
pub const OSF_API_PAGE_SIZE: u64 = 10;

/// Media type the OSF JSON:API speaks.
pub const OSF_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Sub-resources embedded when expanding a project tree.
pub const PROJECT_TREE_EMBEDS: [&str; 2] = ["children", "contributors"];

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

/// Workers per collection call when none are configured.
pub const DEFAULT_NUM_WORKERS: usize = 2;

/// Upper bound on workers per collection call.
pub const MAX_NUM_WORKERS: usize = 32;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// SQLite file used when `--database` is not given.
pub const DEFAULT_DATABASE_PATH: &str = "osf_graph.sqlite";

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Shared-project count a tie must exceed to count as strong.
pub const STRONG_TIE_MIN_EXCLUSIVE: usize = 1;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing unparseable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
