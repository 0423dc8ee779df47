// src/api/page_collector.rs
//! Parallel collection of paginated OSF listings.
//!
//! Page 1 is fetched inline to learn the total; the remaining pages are split
//! into contiguous chunks, one tokio task per chunk. Each task walks its pages
//! in order and gives up at its first failure, keeping what it already has.
//! Chunk outputs are stitched back together by chunk index, so the final
//! order is page order no matter which task finishes first.

use super::fan_out::{partition_pages, run_chunks};
use super::responses::Resource;
use super::ResourceApi;
use crate::constants::{DEFAULT_NUM_WORKERS, MAX_NUM_WORKERS, OSF_API_PAGE_SIZE};
use crate::error::{AppError, FetchFailure};
use crate::types::{Guid, ResourceKind, ResourceRecord};
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Everything one collection call gathered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    /// Normalized records in page order.
    pub records: Vec<ResourceRecord>,
    /// Total reported by the API on page 1, if any.
    pub reported_total: Option<u64>,
    /// Pages that could not be fetched; each one ended its chunk early.
    pub failures: Vec<FetchFailure>,
}

impl Collected {
    /// Whether every page came back.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What a single chunk worker brings back.
#[derive(Debug, Default)]
struct ChunkOutcome {
    records: Vec<ResourceRecord>,
    failure: Option<FetchFailure>,
}

/// Fans page requests for one listing out across a bounded set of workers.
pub struct PageCollector {
    api: Arc<dyn ResourceApi>,
    num_workers: usize,
}

impl PageCollector {
    /// Creates a collector with the default worker count.
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        Self::with_workers(api, DEFAULT_NUM_WORKERS)
    }

    /// Creates a collector with a specific number of workers.
    pub fn with_workers(api: Arc<dyn ResourceApi>, num_workers: usize) -> Self {
        Self {
            api,
            num_workers: num_workers.clamp(1, MAX_NUM_WORKERS),
        }
    }

    /// Collects every page of `kind` under `subject`.
    ///
    /// Fetch failures never surface as `Err`; they are logged and listed in
    /// the result. `Err` means a worker task itself died.
    pub async fn collect(&self, kind: ResourceKind, subject: &Guid) -> Result<Collected, AppError> {
        let first = match self.api.fetch_page(kind, subject, 1).await {
            Ok(page) => page,
            Err(failure) => {
                log::warn!(
                    "{} page 1 request failed for {}: {}",
                    kind,
                    subject,
                    failure
                );
                return Ok(Collected {
                    failures: vec![failure],
                    ..Default::default()
                });
            }
        };

        let num_pages = page_count(first.total, first.last_page);
        let mut collected = Collected {
            records: normalize_page(kind, &first.items),
            reported_total: first.total,
            failures: Vec::new(),
        };

        log::debug!(
            "{} for {}: total {:?}, {} page(s), {} worker(s)",
            kind,
            subject,
            first.total,
            num_pages,
            self.num_workers
        );

        if num_pages <= 1 {
            return Ok(collected);
        }

        let chunks = partition_pages(2..=num_pages, self.num_workers);
        let outcomes = run_chunks(chunks, |_, pages| {
            let api = Arc::clone(&self.api);
            let subject = subject.clone();
            async move { fetch_chunk(api.as_ref(), kind, &subject, pages).await }
        })
        .await?;

        for outcome in outcomes {
            collected.records.extend(outcome.records);
            collected.failures.extend(outcome.failure);
        }

        if !collected.is_complete() {
            log::warn!(
                "{} for {}: collected {} of {:?} record(s), {} chunk(s) stopped early",
                kind,
                subject,
                collected.records.len(),
                collected.reported_total,
                collected.failures.len()
            );
        }

        Ok(collected)
    }
}

/// Number of pages a listing spans.
///
/// Uses the reported total when there is one, otherwise the `last` link's
/// page number, otherwise assumes the first page is all there is.
pub fn page_count(total: Option<u64>, last_page: Option<u32>) -> u32 {
    match (total, last_page) {
        (Some(total), _) => {
            let pages = total.div_ceil(OSF_API_PAGE_SIZE).max(1);
            u32::try_from(pages).unwrap_or(u32::MAX)
        }
        (None, Some(last)) => last.max(1),
        (None, None) => 1,
    }
}

/// Fetches `pages` in ascending order, stopping at the first failure.
async fn fetch_chunk(
    api: &dyn ResourceApi,
    kind: ResourceKind,
    subject: &Guid,
    pages: RangeInclusive<u32>,
) -> ChunkOutcome {
    let mut outcome = ChunkOutcome::default();

    for page in pages {
        match api.fetch_page(kind, subject, page).await {
            Ok(fetched) => outcome.records.extend(normalize_page(kind, &fetched.items)),
            Err(failure) => {
                log::warn!(
                    "{} page {} request failed for {}: {}",
                    kind,
                    page,
                    subject,
                    failure
                );
                outcome.failure = Some(failure);
                break;
            }
        }
    }

    outcome
}

fn normalize_page(kind: ResourceKind, items: &[Resource]) -> Vec<ResourceRecord> {
    items
        .iter()
        .filter_map(|item| {
            let record = normalize_resource(kind, item);
            if record.is_none() {
                log::debug!("Skipping {} item {} with no usable record", kind, item.id);
            }
            record
        })
        .collect()
}

/// Flattens one listing item to `(id, title, date)`.
///
/// Contributor entries describe a membership, so the record is taken from the
/// embedded user; an entry whose user did not embed yields nothing.
pub fn normalize_resource(kind: ResourceKind, item: &Resource) -> Option<ResourceRecord> {
    match kind {
        ResourceKind::Contributors => {
            let user = item.embedded("users")?.single()?;
            Some(ResourceRecord {
                id: user.id.clone(),
                title: user.attributes.full_name.clone().unwrap_or_default(),
                date: user.date_for(kind).map(str::to_string),
            })
        }
        ResourceKind::Nodes | ResourceKind::Registrations | ResourceKind::Preprints => {
            Some(ResourceRecord {
                id: item.id.clone(),
                title: item.attributes.title.clone().unwrap_or_default(),
                date: item.date_for(kind).map(str::to_string),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_from_total() {
        assert_eq!(page_count(Some(25), None), 3);
        assert_eq!(page_count(Some(20), None), 2);
        assert_eq!(page_count(Some(1), None), 1);
        assert_eq!(page_count(Some(0), None), 1);
    }

    #[test]
    fn test_page_count_prefers_total_over_last_link() {
        assert_eq!(page_count(Some(11), Some(9)), 2);
        assert_eq!(page_count(None, Some(4)), 4);
        assert_eq!(page_count(None, None), 1);
    }

    #[test]
    fn test_normalize_uses_kind_specific_date() {
        let json = r#"{
            "id": "p1",
            "type": "preprints",
            "attributes": {
                "title": "A preprint",
                "date_created": "2020-01-01",
                "date_published": "2020-02-02"
            }
        }"#;
        let item: Resource = serde_json::from_str(json).unwrap();
        let record = normalize_resource(ResourceKind::Preprints, &item).unwrap();
        assert_eq!(record.title, "A preprint");
        assert_eq!(record.date.as_deref(), Some("2020-02-02"));

        let record = normalize_resource(ResourceKind::Nodes, &item).unwrap();
        assert_eq!(record.date.as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn test_normalize_contributor_reads_embedded_user() {
        let json = r#"{
            "id": "api6f-u1abc",
            "type": "contributors",
            "embeds": {"users": {"data": {
                "id": "u1abc", "type": "users",
                "attributes": {"full_name": "Ada Lovelace", "date_registered": "2014-05-05"}
            }}}
        }"#;
        let item: Resource = serde_json::from_str(json).unwrap();
        let record = normalize_resource(ResourceKind::Contributors, &item).unwrap();
        assert_eq!(record.id.as_str(), "u1abc");
        assert_eq!(record.title, "Ada Lovelace");
        assert_eq!(record.date.as_deref(), Some("2014-05-05"));

        let orphan: Resource =
            serde_json::from_str(r#"{"id": "api6f-gone", "embeds": {"users": {"errors": [{"detail": "gone"}]}}}"#)
                .unwrap();
        assert!(normalize_resource(ResourceKind::Contributors, &orphan).is_none());
    }
}
