// src/pipeline.rs
//! Crawl orchestration: the phases that turn a seed project into a populated
//! store.
//!
//! Workers only fetch. Every phase gathers its results first and then writes
//! them through the one `Store` handle it was given.

use crate::api::{
    Collected, Expansion, PageCollector, ProfileFetcher, ProjectTreeExpander, ResourceApi,
};
use crate::error::AppError;
use crate::staff::StaffRoster;
use crate::store::Store;
use crate::types::{Guid, ResourceKind};
use std::ops::AddAssign;
use std::sync::Arc;

/// What a crawl phase did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Projects whose own request succeeded, partial or not.
    pub projects_expanded: usize,
    pub listings_collected: usize,
    pub profiles_fetched: usize,
    pub rows_written: usize,
    /// Requests that failed; each ended the listing or branch it belonged to.
    pub failures: usize,
}

impl AddAssign for CrawlReport {
    fn add_assign(&mut self, other: Self) {
        self.projects_expanded += other.projects_expanded;
        self.listings_collected += other.listings_collected;
        self.profiles_fetched += other.profiles_fetched;
        self.rows_written += other.rows_written;
        self.failures += other.failures;
    }
}

/// Drives collection, expansion and profile fetching against one API.
pub struct Crawler {
    collector: PageCollector,
    expander: ProjectTreeExpander,
    profiles: ProfileFetcher,
}

impl Crawler {
    pub fn new(api: Arc<dyn ResourceApi>, num_workers: usize) -> Self {
        Self {
            collector: PageCollector::with_workers(Arc::clone(&api), num_workers),
            expander: ProjectTreeExpander::with_workers(Arc::clone(&api), num_workers),
            profiles: ProfileFetcher::with_workers(api, num_workers),
        }
    }

    /// Expands the seed project, collects the requested listings, then
    /// expands every node the listings turned up.
    ///
    /// User-subject kinds are collected for each of the seed's contributors;
    /// `Contributors` is collected for the seed project itself.
    pub async fn seed(
        &self,
        store: &mut Store,
        project: &Guid,
        kinds: &[ResourceKind],
    ) -> Result<CrawlReport, AppError> {
        log::info!("Expanding seed project {}", project);
        let expansion = self.expander.expand(project).await;
        if expansion.batch.is_empty() {
            log::warn!("seed project {} produced no data", project);
        }

        let contributors: Vec<Guid> = expansion
            .batch
            .contributors
            .iter()
            .map(|c| c.user.clone())
            .collect();
        let mut report = self.apply_expansions(store, std::slice::from_ref(&expansion))?;

        for &kind in kinds {
            if kind == ResourceKind::Contributors {
                report += self.collect_into(store, kind, project).await?;
                continue;
            }
            for (ix, user) in contributors.iter().enumerate() {
                log::info!("Fetching {} for user {} - {}", kind, ix, user);
                report += self.collect_into(store, kind, user).await?;
            }
        }

        report += self.expand_unexplored(store).await?;
        Ok(report)
    }

    /// Collects every listing of `kind` for each user.
    pub async fn collect_user_resources(
        &self,
        store: &mut Store,
        users: &[Guid],
        kind: ResourceKind,
    ) -> Result<CrawlReport, AppError> {
        let mut report = CrawlReport::default();
        for (ix, user) in users.iter().enumerate() {
            log::info!("Fetching {} for user {} - {}", kind, ix, user);
            report += self.collect_into(store, kind, user).await?;
        }
        Ok(report)
    }

    /// Expands every stored node that is neither a parent, a child, nor has
    /// any contributor on record.
    pub async fn expand_unexplored(&self, store: &mut Store) -> Result<CrawlReport, AppError> {
        let nodes = store.unexplored_nodes()?;
        if nodes.is_empty() {
            log::info!("No unexplored nodes left");
            return Ok(CrawlReport::default());
        }

        log::info!("Expanding {} unexplored node(s)", nodes.len());
        let expansions = self.expander.expand_many(nodes).await?;
        let report = self.apply_expansions(store, &expansions)?;
        if report.failures > 0 {
            log::warn!(
                "{} of {} unexplored node(s) expanded, {} request(s) failed",
                report.projects_expanded,
                expansions.len(),
                report.failures
            );
        }
        Ok(report)
    }

    /// Loads the staff overlay and closes the gaps it reveals.
    ///
    /// Listed staff are flagged, former staff are matched by name, staff
    /// with no stored profile get one fetched, and current staff absent from
    /// `project` have their nodes collected and expanded.
    pub async fn fill_staff_gaps(
        &self,
        store: &mut Store,
        roster: &StaffRoster,
        project: &Guid,
    ) -> Result<CrawlReport, AppError> {
        let mut report = CrawlReport::default();

        report.rows_written += store.apply_staff(&roster.listed_flags())?;
        let by_name = roster.resolve_former_names(store)?;
        log::info!("Matched {} former staff member(s) by name", by_name.len());
        report.rows_written += store.apply_staff(&by_name)?;

        let unknown = store.staff_without_profiles()?;
        if !unknown.is_empty() {
            log::info!("Fetching {} staff profile(s) missing from the store", unknown.len());
            let requested = unknown.len();
            let profiles = self.profiles.fetch_all(unknown).await?;
            report.profiles_fetched += profiles.len();
            report.failures += requested - profiles.len();
            report.rows_written += store.apply_profiles(&profiles)?;
        }

        let missing = store.current_staff_missing_from(project)?;
        log::info!("{} current staff member(s) missing from {}", missing.len(), project);
        report += self
            .collect_user_resources(store, &missing, ResourceKind::Nodes)
            .await?;

        report += self.expand_unexplored(store).await?;
        Ok(report)
    }

    async fn collect_into(
        &self,
        store: &mut Store,
        kind: ResourceKind,
        subject: &Guid,
    ) -> Result<CrawlReport, AppError> {
        let Collected {
            records, failures, ..
        } = self.collector.collect(kind, subject).await?;
        Ok(CrawlReport {
            listings_collected: 1,
            rows_written: store.apply_resources(kind, &records)?,
            failures: failures.len(),
            ..Default::default()
        })
    }

    fn apply_expansions(
        &self,
        store: &mut Store,
        expansions: &[Expansion],
    ) -> Result<CrawlReport, AppError> {
        let mut report = CrawlReport::default();
        for expansion in expansions {
            if expansion.fetched {
                report.projects_expanded += 1;
            }
            report.failures += expansion.failures.len();
            report.rows_written += store.apply_batch(&expansion.batch)?;
        }
        Ok(report)
    }
}
