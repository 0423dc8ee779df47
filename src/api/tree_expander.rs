// src/api/tree_expander.rs
//! Expansion of one project into its tags, children and contributors.
//!
//! A single request asks for the project with `children` and `contributors`
//! embedded. Each embed is the first page of its listing; when the reported
//! total says there is more, `next` links are followed until they run out or
//! a request fails. A failure ends that listing only, and everything already
//! gathered is kept.

use super::fan_out::{partition, run_chunks};
use super::profile::extract_profile;
use super::responses::{Page, Resource};
use super::ResourceApi;
use crate::constants::{DEFAULT_NUM_WORKERS, MAX_NUM_WORKERS};
use crate::error::{AppError, FetchFailure};
use crate::types::{Guid, Node, NodeContributor, NodeRelation, NodeTag, ProjectBatch};
use std::sync::Arc;

/// What expanding one project produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    /// Rows gathered, possibly partial.
    pub batch: ProjectBatch,
    /// Whether the project itself was fetched.
    pub fetched: bool,
    /// Requests that failed; each ended the listing it belonged to.
    pub failures: Vec<FetchFailure>,
}

impl Expansion {
    /// Whether the project and every continuation page came back.
    pub fn is_complete(&self) -> bool {
        self.fetched && self.failures.is_empty()
    }
}

/// Expands projects into insert batches.
pub struct ProjectTreeExpander {
    api: Arc<dyn ResourceApi>,
    num_workers: usize,
}

impl ProjectTreeExpander {
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        Self::with_workers(api, DEFAULT_NUM_WORKERS)
    }

    /// Creates an expander whose `expand_many` uses `num_workers` tasks.
    pub fn with_workers(api: Arc<dyn ResourceApi>, num_workers: usize) -> Self {
        Self {
            api,
            num_workers: num_workers.clamp(1, MAX_NUM_WORKERS),
        }
    }

    /// Expands one project. A failed initial request yields an empty batch
    /// with that failure recorded.
    pub async fn expand(&self, node: &Guid) -> Expansion {
        expand_project(self.api.as_ref(), node).await
    }

    /// Expands many projects across the worker pool.
    ///
    /// Nodes are split into contiguous chunks, each chunk expanded in order by
    /// one task. Expansions come back in the order of `nodes`.
    pub async fn expand_many(&self, nodes: Vec<Guid>) -> Result<Vec<Expansion>, AppError> {
        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        log::info!(
            "Expanding {} project(s) across {} worker(s)",
            nodes.len(),
            self.num_workers.min(nodes.len())
        );

        let chunks = partition(nodes, self.num_workers);
        let per_chunk = run_chunks(chunks, |index, chunk: Vec<Guid>| {
            let api = Arc::clone(&self.api);
            async move {
                let mut expansions = Vec::with_capacity(chunk.len());
                for node in &chunk {
                    log::debug!("Worker {} expanding {}", index, node);
                    expansions.push(expand_project(api.as_ref(), node).await);
                }
                expansions
            }
        })
        .await?;

        Ok(per_chunk.into_iter().flatten().collect())
    }
}

async fn expand_project(api: &dyn ResourceApi, node: &Guid) -> Expansion {
    let project = match api.fetch_project_tree(node).await {
        Ok(project) => project,
        Err(failure) => {
            log::warn!("nodes request failed for {}: {}", node, failure);
            return Expansion {
                failures: vec![failure],
                ..Default::default()
            };
        }
    };

    let mut failures = Vec::new();
    let tags = project_tags(&project);

    let children = gather_embedded(api, &project, "children", &mut failures).await;
    let (children, nodes) = child_records(&project.id, children);

    let contributors = gather_embedded(api, &project, "contributors", &mut failures).await;
    let (contributors, users) = contributor_records(&project.id, contributors);

    Expansion {
        batch: ProjectBatch {
            tags,
            children,
            nodes,
            contributors,
            users,
        },
        fetched: true,
        failures,
    }
}

/// Tags straight off the project's attributes.
pub fn project_tags(project: &Resource) -> Vec<NodeTag> {
    project
        .attributes
        .tags
        .iter()
        .map(|tag| NodeTag {
            node: project.id.clone(),
            tag: tag.clone(),
        })
        .collect()
}

/// Collects every item of an embedded listing, following `next` links.
///
/// A failed continuation is pushed onto `failures` and ends the listing.
async fn gather_embedded(
    api: &dyn ResourceApi,
    project: &Resource,
    embed: &str,
    failures: &mut Vec<FetchFailure>,
) -> Vec<Resource> {
    let Some(embedded) = project.embedded(embed) else {
        log::warn!("missing embedded {} in response at {}", embed, project.id);
        return Vec::new();
    };

    let first: Page<Resource> = embedded.first_page();
    let reported = first.total.unwrap_or(first.items.len() as u64);
    let mut next = if reported > first.items.len() as u64 {
        first.next
    } else {
        None
    };
    let mut items = first.items;

    while let Some(link) = next.take() {
        match api.follow(&link).await {
            Ok(page) => {
                items.extend(page.items);
                next = page.next;
            }
            Err(failure) => {
                log::warn!("node {} request failed: {}", embed, failure);
                log::warn!("exiting node {} pagination requests for {}", embed, project.id);
                failures.push(failure);
            }
        }
    }

    if items.len() as u64 != reported {
        log::debug!(
            "{} of {}: gathered {} of {} reported",
            embed,
            project.id,
            items.len(),
            reported
        );
    }

    items
}

/// `(parent, child)` edges plus a node stub for every child.
pub fn child_records(parent: &Guid, children: Vec<Resource>) -> (Vec<NodeRelation>, Vec<Node>) {
    children
        .into_iter()
        .map(|child| {
            let relation = NodeRelation {
                parent: parent.clone(),
                child: child.id.clone(),
            };
            let node = Node {
                id: child.id,
                title: child.attributes.title.unwrap_or_default(),
                date_created: child.attributes.date_created,
            };
            (relation, node)
        })
        .unzip()
}

/// `(user, node)` edges plus the embedded user's profile for each contributor.
///
/// A contributor whose user did not embed (deactivated or hidden accounts)
/// is skipped.
pub fn contributor_records(
    node: &Guid,
    contributors: Vec<Resource>,
) -> (Vec<NodeContributor>, Vec<crate::types::UserProfile>) {
    contributors
        .iter()
        .filter_map(|contributor| {
            let Some(user) = contributor.embedded("users").and_then(|e| e.single()) else {
                log::warn!(
                    "missing embedded user for contributor {} on {}",
                    contributor.id,
                    node
                );
                return None;
            };
            let edge = NodeContributor {
                user: user.id.clone(),
                node: node.clone(),
            };
            Some((edge, extract_profile(user)))
        })
        .unzip()
}
