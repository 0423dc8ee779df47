// src/graph/mod.rs
//! Collaboration graph derived from the persisted store.
//!
//! Two members are tied by a project when both contribute to it. Each tie is
//! classified by how many of the pair are staff, and ties between the same two
//! members are aggregated by the number of distinct projects they share.

use crate::constants::STRONG_TIE_MIN_EXCLUSIVE;
use crate::error::AppError;
use crate::store::{Member, Store};
use crate::types::{Guid, NodeContributor};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// How a collaboration edge relates to the staff overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeClass {
    /// Both members are staff.
    Internal,
    /// Exactly one member is staff.
    Mixed,
    /// Neither member is staff.
    External,
}

impl EdgeClass {
    fn of(a_is_staff: bool, b_is_staff: bool) -> Self {
        match (a_is_staff, b_is_staff) {
            (true, true) => Self::Internal,
            (false, false) => Self::External,
            _ => Self::Mixed,
        }
    }
}

impl fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Internal => "internal",
            Self::Mixed => "mixed",
            Self::External => "external",
        };
        f.write_str(label)
    }
}

/// One pair of co-contributors on one project.
///
/// For mixed edges the staff member sits in `internal`. Otherwise the two
/// slots hold the pair in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollaborationEdge {
    pub internal: Guid,
    pub external: Guid,
    pub project: Guid,
    pub class: EdgeClass,
}

/// Edges between one pair of members, aggregated across projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TieSummary {
    pub internal: Guid,
    pub external: Guid,
    pub class: EdgeClass,
    pub shared_projects: usize,
}

impl TieSummary {
    pub fn is_strong(&self) -> bool {
        self.shared_projects > STRONG_TIE_MIN_EXCLUSIVE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollaborationGraph {
    pub members: Vec<Member>,
    pub edges: Vec<CollaborationEdge>,
}

impl CollaborationGraph {
    /// Edges aggregated by slot pair, in order of first appearance.
    pub fn ties(&self) -> Vec<TieSummary> {
        let mut grouped: IndexMap<(&Guid, &Guid), (EdgeClass, IndexSet<&Guid>)> = IndexMap::new();
        for edge in &self.edges {
            grouped
                .entry((&edge.internal, &edge.external))
                .or_insert_with(|| (edge.class, IndexSet::new()))
                .1
                .insert(&edge.project);
        }

        grouped
            .into_iter()
            .map(|((internal, external), (class, projects))| TieSummary {
                internal: internal.clone(),
                external: external.clone(),
                class,
                shared_projects: projects.len(),
            })
            .collect()
    }

    /// Ties backed by more than one shared project.
    pub fn strong_ties(&self) -> Vec<TieSummary> {
        self.ties().into_iter().filter(TieSummary::is_strong).collect()
    }

    /// Ties backed by at least `min_shared` projects.
    pub fn ties_with_at_least(&self, min_shared: usize) -> Vec<TieSummary> {
        self.ties()
            .into_iter()
            .filter(|tie| tie.shared_projects >= min_shared)
            .collect()
    }

    pub fn edges_of_class(&self, class: EdgeClass) -> impl Iterator<Item = &CollaborationEdge> {
        self.edges.iter().filter(move |edge| edge.class == class)
    }

    /// Snapshot of the graph for export, keeping ties with at least
    /// `min_shared` projects.
    pub fn export(&self, min_shared: usize) -> GraphExport<'_> {
        GraphExport {
            generated_at: Utc::now(),
            members: &self.members,
            ties: self.ties_with_at_least(min_shared),
        }
    }
}

/// Serializable view of a graph: members plus aggregated ties.
#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub generated_at: DateTime<Utc>,
    pub members: &'a [Member],
    pub ties: Vec<TieSummary>,
}

/// Reads members and root-project contributions from the store and derives
/// the graph.
pub fn build_collaboration_graph(store: &Store) -> Result<CollaborationGraph, AppError> {
    let members = store.load_members()?;
    let contributions = store.root_contributions()?;
    log::info!(
        "Deriving graph from {} member(s) and {} contribution(s)",
        members.len(),
        contributions.len()
    );
    Ok(derive_graph(members, &contributions))
}

/// Pairs every two distinct contributors of each project.
///
/// Projects are visited in order of first appearance and contributors within
/// a project in sorted order, so the output depends only on the input.
pub fn derive_graph(members: Vec<Member>, contributions: &[NodeContributor]) -> CollaborationGraph {
    let staff: HashSet<&Guid> = members
        .iter()
        .filter(|m| m.is_staff())
        .map(|m| &m.id)
        .collect();

    let mut by_project: IndexMap<&Guid, Vec<&Guid>> = IndexMap::new();
    for contribution in contributions {
        by_project
            .entry(&contribution.node)
            .or_default()
            .push(&contribution.user);
    }

    let mut edges = Vec::new();
    for (project, mut users) in by_project {
        users.sort();
        users.dedup();
        for (i, &a) in users.iter().enumerate() {
            for &b in &users[i + 1..] {
                edges.push(pair_edge(a, b, project, &staff));
            }
        }
    }

    log::debug!("Derived {} collaboration edge(s)", edges.len());
    CollaborationGraph { members, edges }
}

fn pair_edge(a: &Guid, b: &Guid, project: &Guid, staff: &HashSet<&Guid>) -> CollaborationEdge {
    let (a_staff, b_staff) = (staff.contains(a), staff.contains(b));
    let class = EdgeClass::of(a_staff, b_staff);
    let (internal, external) = if !a_staff && b_staff { (b, a) } else { (a, b) };
    CollaborationEdge {
        internal: internal.clone(),
        external: external.clone(),
        project: project.clone(),
        class,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StaffStatus;
    use pretty_assertions::assert_eq;

    fn guid(s: &str) -> Guid {
        Guid::parse(s).unwrap()
    }

    fn member(id: &str, staff: Option<StaffStatus>) -> Member {
        Member {
            id: guid(id),
            full_name: id.to_uppercase(),
            staff,
        }
    }

    fn contributed(user: &str, node: &str) -> NodeContributor {
        NodeContributor {
            user: guid(user),
            node: guid(node),
        }
    }

    fn slots(edge: &CollaborationEdge) -> (&str, &str, EdgeClass) {
        (edge.internal.as_str(), edge.external.as_str(), edge.class)
    }

    #[test]
    fn test_single_project_classification() {
        let members = vec![
            member("a", Some(StaffStatus::Current)),
            member("b", None),
            member("c", None),
        ];
        let contributions = vec![contributed("a", "p"), contributed("b", "p"), contributed("c", "p")];
        let graph = derive_graph(members, &contributions);

        let edges: Vec<_> = graph.edges.iter().map(slots).collect();
        assert_eq!(
            edges,
            vec![
                ("a", "b", EdgeClass::Mixed),
                ("a", "c", EdgeClass::Mixed),
                ("b", "c", EdgeClass::External),
            ]
        );
    }

    #[test]
    fn test_staff_takes_internal_slot() {
        let members = vec![member("a", None), member("z", Some(StaffStatus::Former))];
        let graph = derive_graph(members, &[contributed("a", "p"), contributed("z", "p")]);
        assert_eq!(slots(&graph.edges[0]), ("z", "a", EdgeClass::Mixed));
    }

    #[test]
    fn test_no_self_pairs_and_unknown_users_are_external() {
        let graph = derive_graph(
            vec![],
            &[contributed("x", "p"), contributed("x", "p"), contributed("y", "p")],
        );
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(slots(&graph.edges[0]), ("x", "y", EdgeClass::External));
        assert_eq!(graph.edges_of_class(EdgeClass::External).count(), 1);
    }

    #[test]
    fn test_ties_count_distinct_projects() {
        let members = vec![
            member("a", Some(StaffStatus::Current)),
            member("b", Some(StaffStatus::Current)),
            member("c", None),
        ];
        let contributions = vec![
            contributed("a", "p1"),
            contributed("b", "p1"),
            contributed("a", "p2"),
            contributed("b", "p2"),
            contributed("c", "p2"),
        ];
        let graph = derive_graph(members, &contributions);

        let ties = graph.ties();
        assert_eq!(ties.len(), 3);
        assert_eq!(ties[0].class, EdgeClass::Internal);
        assert_eq!(ties[0].shared_projects, 2);

        let strong = graph.strong_ties();
        assert_eq!(strong.len(), 1);
        assert_eq!(strong[0].internal.as_str(), "a");
        assert_eq!(strong[0].external.as_str(), "b");

        assert_eq!(graph.ties_with_at_least(1).len(), 3);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let members = vec![member("a", Some(StaffStatus::Current)), member("b", None)];
        let contributions = vec![contributed("b", "p"), contributed("a", "p")];
        let first = derive_graph(members.clone(), &contributions);
        let second = derive_graph(members, &contributions);
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_serializes_ties() {
        let graph = derive_graph(
            vec![member("a", Some(StaffStatus::Current))],
            &[contributed("a", "p"), contributed("b", "p")],
        );
        let value = serde_json::to_value(graph.export(1)).unwrap();
        assert_eq!(value["ties"][0]["class"], "mixed");
        assert_eq!(value["ties"][0]["shared_projects"], 1);
        assert_eq!(value["members"][0]["staff"], "current");
    }
}
