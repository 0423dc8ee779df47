// src/types/records.rs
//! Row-shaped records, one type per table, plus the batches that carry them
//! from a crawl into the store.

use super::{Guid, StaffStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Guid,
    pub full_name: String,
    pub date_created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffFlag {
    pub id: Guid,
    pub status: StaffStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: Guid,
    pub title: String,
    pub institution: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub ongoing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Education {
    pub id: Guid,
    pub degree: String,
    pub institution: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub ongoing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Social {
    pub id: Guid,
    pub platform: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: Guid,
    pub title: String,
    pub date_created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRelation {
    pub parent: Guid,
    pub child: Guid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeContributor {
    pub user: Guid,
    pub node: Guid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeTag {
    pub node: Guid,
    pub tag: String,
}

/// One entry of a flat listing, normalized to `(id, title, date)`.
///
/// What `date` means depends on the listing: creation for nodes,
/// registration for registrations and contributors, publication for
/// preprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    pub id: Guid,
    pub title: String,
    pub date: Option<String>,
}

/// A user together with everything extracted from their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub socials: Vec<Social>,
    pub jobs: Vec<Job>,
    pub education: Vec<Education>,
}

/// Everything one project expansion produced, handed to the store as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProjectBatch {
    pub tags: Vec<NodeTag>,
    pub children: Vec<NodeRelation>,
    pub nodes: Vec<Node>,
    pub contributors: Vec<NodeContributor>,
    pub users: Vec<UserProfile>,
}

impl ProjectBatch {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.children.is_empty()
            && self.nodes.is_empty()
            && self.contributors.is_empty()
            && self.users.is_empty()
    }
}
