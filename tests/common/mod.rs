// tests/common/mod.rs
//! Fixture-backed `ResourceApi` for driving the crawl without a network.
//!
//! Every request is answered from a registered body through the same parsers
//! the HTTP client uses. Anything not registered answers 404.

#![allow(dead_code)]

use osf2graph::{
    parse_list_page, parse_single_resource, ApiResponse, FetchFailure, Guid, ResourceApi,
    ResourceKind,
};
use osf2graph::api::responses::{Page, Resource};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const USER_NODES_PAGE_1: &str = include_str!("../fixtures/osf/user_nodes_page1.json");
pub const USER_NODES_PAGE_2: &str = include_str!("../fixtures/osf/user_nodes_page2.json");
pub const USER_NODES_PAGE_3: &str = include_str!("../fixtures/osf/user_nodes_page3.json");
pub const USER_REGISTRATIONS_NO_TOTAL: &str =
    include_str!("../fixtures/osf/user_registrations_no_total.json");
pub const PROJECT_TREE: &str = include_str!("../fixtures/osf/project_tree.json");
pub const CHILDREN_PAGE_2: &str = include_str!("../fixtures/osf/children_page2.json");
pub const PROJECT_CONTRIBUTORS: &str = include_str!("../fixtures/osf/project_contributors_page1.json");
pub const USER_PROFILE: &str = include_str!("../fixtures/osf/user_profile.json");
pub const TEAM_TREE: &str = include_str!("../fixtures/osf/team_tree.json");
pub const TEAM_CONTRIBUTORS_PAGE_2: &str =
    include_str!("../fixtures/osf/team_contributors_page2.json");

pub const CHILDREN_PAGE_2_URL: &str = "https://api.osf.io/v2/nodes/api6f/children/?page=2";
pub const TEAM_CONTRIBUTORS_PAGE_2_URL: &str =
    "https://api.osf.io/v2/nodes/team7/contributors/?page=2";

const BASE: &str = "https://api.osf.io/v2";
const NOT_FOUND_BODY: &str = r#"{"errors": [{"detail": "Not found."}]}"#;

#[derive(Default)]
pub struct FixtureApi {
    pages: HashMap<(ResourceKind, String, u32), String>,
    trees: HashMap<String, String>,
    users: HashMap<String, String>,
    links: HashMap<String, String>,
    delays: HashMap<u32, Duration>,
    requests: Mutex<Vec<String>>,
}

impl FixtureApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, kind: ResourceKind, subject: &str, page: u32, body: impl Into<String>) -> Self {
        self.pages.insert((kind, subject.to_string(), page), body.into());
        self
    }

    pub fn with_tree(mut self, node: &str, body: impl Into<String>) -> Self {
        self.trees.insert(node.to_string(), body.into());
        self
    }

    pub fn with_user(mut self, user: &str, body: impl Into<String>) -> Self {
        self.users.insert(user.to_string(), body.into());
        self
    }

    pub fn with_link(mut self, url: &str, body: impl Into<String>) -> Self {
        self.links.insert(url.to_string(), body.into());
        self
    }

    /// Holds back every request for `page` so later pages finish first.
    pub fn with_page_delay(mut self, page: u32, delay: Duration) -> Self {
        self.delays.insert(page, delay);
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, url: String, body: Option<&String>) -> ApiResponse<String> {
        self.requests.lock().unwrap().push(url.clone());
        match body {
            Some(body) => ApiResponse {
                data: body.clone(),
                status: StatusCode::OK,
                url,
            },
            None => ApiResponse {
                data: NOT_FOUND_BODY.to_string(),
                status: StatusCode::NOT_FOUND,
                url,
            },
        }
    }
}

#[async_trait::async_trait]
impl ResourceApi for FixtureApi {
    async fn fetch_page(
        &self,
        kind: ResourceKind,
        subject: &Guid,
        page: u32,
    ) -> Result<Page<Resource>, FetchFailure> {
        if let Some(delay) = self.delays.get(&page) {
            tokio::time::sleep(*delay).await;
        }
        let url = format!(
            "{}/{}/{}/{}/?page={}",
            BASE,
            kind.subject_collection(),
            subject,
            kind.path(),
            page
        );
        let body = self.pages.get(&(kind, subject.to_string(), page));
        parse_list_page(&self.respond(url, body))
    }

    async fn fetch_project_tree(&self, node: &Guid) -> Result<Resource, FetchFailure> {
        let url = format!("{}/nodes/{}/?embed=children&embed=contributors", BASE, node);
        parse_single_resource(&self.respond(url, self.trees.get(node.as_str())))
    }

    async fn fetch_user(&self, user: &Guid) -> Result<Resource, FetchFailure> {
        let url = format!("{}/users/{}/", BASE, user);
        parse_single_resource(&self.respond(url, self.users.get(user.as_str())))
    }

    async fn follow(&self, next: &str) -> Result<Page<Resource>, FetchFailure> {
        parse_list_page(&self.respond(next.to_string(), self.links.get(next)))
    }
}

pub fn guid(s: &str) -> Guid {
    Guid::parse(s).unwrap()
}

/// The three user-nodes pages of a 25-item listing for user `u1`.
pub fn user_nodes_listing(api: FixtureApi) -> FixtureApi {
    api.with_page(ResourceKind::Nodes, "u1", 1, USER_NODES_PAGE_1)
        .with_page(ResourceKind::Nodes, "u1", 2, USER_NODES_PAGE_2)
        .with_page(ResourceKind::Nodes, "u1", 3, USER_NODES_PAGE_3)
}

/// A single-resource document for a project with the given contributors and
/// children, nothing paginated.
pub fn small_tree(node: &str, contributors: &[(&str, &str)], children: &[&str]) -> String {
    let contributors: Vec<serde_json::Value> = contributors
        .iter()
        .map(|(id, name)| {
            serde_json::json!({
                "id": format!("{}-{}", node, id),
                "type": "contributors",
                "embeds": {"users": {"data": {
                    "id": id,
                    "type": "users",
                    "attributes": {"full_name": name}
                }}}
            })
        })
        .collect();
    let children: Vec<serde_json::Value> = children
        .iter()
        .map(|id| serde_json::json!({"id": id, "type": "nodes", "attributes": {"title": id}}))
        .collect();

    serde_json::json!({
        "data": {
            "id": node,
            "type": "nodes",
            "attributes": {"title": node, "tags": []},
            "embeds": {
                "children": {
                    "data": children,
                    "links": {"next": null, "meta": {"total": children.len()}}
                },
                "contributors": {
                    "data": contributors,
                    "links": {"next": null, "meta": {"total": contributors.len()}}
                }
            }
        }
    })
    .to_string()
}
