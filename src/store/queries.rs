// src/store/queries.rs
//! Read paths over the store used by the crawl orchestration and the graph
//! builder.

use super::Store;
use crate::error::AppError;
use crate::types::{Guid, NodeContributor, StaffStatus};
use rusqlite::params;
use serde::Serialize;

/// A user as the graph sees them: identity plus staff overlay.
///
/// `staff` is `None` for users with no row in the `staff` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: Guid,
    pub full_name: String,
    pub staff: Option<StaffStatus>,
}

impl Member {
    /// Whether the member counts as staff, current or former.
    pub fn is_staff(&self) -> bool {
        self.staff.is_some()
    }
}

impl Store {
    /// Every user joined with their staff flag, ordered by id.
    pub fn load_members(&self) -> Result<Vec<Member>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.full_name, s.current
               FROM users u
               LEFT JOIN staff s ON u.id = s.id
              ORDER BY u.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Member {
                id: row.get(0)?,
                full_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                staff: row.get::<_, Option<i64>>(2)?.map(StaffStatus::from_flag),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Contributor edges on projects that have at least one child, ordered by
    /// node then user.
    pub fn root_contributions(&self) -> Result<Vec<NodeContributor>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT user, node
               FROM node_contributors
              WHERE node IN (SELECT parent FROM node_relations)
              ORDER BY node, user",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(NodeContributor {
                user: row.get(0)?,
                node: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Nodes seen in some listing but never expanded: not a parent, not a
    /// child, and without any recorded contributor.
    pub fn unexplored_nodes(&self) -> Result<Vec<Guid>, AppError> {
        self.guid_column(
            "SELECT id
               FROM nodes
              WHERE id NOT IN (SELECT parent FROM node_relations)
                AND id NOT IN (SELECT child FROM node_relations)
                AND id NOT IN (SELECT node FROM node_contributors)
              ORDER BY id",
            [],
        )
    }

    /// Ids of users whose full name is exactly `full_name`.
    pub fn find_users_by_name(&self, full_name: &str) -> Result<Vec<Guid>, AppError> {
        self.guid_column(
            "SELECT id FROM users WHERE full_name = ?1 ORDER BY id",
            params![full_name],
        )
    }

    /// Current staff who are not contributors on `project`.
    pub fn current_staff_missing_from(&self, project: &Guid) -> Result<Vec<Guid>, AppError> {
        self.guid_column(
            "SELECT id
               FROM staff
              WHERE current = 1
                AND id NOT IN (SELECT user FROM node_contributors WHERE node = ?1)
              ORDER BY id",
            params![project],
        )
    }

    /// Staff with no row in `users`.
    pub fn staff_without_profiles(&self) -> Result<Vec<Guid>, AppError> {
        self.guid_column(
            "SELECT id FROM staff WHERE id NOT IN (SELECT id FROM users) ORDER BY id",
            [],
        )
    }

    fn guid_column<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Guid>, AppError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, Guid>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
