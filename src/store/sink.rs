// src/store/sink.rs
//! Idempotent writes into the store.
//!
//! Every list is written as `INSERT OR REPLACE` keyed by its table's declared
//! uniqueness, inside its own transaction. A batch that fails part-way leaves
//! the lists before the failure committed, and re-running any load is safe.

use super::Store;
use crate::error::AppError;
use crate::types::{
    Education, Job, Node, NodeContributor, NodeRelation, NodeTag, ProjectBatch, ResourceKind,
    ResourceRecord, Social, StaffFlag, User, UserProfile,
};
use rusqlite::{params, Statement};

/// A record that knows its own upsert statement.
trait Upsert {
    const TABLE: &'static str;
    const SQL: &'static str;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;
}

impl Upsert for NodeTag {
    const TABLE: &'static str = "node_tags";
    const SQL: &'static str = "INSERT OR REPLACE INTO node_tags(id, tag) VALUES (?1, ?2)";

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.node, self.tag])
    }
}

impl Upsert for NodeRelation {
    const TABLE: &'static str = "node_relations";
    const SQL: &'static str =
        "INSERT OR REPLACE INTO node_relations(parent, child) VALUES (?1, ?2)";

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.parent, self.child])
    }
}

impl Upsert for Node {
    const TABLE: &'static str = "nodes";
    const SQL: &'static str =
        "INSERT OR REPLACE INTO nodes(id, title, date_created) VALUES (?1, ?2, ?3)";

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.title, self.date_created])
    }
}

impl Upsert for NodeContributor {
    const TABLE: &'static str = "node_contributors";
    const SQL: &'static str =
        "INSERT OR REPLACE INTO node_contributors(user, node) VALUES (?1, ?2)";

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.user, self.node])
    }
}

impl Upsert for User {
    const TABLE: &'static str = "users";
    const SQL: &'static str =
        "INSERT OR REPLACE INTO users(id, full_name, date_created) VALUES (?1, ?2, ?3)";

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.full_name, self.date_created])
    }
}

impl Upsert for Social {
    const TABLE: &'static str = "socials";
    const SQL: &'static str =
        "INSERT OR REPLACE INTO socials(id, platform, name) VALUES (?1, ?2, ?3)";

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.platform, self.name])
    }
}

impl Upsert for Job {
    const TABLE: &'static str = "jobs";
    const SQL: &'static str = "INSERT OR REPLACE INTO jobs(id, title, institution, start_year, end_year, ongoing) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.title,
            self.institution,
            self.start_year,
            self.end_year,
            self.ongoing
        ])
    }
}

impl Upsert for Education {
    const TABLE: &'static str = "education";
    const SQL: &'static str = "INSERT OR REPLACE INTO education(id, degree, institution, start_year, end_year, ongoing) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.degree,
            self.institution,
            self.start_year,
            self.end_year,
            self.ongoing
        ])
    }
}

impl Upsert for StaffFlag {
    const TABLE: &'static str = "staff";
    const SQL: &'static str = "INSERT OR REPLACE INTO staff(id, current) VALUES (?1, ?2)";

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.status.as_flag()])
    }
}

impl Store {
    /// Writes one project expansion: tags, child edges, child nodes,
    /// contributor edges, then contributor profiles, each list committed on
    /// its own. An empty batch is a no-op.
    ///
    /// Returns the number of rows written.
    pub fn apply_batch(&mut self, batch: &ProjectBatch) -> Result<usize, AppError> {
        if batch.is_empty() {
            log::info!("no data in project batch, skipping");
            return Ok(0);
        }

        let mut written = self.replace_all(&batch.tags)?;
        written += self.replace_all(&batch.children)?;
        written += self.replace_all(&batch.nodes)?;
        written += self.replace_all(&batch.contributors)?;
        written += self.apply_profiles(&batch.users)?;
        Ok(written)
    }

    /// Writes users with their socials, jobs and education.
    pub fn apply_profiles(&mut self, profiles: &[UserProfile]) -> Result<usize, AppError> {
        let mut written = self.replace_all(profiles.iter().map(|p| &p.user))?;
        written += self.replace_all(profiles.iter().flat_map(|p| &p.socials))?;
        written += self.replace_all(profiles.iter().flat_map(|p| &p.jobs))?;
        written += self.replace_all(profiles.iter().flat_map(|p| &p.education))?;
        Ok(written)
    }

    /// Writes staff overlay flags.
    pub fn apply_staff(&mut self, flags: &[StaffFlag]) -> Result<usize, AppError> {
        self.replace_all(flags)
    }

    /// Writes a flat listing into the table its kind belongs to.
    pub fn apply_resources(
        &mut self,
        kind: ResourceKind,
        records: &[ResourceRecord],
    ) -> Result<usize, AppError> {
        if records.is_empty() {
            log::info!("no {} records to load, skipping", kind);
            return Ok(0);
        }

        let (table, sql) = match kind {
            ResourceKind::Nodes => (
                "nodes",
                "INSERT OR REPLACE INTO nodes(id, title, date_created) VALUES (?1, ?2, ?3)",
            ),
            ResourceKind::Contributors => (
                "users",
                "INSERT OR REPLACE INTO users(id, full_name, date_created) VALUES (?1, ?2, ?3)",
            ),
            ResourceKind::Registrations => (
                "registrations",
                "INSERT OR REPLACE INTO registrations(id, title, date_registered) VALUES (?1, ?2, ?3)",
            ),
            ResourceKind::Preprints => (
                "preprints",
                "INSERT OR REPLACE INTO preprints(id, title, date_published) VALUES (?1, ?2, ?3)",
            ),
        };

        self.replace_rows(table, sql, records, |r, stmt| {
            stmt.execute(params![r.id, r.title, r.date])
        })
    }

    fn replace_all<'r, R>(&mut self, rows: impl IntoIterator<Item = &'r R>) -> Result<usize, AppError>
    where
        R: Upsert + 'r,
    {
        self.replace_rows(R::TABLE, R::SQL, rows, R::bind)
    }

    /// Runs `sql` once per row inside one transaction.
    fn replace_rows<'r, R, F>(
        &mut self,
        table: &str,
        sql: &str,
        rows: impl IntoIterator<Item = &'r R>,
        bind: F,
    ) -> Result<usize, AppError>
    where
        R: 'r,
        F: Fn(&R, &mut Statement<'_>) -> rusqlite::Result<usize>,
    {
        let mut rows = rows.into_iter().peekable();
        if rows.peek().is_none() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare_cached(sql)?;
            for row in rows {
                bind(row, &mut *stmt)?;
                written += 1;
            }
        }
        tx.commit()?;

        log::debug!("Replaced {} row(s) in {}", written, table);
        Ok(written)
    }
}
