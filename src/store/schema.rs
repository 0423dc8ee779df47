// src/store/schema.rs
//! Table layout of the crawl store.
//!
//! Every table declares the uniqueness its records are keyed by, so a plain
//! `INSERT OR REPLACE` is an idempotent upsert. There are no foreign keys:
//! the crawl routinely records an edge before the row it points at.

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id           TEXT PRIMARY KEY,
    full_name    TEXT,
    date_created TEXT
);

CREATE TABLE IF NOT EXISTS staff (
    id      TEXT PRIMARY KEY,
    current INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS jobs (
    id          TEXT NOT NULL,
    title       TEXT NOT NULL,
    institution TEXT NOT NULL,
    start_year  INTEGER,
    end_year    INTEGER,
    ongoing     INTEGER NOT NULL,
    UNIQUE (id, title, institution)
);

CREATE TABLE IF NOT EXISTS education (
    id          TEXT NOT NULL,
    degree      TEXT NOT NULL,
    institution TEXT NOT NULL,
    start_year  INTEGER,
    end_year    INTEGER,
    ongoing     INTEGER NOT NULL,
    UNIQUE (id, degree, institution)
);

CREATE TABLE IF NOT EXISTS socials (
    id       TEXT NOT NULL,
    platform TEXT NOT NULL,
    name     TEXT NOT NULL,
    UNIQUE (id, platform, name)
);

CREATE TABLE IF NOT EXISTS nodes (
    id           TEXT PRIMARY KEY,
    title        TEXT,
    date_created TEXT
);

CREATE TABLE IF NOT EXISTS node_relations (
    parent TEXT NOT NULL,
    child  TEXT NOT NULL,
    UNIQUE (parent, child)
);

CREATE TABLE IF NOT EXISTS node_contributors (
    user TEXT NOT NULL,
    node TEXT NOT NULL,
    UNIQUE (user, node)
);

CREATE TABLE IF NOT EXISTS node_tags (
    id  TEXT NOT NULL,
    tag TEXT NOT NULL,
    UNIQUE (id, tag)
);

CREATE TABLE IF NOT EXISTS registrations (
    id              TEXT PRIMARY KEY,
    title           TEXT,
    date_registered TEXT
);

CREATE TABLE IF NOT EXISTS preprints (
    id             TEXT PRIMARY KEY,
    title          TEXT,
    date_published TEXT
);

CREATE INDEX IF NOT EXISTS idx_node_relations_child ON node_relations (child);
CREATE INDEX IF NOT EXISTS idx_node_contributors_node ON node_contributors (node);
CREATE INDEX IF NOT EXISTS idx_users_full_name ON users (full_name);
"#;

/// The tables of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Staff,
    Jobs,
    Education,
    Socials,
    Nodes,
    NodeRelations,
    NodeContributors,
    NodeTags,
    Registrations,
    Preprints,
}

impl Table {
    pub const ALL: [Table; 11] = [
        Table::Users,
        Table::Staff,
        Table::Jobs,
        Table::Education,
        Table::Socials,
        Table::Nodes,
        Table::NodeRelations,
        Table::NodeContributors,
        Table::NodeTags,
        Table::Registrations,
        Table::Preprints,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Staff => "staff",
            Table::Jobs => "jobs",
            Table::Education => "education",
            Table::Socials => "socials",
            Table::Nodes => "nodes",
            Table::NodeRelations => "node_relations",
            Table::NodeContributors => "node_contributors",
            Table::NodeTags => "node_tags",
            Table::Registrations => "registrations",
            Table::Preprints => "preprints",
        }
    }
}
