// src/staff.rs
//! The staff overlay: which users are current or former staff.
//!
//! A roster file lists current and former staff by GUID (or profile URL),
//! plus former staff known only by name. Names are resolved against users
//! already in the store; a name that matches nobody is skipped.

use crate::error::AppError;
use crate::store::Store;
use crate::types::{Guid, StaffFlag, StaffStatus};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    current: Vec<String>,
    #[serde(default)]
    former: Vec<String>,
    #[serde(default)]
    former_names: Vec<String>,
}

/// A parsed staff roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffRoster {
    pub current: Vec<Guid>,
    pub former: Vec<Guid>,
    pub former_names: Vec<String>,
}

impl StaffRoster {
    /// Loads a roster from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let file: RosterFile =
            serde_json::from_str(&content).map_err(|source| AppError::JsonParseError {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_file(file)
    }

    /// Parses a roster from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let file: RosterFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    fn from_file(file: RosterFile) -> Result<Self, AppError> {
        let parse_all = |raw: Vec<String>| -> Result<Vec<Guid>, AppError> {
            raw.iter()
                .map(|s| Guid::parse(s).map_err(AppError::from))
                .collect()
        };

        Ok(Self {
            current: parse_all(file.current)?,
            former: parse_all(file.former)?,
            former_names: file
                .former_names
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        })
    }

    /// Flags listed directly by id, current first.
    pub fn listed_flags(&self) -> Vec<StaffFlag> {
        let current = self.current.iter().map(|id| StaffFlag {
            id: id.clone(),
            status: StaffStatus::Current,
        });
        let former = self.former.iter().map(|id| StaffFlag {
            id: id.clone(),
            status: StaffStatus::Former,
        });
        current.chain(former).collect()
    }

    /// Former-staff flags for every user whose full name matches a listed
    /// name. Ids already listed directly keep their listed status.
    pub fn resolve_former_names(&self, store: &Store) -> Result<Vec<StaffFlag>, AppError> {
        let listed: HashSet<&Guid> = self.current.iter().chain(&self.former).collect();
        let mut flags = Vec::new();

        for name in &self.former_names {
            let matches = store.find_users_by_name(name)?;
            if matches.is_empty() {
                log::warn!("no stored user named {:?}, skipping", name);
                continue;
            }
            flags.extend(
                matches
                    .into_iter()
                    .filter(|id| !listed.contains(id))
                    .map(|id| StaffFlag {
                        id,
                        status: StaffStatus::Former,
                    }),
            );
        }

        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{User, UserProfile};

    #[test]
    fn test_roster_parses_ids_and_urls() {
        let roster = StaffRoster::from_json(
            r#"{"current": ["abc12", "https://osf.io/def34/"], "former_names": ["  Ada Lovelace ", ""]}"#,
        )
        .unwrap();
        assert_eq!(roster.current.len(), 2);
        assert_eq!(roster.current[1].as_str(), "def34");
        assert!(roster.former.is_empty());
        assert_eq!(roster.former_names, vec!["Ada Lovelace".to_string()]);
    }

    #[test]
    fn test_roster_rejects_bad_guid() {
        assert!(StaffRoster::from_json(r#"{"current": ["not a guid"]}"#).is_err());
    }

    #[test]
    fn test_listed_flags() {
        let roster = StaffRoster::from_json(r#"{"current": ["a1"], "former": ["b2"]}"#).unwrap();
        let flags = roster.listed_flags();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].status, StaffStatus::Current);
        assert_eq!(flags[1].id.as_str(), "b2");
        assert_eq!(flags[1].status, StaffStatus::Former);
    }

    #[test]
    fn test_former_names_resolve_against_store() {
        let mut store = Store::in_memory().unwrap();
        let profile = |id: &str, name: &str| UserProfile {
            user: User {
                id: Guid::parse(id).unwrap(),
                full_name: name.to_string(),
                date_created: None,
            },
            socials: vec![],
            jobs: vec![],
            education: vec![],
        };
        store
            .apply_profiles(&[profile("u1", "Ada"), profile("u2", "Grace"), profile("u3", "Grace")])
            .unwrap();

        let roster = StaffRoster::from_json(
            r#"{"current": ["u3"], "former_names": ["Grace", "Nobody"]}"#,
        )
        .unwrap();
        let flags = roster.resolve_former_names(&store).unwrap();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].id.as_str(), "u2");
        assert_eq!(flags[0].status, StaffStatus::Former);
    }
}
