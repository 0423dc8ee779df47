// src/api/profile.rs
//! Profile extraction: pure functions from an OSF user resource to the
//! rows it contributes to `users`, `socials`, `jobs` and `education`, plus a
//! fetcher for users that no project listing has embedded yet.

use super::fan_out::{partition, run_chunks};
use super::responses::{HistoryEntry, Resource, ResourceAttributes, SocialValue};
use super::ResourceApi;
use crate::constants::{DEFAULT_NUM_WORKERS, MAX_NUM_WORKERS};
use crate::error::AppError;
use crate::types::{Education, Guid, Job, Social, User, UserProfile};
use serde_json::Value;
use std::sync::Arc;

/// Extracts a user and everything hanging off their profile.
pub fn extract_profile(user: &Resource) -> UserProfile {
    let attrs = &user.attributes;
    UserProfile {
        user: User {
            id: user.id.clone(),
            full_name: attrs.full_name.clone().unwrap_or_default(),
            date_created: attrs.date_registered.clone(),
        },
        socials: extract_socials(&user.id, attrs),
        jobs: extract_employment(&user.id, attrs),
        education: extract_education(&user.id, attrs),
    }
}

/// One record per non-blank social value; list values expand to one record
/// per non-blank entry.
pub fn extract_socials(id: &Guid, attrs: &ResourceAttributes) -> Vec<Social> {
    let mut socials = Vec::new();

    for (platform, value) in &attrs.social {
        let values: Vec<&str> = match value {
            SocialValue::One(handle) => vec![handle.as_str()],
            SocialValue::Many(handles) => handles.iter().map(String::as_str).collect(),
            SocialValue::Other(_) => Vec::new(),
        };

        socials.extend(
            values
                .into_iter()
                .filter_map(non_blank)
                .map(|name| Social {
                    id: id.clone(),
                    platform: platform.clone(),
                    name: name.to_string(),
                }),
        );
    }

    socials
}

/// Positions with both a title and an institution.
pub fn extract_employment(id: &Guid, attrs: &ResourceAttributes) -> Vec<Job> {
    attrs
        .employment
        .iter()
        .filter_map(|entry| {
            let (title, institution) = required_pair(entry.title.as_deref(), entry)?;
            let (start_year, end_year) = years(entry);
            Some(Job {
                id: id.clone(),
                title,
                institution,
                start_year,
                end_year,
                ongoing: entry.ongoing,
            })
        })
        .collect()
}

/// Degrees with both a degree name and an institution.
pub fn extract_education(id: &Guid, attrs: &ResourceAttributes) -> Vec<Education> {
    attrs
        .education
        .iter()
        .filter_map(|entry| {
            let (degree, institution) = required_pair(entry.degree.as_deref(), entry)?;
            let (start_year, end_year) = years(entry);
            Some(Education {
                id: id.clone(),
                degree,
                institution,
                start_year,
                end_year,
                ongoing: entry.ongoing,
            })
        })
        .collect()
}

/// Reads a year from a number or a numeric string.
pub fn parse_year(raw: &Value) -> Option<i32> {
    match raw {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn required_pair(label: Option<&str>, entry: &HistoryEntry) -> Option<(String, String)> {
    let label = label.and_then(non_blank)?;
    let institution = entry.institution.as_deref().and_then(non_blank)?;
    Some((label.to_string(), institution.to_string()))
}

/// Start and end year; an ongoing entry has no end.
fn years(entry: &HistoryEntry) -> (Option<i32>, Option<i32>) {
    let start = parse_year(&entry.start_year);
    let end = if entry.ongoing {
        None
    } else {
        parse_year(&entry.end_year)
    };
    (start, end)
}

/// Fetches user profiles one request per user, spread across workers.
pub struct ProfileFetcher {
    api: Arc<dyn ResourceApi>,
    num_workers: usize,
}

impl ProfileFetcher {
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        Self::with_workers(api, DEFAULT_NUM_WORKERS)
    }

    pub fn with_workers(api: Arc<dyn ResourceApi>, num_workers: usize) -> Self {
        Self {
            api,
            num_workers: num_workers.clamp(1, MAX_NUM_WORKERS),
        }
    }

    /// Profiles for `users`, in input order. Users whose request fails are
    /// logged and left out.
    pub async fn fetch_all(&self, users: Vec<Guid>) -> Result<Vec<UserProfile>, AppError> {
        let chunks = partition(users, self.num_workers);
        let per_chunk = run_chunks(chunks, |_, chunk: Vec<Guid>| {
            let api = Arc::clone(&self.api);
            async move {
                let mut profiles = Vec::with_capacity(chunk.len());
                for user in &chunk {
                    match api.fetch_user(user).await {
                        Ok(resource) => profiles.push(extract_profile(&resource)),
                        Err(failure) => log::warn!("user request failed for {}: {}", user, failure),
                    }
                }
                profiles
            }
        })
        .await?;

        Ok(per_chunk.into_iter().flatten().collect())
    }
}
