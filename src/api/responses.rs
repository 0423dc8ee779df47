// src/api/responses.rs
//! JSON:API document shapes returned by the OSF v2 API.
//!
//! Only the fields the crawl reads are modelled. Everything is lenient:
//! OSF happily returns `null` where a list or object would be expected, and
//! a missing attribute is a shape question for the caller to answer, not a
//! reason to reject the whole document.

use crate::types::{Guid, ResourceKind};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// Treats an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Absolute URL of the next page, `None` on the last page.
    pub next: Option<String>,
    /// Total item count across all pages, when the API reports it.
    pub total: Option<u64>,
    /// Page number of the `last` link, when present.
    pub last_page: Option<u32>,
}

/// A JSON:API resource object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resource {
    pub id: Guid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: ResourceAttributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub embeds: IndexMap<String, Embedded>,
}

impl Resource {
    /// Looks up an embedded sub-resource by name.
    pub fn embedded(&self, name: &str) -> Option<&Embedded> {
        self.embeds.get(name)
    }

    /// The date attribute that matters for `kind`.
    pub fn date_for(&self, kind: ResourceKind) -> Option<&str> {
        let attrs = &self.attributes;
        match kind {
            ResourceKind::Nodes => attrs.date_created.as_deref(),
            ResourceKind::Contributors | ResourceKind::Registrations => {
                attrs.date_registered.as_deref()
            }
            ResourceKind::Preprints => attrs.date_published.as_deref(),
        }
    }
}

/// The union of attributes read from nodes, users, registrations and preprints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResourceAttributes {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_registered: Option<String>,
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social: IndexMap<String, SocialValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employment: Vec<HistoryEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<HistoryEntry>,
}

/// A social profile value: a handle, a list of handles/URLs, or something
/// the API sent that we do not understand.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SocialValue {
    Many(Vec<String>),
    One(String),
    Other(serde_json::Value),
}

/// An employment or education entry from a user profile.
///
/// Years arrive as numbers, numeric strings or empty strings depending on
/// how the profile was edited, so they stay raw until extraction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub start_year: serde_json::Value,
    #[serde(default)]
    pub end_year: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ongoing: bool,
}

/// An embedded relationship: either a first page of a list or a single resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Embedded {
    #[serde(default)]
    pub data: Option<EmbeddedData>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: PageLinks,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EmbeddedData {
    Many(Vec<Resource>),
    One(Box<Resource>),
}

impl Embedded {
    /// The embedded single resource, if this embed holds one.
    pub fn single(&self) -> Option<&Resource> {
        match &self.data {
            Some(EmbeddedData::One(resource)) => Some(resource),
            _ => None,
        }
    }

    /// The embedded list viewed as the first page of its listing.
    pub fn first_page(&self) -> Page<Resource> {
        let items = match &self.data {
            Some(EmbeddedData::Many(items)) => items.clone(),
            Some(EmbeddedData::One(item)) => vec![(**item).clone()],
            None => Vec::new(),
        };
        Page {
            items,
            next: self.links.next.clone(),
            total: self.links.meta.as_ref().and_then(|m| m.total),
            last_page: self.links.last_page(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl PageLinks {
    /// Page number carried by the `last` link's `page` query parameter.
    pub fn last_page(&self) -> Option<u32> {
        lazy_static::lazy_static! {
            static ref PAGE_PARAM: regex::Regex = regex::Regex::new(r"[?&]page=([0-9]+)")
                .expect("Failed to compile page parameter regex - this is a bug in the code");
        }

        let last = self.last.as_deref()?;
        PAGE_PARAM
            .captures(last)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: Option<u64>,
}

/// Top-level document of a listing request.
#[derive(Debug, Clone, Deserialize)]
pub struct ListDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Resource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: PageLinks,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl ListDocument {
    pub fn into_page(self) -> Page<Resource> {
        let total = self
            .links
            .meta
            .as_ref()
            .and_then(|m| m.total)
            .or_else(|| self.meta.as_ref().and_then(|m| m.total));
        let last_page = self.links.last_page();
        Page {
            items: self.data,
            next: self.links.next,
            total,
            last_page,
        }
    }
}

/// Top-level document of a single-resource request.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleDocument {
    pub data: Resource,
}
