use super::ValidationError;
use regex::Regex;
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An OSF GUID, the opaque, globally unique identifier the API issues for
/// users, nodes, registrations and preprints alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(String);

impl Guid {
    /// Parses a bare GUID or an OSF URL ending in one
    /// (e.g. `https://osf.io/api6f/` or `https://api.osf.io/v2/nodes/api6f/`).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let cleaned = input.trim();

        if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
            return Self::extract_from_url(cleaned);
        }

        Self::validate(cleaned)
    }

    /// Wraps a value the API handed us. The API is the authority on its own
    /// identifiers, so no format check is applied.
    pub(crate) fn from_api(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the GUID as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(candidate: &str) -> Result<Self, ValidationError> {
        lazy_static::lazy_static! {
            static ref GUID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,63}$")
                .expect("Failed to compile GUID regex - this is a bug in the code");
        }

        if GUID_REGEX.is_match(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(ValidationError::InvalidId(format!(
                "Could not parse OSF GUID from: {}",
                candidate
            )))
        }
    }

    /// Takes the last non-empty path segment of an OSF URL.
    fn extract_from_url(url: &str) -> Result<Self, ValidationError> {
        let parsed = url::Url::parse(url).map_err(|e| ValidationError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let segment = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .ok_or_else(|| {
                ValidationError::InvalidId(format!("No GUID found in URL: {}", url))
            })?;

        Self::validate(segment)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Guid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_api(value))
    }
}

impl ToSql for Guid {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for Guid {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_parsing() {
        let id = Guid::parse("api6f").unwrap();
        assert_eq!(id.as_str(), "api6f");

        let id = Guid::parse("  api6f \n").unwrap();
        assert_eq!(id.as_str(), "api6f");

        let id = Guid::parse("https://osf.io/api6f/").unwrap();
        assert_eq!(id.as_str(), "api6f");

        let id = Guid::parse("https://api.osf.io/v2/nodes/api6f/?embed=children").unwrap();
        assert_eq!(id.as_str(), "api6f");

        let id = Guid::parse("abc12_v2").unwrap();
        assert_eq!(id.as_str(), "abc12_v2");
    }

    #[test]
    fn test_invalid_guids() {
        assert!(Guid::parse("").is_err());
        assert!(Guid::parse("has space").is_err());
        assert!(Guid::parse("https://osf.io/").is_err());
        assert!(Guid::parse("-leading").is_err());
    }

    #[test]
    fn test_guids_sort_lexically() {
        let mut ids = vec![Guid::from_api("c"), Guid::from_api("a"), Guid::from_api("b")];
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(Guid::as_str).collect();
        assert_eq!(sorted, vec!["a", "b", "c"]);
    }
}
