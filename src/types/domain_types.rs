// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Personal access token for OSF API authentication
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Create a new API token with validation
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();

        if token.is_empty() {
            return Err(ValidationError::InvalidApiToken {
                reason: "API token cannot be empty".to_string(),
            });
        }

        if token.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidApiToken {
                reason: "API token cannot contain whitespace".to_string(),
            });
        }

        Ok(Self(token))
    }

    /// Get the API token as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact token in display
        let visible: String = self.0.chars().take(4).collect();
        write!(f, "{}...", visible)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiToken({})", self)
    }
}

/// The listings the collector knows how to page through.
///
/// `Nodes`, `Registrations` and `Preprints` hang off a user; `Contributors`
/// (a project's memberships) hangs off a node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Nodes,
    Contributors,
    Registrations,
    Preprints,
}

impl ResourceKind {
    /// The collection the subject of this listing lives in.
    pub fn subject_collection(self) -> &'static str {
        match self {
            Self::Contributors => "nodes",
            Self::Nodes | Self::Registrations | Self::Preprints => "users",
        }
    }

    /// Path segment of the listing under its subject.
    pub fn path(self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Contributors => "contributors",
            Self::Registrations => "registrations",
            Self::Preprints => "preprints",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Staff overlay membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffStatus {
    Current,
    Former,
}

impl StaffStatus {
    /// Column value in the `staff` table.
    pub fn as_flag(self) -> i64 {
        match self {
            Self::Current => 1,
            Self::Former => 0,
        }
    }

    pub fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            Self::Former
        } else {
            Self::Current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_token_validation() {
        assert!(ApiToken::new("").is_err());
        assert!(ApiToken::new("abc def").is_err());
        let token = ApiToken::new("Xy12abcdefghijklmnop").unwrap();
        assert_eq!(token.as_str(), "Xy12abcdefghijklmnop");
    }

    #[test]
    fn test_api_token_is_redacted() {
        let token = ApiToken::new("Xy12abcdefghijklmnop").unwrap();
        assert_eq!(token.to_string(), "Xy12...");
        assert!(!format!("{:?}", token).contains("abcdefgh"));
    }

    #[test]
    fn test_resource_kind_routes() {
        assert_eq!(ResourceKind::Contributors.subject_collection(), "nodes");
        assert_eq!(ResourceKind::Preprints.subject_collection(), "users");
        assert_eq!(ResourceKind::Registrations.path(), "registrations");
    }

    #[test]
    fn test_staff_flag_round_trip() {
        assert_eq!(StaffStatus::from_flag(StaffStatus::Current.as_flag()), StaffStatus::Current);
        assert_eq!(StaffStatus::from_flag(StaffStatus::Former.as_flag()), StaffStatus::Former);
    }
}
