//! Error types for the authorization engine

use std::fmt;
use thiserror::Error;

use crate::types::Tier;

/// Org-unit kind named in an explicit-filter denial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgUnitKind {
    LearningCenter,
    MasterFranchisee,
}

impl fmt::Display for OrgUnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LearningCenter => write!(f, "LC"),
            Self::MasterFranchisee => write!(f, "MF"),
        }
    }
}

/// Authorization engine errors.
///
/// The taxonomy distinguishes configuration errors (the principal's
/// account data cannot form a scope, 400-class) from authorization
/// failures (well-formed but forbidden, 403-class) and from not-found
/// (404-class). Every ambiguous or unresolvable org relationship is
/// treated as denial.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Principal lacks an org id required for its tier
    #[error("{0} user missing organizational information")]
    MissingOrgContext(Tier),

    /// Malformed input, unrelated to authorization
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unrecognized role prefix
    #[error("Invalid user role")]
    InvalidRole { role: String },

    /// Explicitly requested org filter is outside the principal's scope
    #[error("Access denied to requested {0}")]
    OrgFilterDenied(OrgUnitKind),

    /// Record or operation is outside the principal's granted tier
    #[error("Access denied")]
    Denied,

    /// Operation reserved for specific tiers
    #[error("Only {actors} users can {verb} {resource}")]
    TierForbidden {
        actors: &'static str,
        verb: &'static str,
        resource: &'static str,
    },

    /// Resource id does not exist (raised after authorization)
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// Org-hierarchy lookup infrastructure failure
    #[error("Directory lookup failed: {0}")]
    Directory(String),

    /// Storage backend failure
    #[error("Store error: {0}")]
    Store(String),
}

impl AccessError {
    /// True for 400-class configuration/validation errors.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingOrgContext(_) | Self::InvalidInput(_)
        )
    }

    /// True for 403-class authorization failures.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::InvalidRole { .. }
                | Self::OrgFilterDenied(_)
                | Self::Denied
                | Self::TierForbidden { .. }
        )
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_vocabulary() {
        assert_eq!(
            AccessError::MissingOrgContext(Tier::Mf).to_string(),
            "MF user missing organizational information"
        );
        assert_eq!(
            AccessError::OrgFilterDenied(OrgUnitKind::LearningCenter).to_string(),
            "Access denied to requested LC"
        );
        assert_eq!(
            AccessError::OrgFilterDenied(OrgUnitKind::MasterFranchisee).to_string(),
            "Access denied to requested MF"
        );
        assert_eq!(AccessError::Denied.to_string(), "Access denied");
        assert_eq!(
            AccessError::TierForbidden {
                actors: "master franchisee or headquarters",
                verb: "create",
                resource: "subprograms",
            }
            .to_string(),
            "Only master franchisee or headquarters users can create subprograms"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(AccessError::MissingOrgContext(Tier::Lc).is_configuration());
        assert!(!AccessError::MissingOrgContext(Tier::Lc).is_denial());
        assert!(AccessError::Denied.is_denial());
        assert!(AccessError::InvalidRole {
            role: "XX".to_string()
        }
        .is_denial());
        assert!(!AccessError::NotFound {
            entity: "Subprogram",
            id: 1
        }
        .is_denial());
    }
}
