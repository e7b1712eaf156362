//! Core authorization types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{AccessError, Result};

/// Organizational unit identifier (HQ, MF, or LC)
pub type OrgId = u64;

/// User account identifier
pub type UserId = u64;

/// Resource record identifier
pub type RecordId = u64;

/// Organizational tier, derived once from the role string prefix.
///
/// Role strings follow the `<TIER>_<SUBROLE>` convention
/// (e.g. `"MF_ADMIN"`, `"LC_STAFF"`, `"TT_TRAINER"`). The prefix before
/// the first underscore determines the tier; everything downstream of the
/// authentication boundary works with this enum instead of re-splitting
/// the raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    /// Headquarters (root of the org hierarchy)
    Hq,
    /// Master franchisee (regional)
    Mf,
    /// Learning center (local delivery site)
    Lc,
    /// Teacher-trainer (cross-cutting, public-only visibility)
    Tt,
}

impl Tier {
    /// Derives the tier from a full role string.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::InvalidRole`] for an unrecognized prefix.
    pub fn from_role(role: &str) -> Result<Self> {
        let prefix = role.split('_').next().unwrap_or("");
        match prefix {
            "HQ" => Ok(Self::Hq),
            "MF" => Ok(Self::Mf),
            "LC" => Ok(Self::Lc),
            "TT" => Ok(Self::Tt),
            _ => Err(AccessError::InvalidRole {
                role: role.to_string(),
            }),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Hq => "HQ",
            Self::Mf => "MF",
            Self::Lc => "LC",
            Self::Tt => "TT",
        };
        write!(f, "{}", code)
    }
}

/// Authenticated principal with token-derived org claims.
///
/// The authentication layer is trusted to have verified these claims;
/// this crate only interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User account id
    pub user_id: UserId,

    /// Full role string (e.g. "MF_ADMIN")
    pub role: String,

    /// Tier derived from the role prefix at construction time
    pub tier: Tier,

    /// Headquarters the account belongs to
    pub hq_id: OrgId,

    /// Master franchisee id (required for MF principals)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mf_id: Option<OrgId>,

    /// Learning center id (required for LC principals)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lc_id: Option<OrgId>,
}

impl Principal {
    /// Builds a principal from verified claims, deriving the tier and
    /// enforcing the per-tier org-id invariants.
    ///
    /// # Errors
    ///
    /// - [`AccessError::InvalidRole`] for an unrecognized role prefix.
    /// - [`AccessError::MissingOrgContext`] when an MF principal lacks
    ///   `mf_id` or an LC principal lacks `lc_id`.
    pub fn from_claims(
        user_id: UserId,
        role: impl Into<String>,
        hq_id: OrgId,
        mf_id: Option<OrgId>,
        lc_id: Option<OrgId>,
    ) -> Result<Self> {
        let role = role.into();
        let tier = Tier::from_role(&role)?;

        match tier {
            Tier::Mf if mf_id.is_none() => {
                return Err(AccessError::MissingOrgContext(tier));
            }
            Tier::Lc if lc_id.is_none() => {
                return Err(AccessError::MissingOrgContext(tier));
            }
            _ => {}
        }

        Ok(Self {
            user_id,
            role,
            tier,
            hq_id,
            mf_id,
            lc_id,
        })
    }

    /// Returns the principal's MF id or the tier's configuration error.
    pub fn require_mf_id(&self) -> Result<OrgId> {
        self.mf_id
            .ok_or(AccessError::MissingOrgContext(self.tier))
    }

    /// Returns the principal's LC id or the tier's configuration error.
    pub fn require_lc_id(&self) -> Result<OrgId> {
        self.lc_id
            .ok_or(AccessError::MissingOrgContext(self.tier))
    }
}

/// Visibility tier for shareable resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    /// Creator and HQ only; share lists are ignored
    #[default]
    Private,
    /// Explicit allow-list of MF/LC ids
    Shared,
    /// Visible to every tier; share lists are ignored
    Public,
}

/// Subprogram: shareable content distributed across franchise tiers.
///
/// Owned by an MF (or by HQ when `mf_id` is `None`), with a visibility
/// tier and explicit share lists consulted only when `SHARED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubProgram {
    pub id: RecordId,

    /// Parent program
    pub program_id: RecordId,

    pub name: String,

    /// Lifecycle status (e.g. "active", "archived")
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<String>,

    /// Owning master franchisee; `None` for HQ-owned subprograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mf_id: Option<OrgId>,

    /// User that created the record; retains access regardless of the
    /// current visibility setting
    pub created_by: UserId,

    pub visibility: Visibility,

    /// MF ids granted access when visibility is SHARED
    #[serde(default)]
    pub shared_with_mfs: BTreeSet<OrgId>,

    /// LC ids granted access when visibility is SHARED
    #[serde(default)]
    pub shared_with_lcs: BTreeSet<OrgId>,

    pub created_at: DateTime<Utc>,
}

/// Learning group: scoped to exactly one (LC, MF, HQ) triple.
///
/// The `mf_id`/`hq_id` pair is captured from the creating LC's ancestry
/// at creation time and never re-derived afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningGroup {
    pub id: RecordId,

    pub name: String,

    /// Lifecycle status (e.g. "active", "completed")
    pub status: String,

    /// Learning center that owns the group
    pub lc_id: OrgId,

    /// MF ancestor captured at creation
    pub mf_id: OrgId,

    /// HQ ancestor captured at creation
    pub hq_id: OrgId,

    pub created_by: UserId,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_role() {
        assert_eq!(Tier::from_role("HQ_ADMIN").unwrap(), Tier::Hq);
        assert_eq!(Tier::from_role("MF_ADMIN").unwrap(), Tier::Mf);
        assert_eq!(Tier::from_role("LC_STAFF").unwrap(), Tier::Lc);
        assert_eq!(Tier::from_role("TT_TRAINER").unwrap(), Tier::Tt);
    }

    #[test]
    fn test_tier_from_unknown_role() {
        let err = Tier::from_role("XX_THING").unwrap_err();
        assert!(matches!(err, AccessError::InvalidRole { .. }));
        assert_eq!(err.to_string(), "Invalid user role");
    }

    #[test]
    fn test_principal_invariants() {
        // MF principal requires mf_id
        let err = Principal::from_claims(1, "MF_ADMIN", 1, None, None).unwrap_err();
        assert!(matches!(err, AccessError::MissingOrgContext(Tier::Mf)));
        assert_eq!(
            err.to_string(),
            "MF user missing organizational information"
        );

        // LC principal requires lc_id
        let err = Principal::from_claims(1, "LC_STAFF", 1, Some(5), None).unwrap_err();
        assert!(matches!(err, AccessError::MissingOrgContext(Tier::Lc)));

        // HQ principal needs neither
        let p = Principal::from_claims(1, "HQ_ADMIN", 1, None, None).unwrap();
        assert_eq!(p.tier, Tier::Hq);
    }

    #[test]
    fn test_principal_valid_lc() {
        let p = Principal::from_claims(42, "LC_ADMIN", 1, Some(5), Some(9)).unwrap();
        assert_eq!(p.tier, Tier::Lc);
        assert_eq!(p.require_lc_id().unwrap(), 9);
        assert_eq!(p.require_mf_id().unwrap(), 5);
    }

    #[test]
    fn test_visibility_serde() {
        let json = serde_json::to_string(&Visibility::Shared).unwrap();
        assert_eq!(json, "\"SHARED\"");
        let back: Visibility = serde_json::from_str("\"PUBLIC\"").unwrap();
        assert_eq!(back, Visibility::Public);
    }
}
