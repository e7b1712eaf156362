//! Access engine
//!
//! Orchestrates the scope resolver into the three request-time decisions:
//! list-filter resolution, single-record access, and write authorization.
//! Stateless per request; every decision is recomputed from the
//! principal's claims and fresh directory lookups.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::directory::OrgDirectory;
use crate::error::{AccessError, Result};
use crate::scope::{Ancestry, ListFilter, ScopePredicate, ScopeResolver};
use crate::types::{Principal, SubProgram, Tier, Visibility};

/// Write operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl WriteOp {
    fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Ownership requirement for subprogram update/delete.
///
/// The source system lets any MF or HQ account edit any subprogram;
/// `TierWide` preserves that. `OwnerOnly` restricts update/delete to the
/// record's creator (HQ exempt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    #[default]
    TierWide,
    OwnerOnly,
}

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub write_policy: WritePolicy,
}

/// Main access engine.
pub struct AccessEngine {
    resolver: ScopeResolver,
    config: EngineConfig,
}

impl AccessEngine {
    pub fn new(directory: Arc<dyn OrgDirectory>, config: EngineConfig) -> Self {
        Self {
            resolver: ScopeResolver::new(directory),
            config,
        }
    }

    /// The underlying scope resolver.
    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Resolves the access-restricting predicate for a list request.
    pub async fn resolve_list_filter(
        &self,
        principal: &Principal,
        requested: ListFilter,
    ) -> Result<ScopePredicate> {
        self.resolver.resolve_list_filter(principal, requested).await
    }

    /// Post-fetch access check for a single subprogram.
    ///
    /// Precedence, first match wins: HQ, creator, PUBLIC, SHARED
    /// allow-list. TT never matches the SHARED rule, even when its
    /// organization is on a share list.
    pub async fn authorize_record_access(
        &self,
        principal: &Principal,
        record: &SubProgram,
    ) -> Result<()> {
        if principal.tier == Tier::Hq {
            return Ok(());
        }
        if record.created_by == principal.user_id {
            return Ok(());
        }
        if record.visibility == Visibility::Public {
            return Ok(());
        }
        if record.visibility == Visibility::Shared && principal.tier != Tier::Tt {
            if let Some(mf_id) = principal.mf_id {
                if record.shared_with_mfs.contains(&mf_id) {
                    return Ok(());
                }
            }
            if let Some(lc_id) = principal.lc_id {
                if record.shared_with_lcs.contains(&lc_id) {
                    return Ok(());
                }
            }
            if principal.tier == Tier::Lc {
                let parent_mf = self.resolver.parent_mf_of(principal).await?;
                if record.shared_with_mfs.contains(&parent_mf) {
                    return Ok(());
                }
            }
        }

        debug!(
            user_id = principal.user_id,
            tier = %principal.tier,
            record_id = record.id,
            visibility = ?record.visibility,
            "subprogram access denied"
        );
        Err(AccessError::Denied)
    }

    /// Write authorization for subprograms.
    ///
    /// Create/update/delete are reserved for MF and HQ tiers. Under
    /// [`WritePolicy::OwnerOnly`], update/delete additionally require the
    /// principal to be the record's creator (HQ exempt).
    pub fn authorize_sub_program_write(
        &self,
        principal: &Principal,
        op: WriteOp,
        record: Option<&SubProgram>,
    ) -> Result<()> {
        if !matches!(principal.tier, Tier::Mf | Tier::Hq) {
            warn!(
                user_id = principal.user_id,
                tier = %principal.tier,
                op = op.verb(),
                "subprogram write denied by tier"
            );
            return Err(AccessError::TierForbidden {
                actors: "master franchisee or headquarters",
                verb: op.verb(),
                resource: "subprograms",
            });
        }

        if self.config.write_policy == WritePolicy::OwnerOnly
            && matches!(op, WriteOp::Update | WriteOp::Delete)
            && principal.tier != Tier::Hq
        {
            if let Some(record) = record {
                if record.created_by != principal.user_id {
                    warn!(
                        user_id = principal.user_id,
                        record_id = record.id,
                        op = op.verb(),
                        "subprogram write denied by ownership policy"
                    );
                    return Err(AccessError::Denied);
                }
            }
        }

        Ok(())
    }

    /// Write authorization for learning-group creation.
    ///
    /// Requires the exact sub-roles LC_ADMIN or LC_STAFF; a generic LC
    /// tier match is not enough. Learning groups have no update/delete
    /// path, so no further write rule exists.
    pub fn authorize_learning_group_create(&self, principal: &Principal) -> Result<()> {
        match principal.role.as_str() {
            "LC_ADMIN" | "LC_STAFF" => Ok(()),
            _ => {
                warn!(
                    user_id = principal.user_id,
                    role = %principal.role,
                    "learning group creation denied"
                );
                Err(AccessError::TierForbidden {
                    actors: "learning center staff",
                    verb: "create",
                    resource: "learning groups",
                })
            }
        }
    }

    /// Resolves the org scope a new learning group is stamped with.
    ///
    /// Derived from the creating principal's LC ancestry; callers never
    /// supply `mf_id`/`hq_id` themselves.
    pub async fn derive_group_ancestry(&self, principal: &Principal) -> Result<Ancestry> {
        let lc_id = principal.require_lc_id()?;
        self.resolver.resolve_ancestry(lc_id).await
    }
}
