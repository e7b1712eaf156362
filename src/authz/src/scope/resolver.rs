//! Scope resolution
//!
//! Builds the per-request [`ScopePredicate`] from a principal's tier and
//! org claims, validating any explicit `lc_id`/`mf_id` overrides against
//! the org directory. Every decision is computed fresh from the claims and
//! fresh lookups; denials fail closed.

use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{ListFilter, OrgScope, ScopePredicate};
use crate::directory::OrgDirectory;
use crate::error::{AccessError, OrgUnitKind, Result};
use crate::types::{OrgId, Principal, Tier};

/// Resolved LC → MF → HQ parent chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ancestry {
    pub lc_id: OrgId,
    pub mf_id: OrgId,
    pub hq_id: OrgId,
}

/// Resolves principals and requested filters into scope predicates.
pub struct ScopeResolver {
    directory: Arc<dyn OrgDirectory>,
}

impl ScopeResolver {
    pub fn new(directory: Arc<dyn OrgDirectory>) -> Self {
        Self { directory }
    }

    /// Produces the access-restricting predicate for a list request.
    ///
    /// Pure function of (principal, requested filters, directory state):
    /// identical inputs yield an identical predicate.
    ///
    /// # Errors
    ///
    /// - [`AccessError::MissingOrgContext`] when the principal lacks the
    ///   org id its tier requires.
    /// - [`AccessError::OrgFilterDenied`] / [`AccessError::Denied`] when
    ///   an explicit `lc_id`/`mf_id` override is outside the principal's
    ///   scope, including when the requested LC does not exist.
    pub async fn resolve_list_filter(
        &self,
        principal: &Principal,
        requested: ListFilter,
    ) -> Result<ScopePredicate> {
        match principal.tier {
            Tier::Hq => {
                // HQ is unrestricted; explicit overrides are honored as-is.
                Ok(ScopePredicate::new(OrgScope::Unrestricted, requested))
            }
            Tier::Mf => self.resolve_mf_filter(principal, requested).await,
            Tier::Lc => self.resolve_lc_filter(principal, requested).await,
            Tier::Tt => {
                // TT sees PUBLIC content only; org overrides are irrelevant
                // for access and dropped entirely.
                let filter = ListFilter {
                    lc_id: None,
                    mf_id: None,
                    ..requested
                };
                Ok(ScopePredicate::new(OrgScope::PublicOnly, filter))
            }
        }
    }

    async fn resolve_mf_filter(
        &self,
        principal: &Principal,
        requested: ListFilter,
    ) -> Result<ScopePredicate> {
        let mf_id = principal.require_mf_id()?;

        if let Some(requested_mf) = requested.mf_id {
            if requested_mf != mf_id {
                warn!(
                    user_id = principal.user_id,
                    mf_id, requested_mf, "MF principal requested foreign MF filter"
                );
                return Err(AccessError::OrgFilterDenied(OrgUnitKind::MasterFranchisee));
            }
        }

        // The LC-ownership check and the own-LC listing are independent
        // point queries; run them concurrently and finalize the predicate
        // only once both complete.
        let (requested_lc, lc_ids) = tokio::try_join!(
            async {
                match requested.lc_id {
                    Some(lc_id) => self.directory.learning_center(lc_id).await.map(Some),
                    None => Ok(None),
                }
            },
            self.directory.learning_centers_of(mf_id),
        )?;

        if let Some(lookup) = requested_lc {
            match lookup {
                Some(lc) if lc.mf_id == mf_id => {}
                _ => {
                    warn!(
                        user_id = principal.user_id,
                        mf_id,
                        requested_lc = requested.lc_id,
                        "MF principal requested LC outside its franchise"
                    );
                    return Err(AccessError::OrgFilterDenied(OrgUnitKind::LearningCenter));
                }
            }
        }

        debug!(user_id = principal.user_id, mf_id, "resolved MF scope");
        Ok(ScopePredicate::new(
            OrgScope::MasterFranchisee {
                mf_id,
                lc_ids: lc_ids.into_iter().collect(),
            },
            requested,
        ))
    }

    async fn resolve_lc_filter(
        &self,
        principal: &Principal,
        requested: ListFilter,
    ) -> Result<ScopePredicate> {
        let lc_id = principal.require_lc_id()?;
        let mf_id = self.parent_mf_of(principal).await?;

        if let Some(requested_lc) = requested.lc_id {
            if requested_lc != lc_id {
                warn!(
                    user_id = principal.user_id,
                    lc_id, requested_lc, "LC principal requested foreign LC filter"
                );
                return Err(AccessError::Denied);
            }
        }
        if let Some(requested_mf) = requested.mf_id {
            if requested_mf != mf_id {
                warn!(
                    user_id = principal.user_id,
                    mf_id, requested_mf, "LC principal requested foreign MF filter"
                );
                return Err(AccessError::Denied);
            }
        }

        debug!(user_id = principal.user_id, lc_id, mf_id, "resolved LC scope");
        Ok(ScopePredicate::new(
            OrgScope::LearningCenter { lc_id, mf_id },
            requested,
        ))
    }

    /// Parent MF of an LC principal, from its claims or its LC record.
    ///
    /// An LC principal whose own ancestry cannot be resolved is broken
    /// account data, not a permissions outcome.
    pub async fn parent_mf_of(&self, principal: &Principal) -> Result<OrgId> {
        if let Some(mf_id) = principal.mf_id {
            return Ok(mf_id);
        }
        let lc_id = principal.require_lc_id()?;
        match self.directory.learning_center(lc_id).await? {
            Some(lc) => Ok(lc.mf_id),
            None => Err(AccessError::MissingOrgContext(Tier::Lc)),
        }
    }

    /// Resolves the LC → MF → HQ chain used to stamp a learning group's
    /// org scope at creation time.
    pub async fn resolve_ancestry(&self, lc_id: OrgId) -> Result<Ancestry> {
        let lc = self
            .directory
            .learning_center(lc_id)
            .await?
            .ok_or(AccessError::MissingOrgContext(Tier::Lc))?;

        let mf = self
            .directory
            .master_franchisee(lc.mf_id)
            .await?
            .ok_or_else(|| {
                AccessError::Directory(format!(
                    "master franchisee {} missing for learning center {}",
                    lc.mf_id, lc_id
                ))
            })?;

        Ok(Ancestry {
            lc_id,
            mf_id: mf.id,
            hq_id: mf.hq_id,
        })
    }
}
