//! Scope predicate types
//!
//! A [`ScopePredicate`] is the opaque filter object a listing endpoint
//! hands to its store: the org-scope portion derived from the principal's
//! tier, combined with the validated refinement filters from the request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{LearningGroup, OrgId, RecordId, SubProgram, Visibility};

/// Requested list filters, before scope validation.
///
/// `lc_id`/`mf_id` are explicit org overrides subject to per-tier
/// verification; the remaining fields are plain refinements applied to
/// every tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lc_id: Option<OrgId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mf_id: Option<OrgId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<RecordId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<String>,
}

/// Org-scope constraint derived from the principal's tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgScope {
    /// HQ: every record is visible
    Unrestricted,

    /// MF: own records plus content shared into the MF or any of its LCs.
    /// `lc_ids` is the set of learning centers under this MF, fetched
    /// during resolution.
    MasterFranchisee {
        mf_id: OrgId,
        lc_ids: BTreeSet<OrgId>,
    },

    /// LC: own scoped records plus content shared with the LC or its
    /// parent MF
    LearningCenter { lc_id: OrgId, mf_id: OrgId },

    /// TT: PUBLIC content only, org filters ignored
    PublicOnly,
}

/// Access-restricting predicate attached to a list query.
///
/// Stores treat this as opaque and apply [`allows_sub_program`] /
/// [`allows_learning_group`] row by row; a SQL backend would translate
/// the same structure into a WHERE clause.
///
/// [`allows_sub_program`]: ScopePredicate::allows_sub_program
/// [`allows_learning_group`]: ScopePredicate::allows_learning_group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePredicate {
    scope: OrgScope,
    filter: ListFilter,
}

impl ScopePredicate {
    pub(crate) fn new(scope: OrgScope, filter: ListFilter) -> Self {
        Self { scope, filter }
    }

    /// The org-scope portion of the predicate
    pub fn scope(&self) -> &OrgScope {
        &self.scope
    }

    /// The validated refinement filters
    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    /// Whether a subprogram row passes this predicate.
    pub fn allows_sub_program(&self, sp: &SubProgram) -> bool {
        self.org_allows_sub_program(sp) && self.refinements_allow_sub_program(sp)
    }

    /// Whether a learning-group row passes this predicate.
    pub fn allows_learning_group(&self, lg: &LearningGroup) -> bool {
        self.org_allows_learning_group(lg) && self.refinements_allow_learning_group(lg)
    }

    fn org_allows_sub_program(&self, sp: &SubProgram) -> bool {
        match &self.scope {
            OrgScope::Unrestricted => true,
            OrgScope::MasterFranchisee { mf_id, lc_ids } => {
                sp.mf_id == Some(*mf_id)
                    || sp.visibility == Visibility::Public
                    || (sp.visibility == Visibility::Shared
                        && (sp.shared_with_mfs.contains(mf_id)
                            || sp.shared_with_lcs.iter().any(|lc| lc_ids.contains(lc))))
            }
            OrgScope::LearningCenter { lc_id, mf_id } => {
                sp.visibility == Visibility::Public
                    || (sp.visibility == Visibility::Shared
                        && (sp.shared_with_lcs.contains(lc_id)
                            || sp.shared_with_mfs.contains(mf_id)))
            }
            OrgScope::PublicOnly => sp.visibility == Visibility::Public,
        }
    }

    fn org_allows_learning_group(&self, lg: &LearningGroup) -> bool {
        match &self.scope {
            OrgScope::Unrestricted => true,
            OrgScope::MasterFranchisee { mf_id, .. } => lg.mf_id == *mf_id,
            OrgScope::LearningCenter { lc_id, .. } => lg.lc_id == *lc_id,
            // Learning groups carry no visibility tier, so a public-only
            // scope matches none of them.
            OrgScope::PublicOnly => false,
        }
    }

    fn refinements_allow_sub_program(&self, sp: &SubProgram) -> bool {
        if let Some(program_id) = self.filter.program_id {
            if sp.program_id != program_id {
                return false;
            }
        }
        if let Some(mf_id) = self.filter.mf_id {
            if sp.mf_id != Some(mf_id) {
                return false;
            }
        }
        if let Some(status) = &self.filter.status {
            if &sp.status != status {
                return false;
            }
        }
        if let Some(pricing_model) = &self.filter.pricing_model {
            if sp.pricing_model.as_deref() != Some(pricing_model.as_str()) {
                return false;
            }
        }
        if let Some(search) = &self.filter.search {
            if !sp.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }

    fn refinements_allow_learning_group(&self, lg: &LearningGroup) -> bool {
        if let Some(lc_id) = self.filter.lc_id {
            if lg.lc_id != lc_id {
                return false;
            }
        }
        if let Some(mf_id) = self.filter.mf_id {
            if lg.mf_id != mf_id {
                return false;
            }
        }
        if let Some(status) = &self.filter.status {
            if &lg.status != status {
                return false;
            }
        }
        if let Some(search) = &self.filter.search {
            if !lg.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}
