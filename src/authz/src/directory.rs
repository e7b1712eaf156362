//! Org-hierarchy directory lookups
//!
//! The persistence layer behind the hierarchy is an external collaborator;
//! this module defines the read-only point-lookup contract the resolver
//! needs (LC → parent MF, MF → parent HQ, LCs under an MF) plus an
//! in-memory implementation used by tests and the demo server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::OrgId;

/// Learning center directory record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningCenter {
    pub id: OrgId,
    pub name: String,
    /// Parent master franchisee; every LC belongs to exactly one MF
    pub mf_id: OrgId,
}

/// Master franchisee directory record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterFranchisee {
    pub id: OrgId,
    pub name: String,
    /// Parent headquarters; every MF belongs to exactly one HQ
    pub hq_id: OrgId,
}

/// Org-hierarchy directory trait
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// Point lookup of a learning center by id
    async fn learning_center(&self, id: OrgId) -> Result<Option<LearningCenter>>;

    /// Point lookup of a master franchisee by id
    async fn master_franchisee(&self, id: OrgId) -> Result<Option<MasterFranchisee>>;

    /// Ids of all learning centers under a master franchisee
    async fn learning_centers_of(&self, mf_id: OrgId) -> Result<Vec<OrgId>>;
}

/// In-memory directory implementation
pub struct InMemoryDirectory {
    learning_centers: Arc<RwLock<HashMap<OrgId, LearningCenter>>>,
    master_franchisees: Arc<RwLock<HashMap<OrgId, MasterFranchisee>>>,
}

impl InMemoryDirectory {
    /// Create a new empty directory
    pub fn new() -> Self {
        Self {
            learning_centers: Arc::new(RwLock::new(HashMap::new())),
            master_franchisees: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a master franchisee
    pub async fn put_master_franchisee(&self, mf: MasterFranchisee) {
        let mut mfs = self.master_franchisees.write().await;
        mfs.insert(mf.id, mf);
    }

    /// Register a learning center
    pub async fn put_learning_center(&self, lc: LearningCenter) {
        let mut lcs = self.learning_centers.write().await;
        lcs.insert(lc.id, lc);
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrgDirectory for InMemoryDirectory {
    async fn learning_center(&self, id: OrgId) -> Result<Option<LearningCenter>> {
        let lcs = self.learning_centers.read().await;
        Ok(lcs.get(&id).cloned())
    }

    async fn master_franchisee(&self, id: OrgId) -> Result<Option<MasterFranchisee>> {
        let mfs = self.master_franchisees.read().await;
        Ok(mfs.get(&id).cloned())
    }

    async fn learning_centers_of(&self, mf_id: OrgId) -> Result<Vec<OrgId>> {
        let lcs = self.learning_centers.read().await;
        let mut ids: Vec<OrgId> = lcs
            .values()
            .filter(|lc| lc.mf_id == mf_id)
            .map(|lc| lc.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
