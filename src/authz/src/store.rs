//! Resource storage seams
//!
//! The real database sits behind these traits; list queries accept the
//! opaque [`ScopePredicate`] produced by the resolver. The in-memory
//! implementations back the test suites and the demo server.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{AccessError, Result};
use crate::scope::ScopePredicate;
use crate::types::{LearningGroup, RecordId, SubProgram};

/// Subprogram storage trait
#[async_trait]
pub trait SubProgramStore: Send + Sync {
    /// Point lookup by id
    async fn get(&self, id: RecordId) -> Result<Option<SubProgram>>;

    /// Insert a new record; the store assigns the id
    async fn create(&self, sub_program: SubProgram) -> Result<SubProgram>;

    /// Replace an existing record
    async fn update(&self, sub_program: SubProgram) -> Result<SubProgram>;

    /// Delete by id
    async fn delete(&self, id: RecordId) -> Result<()>;

    /// List records passing the scope predicate, ordered by id
    async fn list(&self, predicate: &ScopePredicate) -> Result<Vec<SubProgram>>;
}

/// Learning-group storage trait
#[async_trait]
pub trait LearningGroupStore: Send + Sync {
    /// Point lookup by id
    async fn get(&self, id: RecordId) -> Result<Option<LearningGroup>>;

    /// Insert a new record; the store assigns the id
    async fn create(&self, group: LearningGroup) -> Result<LearningGroup>;

    /// List records passing the scope predicate, ordered by id
    async fn list(&self, predicate: &ScopePredicate) -> Result<Vec<LearningGroup>>;
}

/// In-memory subprogram store
pub struct InMemorySubProgramStore {
    records: Arc<RwLock<HashMap<RecordId, SubProgram>>>,
    next_id: AtomicU64,
}

impl InMemorySubProgramStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemorySubProgramStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubProgramStore for InMemorySubProgramStore {
    async fn get(&self, id: RecordId) -> Result<Option<SubProgram>> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn create(&self, mut sub_program: SubProgram) -> Result<SubProgram> {
        sub_program.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut records = self.records.write().await;
        records.insert(sub_program.id, sub_program.clone());
        Ok(sub_program)
    }

    async fn update(&self, sub_program: SubProgram) -> Result<SubProgram> {
        let mut records = self.records.write().await;
        if !records.contains_key(&sub_program.id) {
            return Err(AccessError::NotFound {
                entity: "Subprogram",
                id: sub_program.id,
            });
        }
        records.insert(sub_program.id, sub_program.clone());
        Ok(sub_program)
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        let mut records = self.records.write().await;
        records
            .remove(&id)
            .map(|_| ())
            .ok_or(AccessError::NotFound {
                entity: "Subprogram",
                id,
            })
    }

    async fn list(&self, predicate: &ScopePredicate) -> Result<Vec<SubProgram>> {
        let records = self.records.read().await;
        let mut matching: Vec<SubProgram> = records
            .values()
            .filter(|sp| predicate.allows_sub_program(sp))
            .cloned()
            .collect();
        matching.sort_by_key(|sp| sp.id);
        Ok(matching)
    }
}

/// In-memory learning-group store
pub struct InMemoryLearningGroupStore {
    records: Arc<RwLock<HashMap<RecordId, LearningGroup>>>,
    next_id: AtomicU64,
}

impl InMemoryLearningGroupStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryLearningGroupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LearningGroupStore for InMemoryLearningGroupStore {
    async fn get(&self, id: RecordId) -> Result<Option<LearningGroup>> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn create(&self, mut group: LearningGroup) -> Result<LearningGroup> {
        group.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut records = self.records.write().await;
        records.insert(group.id, group.clone());
        Ok(group)
    }

    async fn list(&self, predicate: &ScopePredicate) -> Result<Vec<LearningGroup>> {
        let records = self.records.read().await;
        let mut matching: Vec<LearningGroup> = records
            .values()
            .filter(|lg| predicate.allows_learning_group(lg))
            .cloned()
            .collect();
        matching.sort_by_key(|lg| lg.id);
        Ok(matching)
    }
}
