//! # EduNet Authorization Engine
//!
//! Role-scoped access control and visibility resolution for the EduNet
//! franchise platform. Four organizational tiers (headquarters, master
//! franchisee, learning center, and teacher-trainer) share content whose
//! reach is governed by a visibility tier (PRIVATE/SHARED/PUBLIC) plus
//! explicit share lists, and operate scoped resources owned by a single
//! point in the HQ → MF → LC hierarchy.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use edunet_authz::{AccessEngine, EngineConfig, Principal};
//! use edunet_authz::directory::InMemoryDirectory;
//! use edunet_authz::scope::ListFilter;
//!
//! # async fn example() -> edunet_authz::Result<()> {
//! let directory = Arc::new(InMemoryDirectory::new());
//! let engine = AccessEngine::new(directory, EngineConfig::default());
//!
//! let principal = Principal::from_claims(42, "MF_ADMIN", 1, Some(5), None)?;
//! let predicate = engine
//!     .resolve_list_filter(&principal, ListFilter::default())
//!     .await?;
//! # let _ = predicate;
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod engine;
pub mod error;
pub mod scope;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use engine::{AccessEngine, EngineConfig, WriteOp, WritePolicy};
pub use error::{AccessError, OrgUnitKind, Result};
pub use scope::{Ancestry, ListFilter, OrgScope, ScopePredicate, ScopeResolver};
pub use types::{
    LearningGroup, OrgId, Principal, RecordId, SubProgram, Tier, UserId, Visibility,
};
