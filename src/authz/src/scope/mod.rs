//! Scope resolution and visibility filtering
//!
//! Given an authenticated principal and a requested filter set, this
//! module produces the access-restricting predicate a listing endpoint
//! attaches to its query: org-hierarchy membership for scoped resources,
//! and visibility-tier evaluation (PRIVATE/SHARED/PUBLIC plus share
//! lists) for shareable resources.

mod resolver;
mod types;

#[cfg(test)]
mod tests;

pub use resolver::{Ancestry, ScopeResolver};
pub use types::{ListFilter, OrgScope, ScopePredicate};
