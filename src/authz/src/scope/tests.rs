//! Test suite for the scope module
//!
//! Covers:
//! - Per-tier predicate resolution
//! - Explicit lc/mf filter validation (fail-closed)
//! - TT public-only scoping
//! - Ancestry resolution
//! - Predicate idempotence

use super::*;
use crate::directory::{InMemoryDirectory, LearningCenter, MasterFranchisee, OrgDirectory};
use crate::error::{AccessError, OrgUnitKind};
use crate::types::{Principal, SubProgram, Visibility};
use std::sync::Arc;

// Hierarchy used throughout: HQ 1 → MF 5 → LCs {9, 10}; HQ 1 → MF 6 → LC 20.
async fn seeded_resolver() -> ScopeResolver {
    let dir = InMemoryDirectory::new();
    dir.put_master_franchisee(MasterFranchisee {
        id: 5,
        name: "MF North".to_string(),
        hq_id: 1,
    })
    .await;
    dir.put_master_franchisee(MasterFranchisee {
        id: 6,
        name: "MF South".to_string(),
        hq_id: 1,
    })
    .await;
    dir.put_learning_center(LearningCenter {
        id: 9,
        name: "LC Downtown".to_string(),
        mf_id: 5,
    })
    .await;
    dir.put_learning_center(LearningCenter {
        id: 10,
        name: "LC Uptown".to_string(),
        mf_id: 5,
    })
    .await;
    dir.put_learning_center(LearningCenter {
        id: 20,
        name: "LC Harbor".to_string(),
        mf_id: 6,
    })
    .await;
    ScopeResolver::new(Arc::new(dir) as Arc<dyn OrgDirectory>)
}

fn hq_principal() -> Principal {
    Principal::from_claims(1, "HQ_ADMIN", 1, None, None).unwrap()
}

fn mf_principal(mf_id: u64) -> Principal {
    Principal::from_claims(2, "MF_ADMIN", 1, Some(mf_id), None).unwrap()
}

fn lc_principal(lc_id: u64, mf_id: Option<u64>) -> Principal {
    Principal::from_claims(3, "LC_STAFF", 1, mf_id, Some(lc_id)).unwrap()
}

fn tt_principal() -> Principal {
    Principal::from_claims(4, "TT_TRAINER", 1, None, None).unwrap()
}

// ============================================================================
// HQ resolution
// ============================================================================

#[tokio::test]
async fn test_hq_unrestricted() {
    let resolver = seeded_resolver().await;
    let pred = resolver
        .resolve_list_filter(&hq_principal(), ListFilter::default())
        .await
        .unwrap();
    assert_eq!(pred.scope(), &OrgScope::Unrestricted);
}

#[tokio::test]
async fn test_hq_explicit_filters_honored_without_checks() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        lc_id: Some(20),
        mf_id: Some(6),
        status: Some("active".to_string()),
        ..Default::default()
    };
    let pred = resolver
        .resolve_list_filter(&hq_principal(), requested.clone())
        .await
        .unwrap();
    assert_eq!(pred.scope(), &OrgScope::Unrestricted);
    assert_eq!(pred.filter(), &requested);
}

// ============================================================================
// MF resolution
// ============================================================================

#[tokio::test]
async fn test_mf_scope_includes_own_learning_centers() {
    let resolver = seeded_resolver().await;
    let pred = resolver
        .resolve_list_filter(&mf_principal(5), ListFilter::default())
        .await
        .unwrap();
    match pred.scope() {
        OrgScope::MasterFranchisee { mf_id, lc_ids } => {
            assert_eq!(*mf_id, 5);
            assert_eq!(lc_ids.iter().copied().collect::<Vec<_>>(), vec![9, 10]);
        }
        other => panic!("expected MF scope, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mf_own_lc_filter_accepted() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        lc_id: Some(9),
        ..Default::default()
    };
    let pred = resolver
        .resolve_list_filter(&mf_principal(5), requested)
        .await
        .unwrap();
    assert_eq!(pred.filter().lc_id, Some(9));
}

#[tokio::test]
async fn test_mf_foreign_lc_filter_denied() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        lc_id: Some(20),
        ..Default::default()
    };
    let err = resolver
        .resolve_list_filter(&mf_principal(5), requested)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccessError::OrgFilterDenied(OrgUnitKind::LearningCenter)
    ));
}

#[tokio::test]
async fn test_mf_nonexistent_lc_filter_fails_closed() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        lc_id: Some(999),
        ..Default::default()
    };
    let err = resolver
        .resolve_list_filter(&mf_principal(5), requested)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccessError::OrgFilterDenied(OrgUnitKind::LearningCenter)
    ));
}

#[tokio::test]
async fn test_mf_foreign_mf_filter_denied() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        mf_id: Some(6),
        ..Default::default()
    };
    let err = resolver
        .resolve_list_filter(&mf_principal(5), requested)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccessError::OrgFilterDenied(OrgUnitKind::MasterFranchisee)
    ));
}

#[tokio::test]
async fn test_mf_scenario_program_filter_predicate() {
    // MF {mf_id: 5} requesting programId=12 with no explicit lc/mf:
    // predicate is programId=12 AND (mfId=5 OR PUBLIC OR (SHARED AND 5 ∈ sharedWithMFs))
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        program_id: Some(12),
        ..Default::default()
    };
    let pred = resolver
        .resolve_list_filter(&mf_principal(5), requested)
        .await
        .unwrap();

    let base = SubProgram {
        id: 1,
        program_id: 12,
        name: "Robotics".to_string(),
        status: "active".to_string(),
        pricing_model: None,
        mf_id: Some(5),
        created_by: 2,
        visibility: Visibility::Private,
        shared_with_mfs: Default::default(),
        shared_with_lcs: Default::default(),
        created_at: chrono::Utc::now(),
    };
    assert!(pred.allows_sub_program(&base));

    let foreign_shared = SubProgram {
        mf_id: Some(6),
        visibility: Visibility::Shared,
        shared_with_mfs: [5].into_iter().collect(),
        ..base.clone()
    };
    assert!(pred.allows_sub_program(&foreign_shared));

    let wrong_program = SubProgram {
        program_id: 13,
        ..base.clone()
    };
    assert!(!pred.allows_sub_program(&wrong_program));

    let foreign_private = SubProgram {
        mf_id: Some(6),
        ..base
    };
    assert!(!pred.allows_sub_program(&foreign_private));
}

// ============================================================================
// LC resolution
// ============================================================================

#[tokio::test]
async fn test_lc_scope_resolved_from_claims() {
    let resolver = seeded_resolver().await;
    let pred = resolver
        .resolve_list_filter(&lc_principal(9, Some(5)), ListFilter::default())
        .await
        .unwrap();
    assert_eq!(pred.scope(), &OrgScope::LearningCenter { lc_id: 9, mf_id: 5 });
}

#[tokio::test]
async fn test_lc_parent_mf_derived_from_directory() {
    // mf_id absent from claims; resolved through the LC record
    let resolver = seeded_resolver().await;
    let pred = resolver
        .resolve_list_filter(&lc_principal(9, None), ListFilter::default())
        .await
        .unwrap();
    assert_eq!(pred.scope(), &OrgScope::LearningCenter { lc_id: 9, mf_id: 5 });
}

#[tokio::test]
async fn test_lc_unresolvable_ancestry_is_configuration_error() {
    let resolver = seeded_resolver().await;
    // LC 99 has no directory record
    let err = resolver
        .resolve_list_filter(&lc_principal(99, None), ListFilter::default())
        .await
        .unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_lc_foreign_lc_filter_denied() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        lc_id: Some(10),
        ..Default::default()
    };
    let err = resolver
        .resolve_list_filter(&lc_principal(9, Some(5)), requested)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::Denied));
    assert_eq!(err.to_string(), "Access denied");
}

#[tokio::test]
async fn test_lc_own_filters_accepted() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        lc_id: Some(9),
        mf_id: Some(5),
        ..Default::default()
    };
    let pred = resolver
        .resolve_list_filter(&lc_principal(9, Some(5)), requested)
        .await
        .unwrap();
    assert_eq!(pred.scope(), &OrgScope::LearningCenter { lc_id: 9, mf_id: 5 });
}

#[tokio::test]
async fn test_lc_foreign_mf_filter_denied() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        mf_id: Some(6),
        ..Default::default()
    };
    let err = resolver
        .resolve_list_filter(&lc_principal(9, Some(5)), requested)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::Denied));
}

// ============================================================================
// TT resolution
// ============================================================================

#[tokio::test]
async fn test_tt_public_only_ignores_org_filters() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        lc_id: Some(9),
        mf_id: Some(5),
        status: Some("active".to_string()),
        ..Default::default()
    };
    let pred = resolver
        .resolve_list_filter(&tt_principal(), requested)
        .await
        .unwrap();
    assert_eq!(pred.scope(), &OrgScope::PublicOnly);
    // Org overrides dropped, non-org refinements kept
    assert_eq!(pred.filter().lc_id, None);
    assert_eq!(pred.filter().mf_id, None);
    assert_eq!(pred.filter().status.as_deref(), Some("active"));
}

// ============================================================================
// Ancestry resolution
// ============================================================================

#[tokio::test]
async fn test_resolve_ancestry() {
    let resolver = seeded_resolver().await;
    let ancestry = resolver.resolve_ancestry(9).await.unwrap();
    assert_eq!(
        ancestry,
        Ancestry {
            lc_id: 9,
            mf_id: 5,
            hq_id: 1
        }
    );
}

#[tokio::test]
async fn test_resolve_ancestry_missing_lc_fails_closed() {
    let resolver = seeded_resolver().await;
    let err = resolver.resolve_ancestry(999).await.unwrap_err();
    assert!(err.is_configuration());
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let resolver = seeded_resolver().await;
    let requested = ListFilter {
        program_id: Some(12),
        status: Some("active".to_string()),
        ..Default::default()
    };
    for principal in [hq_principal(), mf_principal(5), lc_principal(9, Some(5)), tt_principal()] {
        let first = resolver
            .resolve_list_filter(&principal, requested.clone())
            .await
            .unwrap();
        let second = resolver
            .resolve_list_filter(&principal, requested.clone())
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
