//! Activation tests: partitioning, ownership cleanup, idempotence and
//! hidden holder recovery.

mod common;

use common::{
    HOLDER_TITLE, assert_partitioned, assert_unique_ownership, engine_with_tabs, ids,
    seeded_engine, tabs_of, workspace,
};
use tabspace::simulated::{OracleCall, OracleOp};
use tabspace::visibility::SkipReason;
use tabspace::{CoreError, GroupUpdate, Message, OracleError, VisibilityOutcome};
use tabspace_store::{GroupId, TabId, WorkspaceId};

// ============================================================================
// Switching workspaces
// ============================================================================

#[tokio::test]
async fn test_switch_hides_then_shows() {
    let (engine, browser) =
        seeded_engine(vec![workspace("a", &[10, 11]), workspace("b", &[20])], Some("a")).await;
    let mut rx = engine.bus.subscribe();

    let activation = engine
        .dispatcher
        .reconciler()
        .activate(&WorkspaceId::new("b"))
        .await
        .unwrap();

    assert_eq!(activation.plan.hide, ids(&[10, 11]));
    assert_eq!(activation.plan.show, ids(&[20]));
    assert!(activation.hide.is_applied());
    assert!(activation.show.is_applied());

    let holder = engine.repo.load_holder().await.unwrap().unwrap();
    assert_eq!(
        browser.calls(),
        vec![
            OracleCall::GroupTabs {
                tab_ids: ids(&[10, 11]),
                group: None,
            },
            OracleCall::UpdateGroup {
                group: holder,
                update: GroupUpdate {
                    title: Some(HOLDER_TITLE.to_string()),
                    collapsed: Some(true),
                },
            },
            OracleCall::Ungroup {
                tab_ids: ids(&[20]),
            },
        ]
    );

    let info = browser.group_info(holder).unwrap();
    assert_eq!(info.title.as_deref(), Some(HOLDER_TITLE));
    assert!(info.collapsed);

    assert_eq!(
        engine.repo.load_active().await.unwrap(),
        Some(WorkspaceId::new("b"))
    );
    assert_eq!(rx.try_recv().unwrap(), Message::Refresh);
}

#[tokio::test]
async fn test_partition_holds_across_workspaces() {
    let (engine, browser) = seeded_engine(
        vec![
            workspace("a", &[1, 2]),
            workspace("b", &[3]),
            workspace("c", &[4, 5, 6]),
        ],
        None,
    )
    .await;
    let reconciler = engine.dispatcher.reconciler();

    for target in ["c", "a", "b"] {
        reconciler.activate(&WorkspaceId::new(target)).await.unwrap();
        assert_partitioned(&engine, &browser, target).await;
    }
}

#[tokio::test]
async fn test_untracked_tabs_are_left_alone() {
    let (engine, browser) =
        seeded_engine(vec![workspace("a", &[1]), workspace("b", &[2])], Some("a")).await;
    browser.seed_tabs(&[50]);

    engine
        .dispatcher
        .reconciler()
        .activate(&WorkspaceId::new("b"))
        .await
        .unwrap();

    assert_eq!(browser.group_of(TabId(50)), None);
    for call in browser.calls() {
        let touched = match call {
            OracleCall::GroupTabs { tab_ids, .. } | OracleCall::Ungroup { tab_ids } => tab_ids,
            OracleCall::UpdateGroup { .. } => continue,
        };
        assert!(!touched.contains(&TabId(50)));
    }
}

#[tokio::test]
async fn test_activating_empty_workspace_hides_everything_else() {
    let (engine, browser) =
        seeded_engine(vec![workspace("a", &[1, 2]), workspace("empty", &[])], Some("a")).await;

    let activation = engine
        .dispatcher
        .reconciler()
        .activate(&WorkspaceId::new("empty"))
        .await
        .unwrap();

    assert_eq!(activation.show, VisibilityOutcome::Skipped(SkipReason::Empty));
    assert!(activation.hide.is_applied());
    assert!(browser.ungrouped_tabs().is_empty());
}

// ============================================================================
// Ownership cleanup
// ============================================================================

#[tokio::test]
async fn test_stale_tabs_pruned_on_activation() {
    let (engine, browser) = seeded_engine(vec![workspace("a", &[1, 2, 3])], None).await;
    browser.close_tab_silently(TabId(2));

    let activation = engine
        .dispatcher
        .reconciler()
        .activate(&WorkspaceId::new("a"))
        .await
        .unwrap();

    assert_eq!(activation.pruned, 1);
    assert_eq!(tabs_of(&engine, "a").await, ids(&[1, 3]));
    assert_eq!(
        browser.calls(),
        vec![OracleCall::Ungroup {
            tab_ids: ids(&[1, 3]),
        }]
    );
}

#[tokio::test]
async fn test_duplicate_tab_kept_by_later_workspace() {
    let (engine, browser) =
        seeded_engine(vec![workspace("a", &[1, 2]), workspace("b", &[2, 3])], None).await;

    engine
        .dispatcher
        .reconciler()
        .activate(&WorkspaceId::new("a"))
        .await
        .unwrap();

    assert_unique_ownership(&engine).await;
    assert_eq!(tabs_of(&engine, "a").await, ids(&[1]));
    assert_eq!(tabs_of(&engine, "b").await, ids(&[2, 3]));
    assert_partitioned(&engine, &browser, "a").await;
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_repeat_activation_is_stable() {
    let (engine, browser) = seeded_engine(
        vec![workspace("a", &[10, 11]), workspace("b", &[20])],
        Some("a"),
    )
    .await;
    let reconciler = engine.dispatcher.reconciler();
    let target = WorkspaceId::new("b");

    reconciler.activate(&target).await.unwrap();
    let model = engine.repo.load_workspaces().await.unwrap();
    let holder = engine.repo.load_holder().await.unwrap();
    let groups = browser.groups();
    let visible = browser.ungrouped_tabs();

    let again = reconciler.activate(&target).await.unwrap();
    assert_eq!(again.pruned, 0);
    assert_eq!(engine.repo.load_workspaces().await.unwrap(), model);
    assert_eq!(engine.repo.load_holder().await.unwrap(), holder);
    assert_eq!(browser.groups(), groups);
    assert_eq!(browser.ungrouped_tabs(), visible);
}

// ============================================================================
// Errors and degraded browser state
// ============================================================================

#[tokio::test]
async fn test_unknown_workspace_is_rejected() {
    let (engine, browser) = seeded_engine(vec![workspace("a", &[1])], Some("a")).await;
    let mut rx = engine.bus.subscribe();

    let result = engine
        .dispatcher
        .reconciler()
        .activate(&WorkspaceId::new("missing"))
        .await;

    assert!(matches!(result, Err(CoreError::UnknownWorkspace(_))));
    assert_eq!(
        engine.repo.load_active().await.unwrap(),
        Some(WorkspaceId::new("a"))
    );
    assert!(browser.calls().is_empty());
    assert_eq!(rx.try_recv().unwrap(), Message::Refresh);
}

#[tokio::test]
async fn test_tab_listing_failure_aborts_before_any_move() {
    let (engine, browser) =
        seeded_engine(vec![workspace("a", &[1]), workspace("b", &[2])], Some("a")).await;
    browser.fail_next(OracleOp::TabIds, OracleError::Other("busy".to_string()));

    let result = engine
        .dispatcher
        .reconciler()
        .activate(&WorkspaceId::new("b"))
        .await;

    assert!(matches!(result, Err(CoreError::Oracle(_))));
    assert!(browser.calls().is_empty());
    assert_eq!(
        engine.repo.load_active().await.unwrap(),
        Some(WorkspaceId::new("a"))
    );
}

#[tokio::test]
async fn test_no_focused_window_still_shows_target() {
    let (engine, browser) =
        seeded_engine(vec![workspace("a", &[1]), workspace("b", &[2])], Some("a")).await;
    browser.set_focused_window(false);

    let activation = engine
        .dispatcher
        .reconciler()
        .activate(&WorkspaceId::new("b"))
        .await
        .unwrap();

    assert_eq!(
        activation.hide,
        VisibilityOutcome::Skipped(SkipReason::NoFocusedWindow)
    );
    assert!(activation.show.is_applied());
    assert_eq!(engine.repo.load_holder().await.unwrap(), None);
    assert_eq!(
        engine.repo.load_active().await.unwrap(),
        Some(WorkspaceId::new("b"))
    );
}

// ============================================================================
// Hidden holder recovery
// ============================================================================

#[tokio::test]
async fn test_dangling_holder_cache_is_replaced() {
    let (engine, browser) = engine_with_tabs(&[5]);
    engine.repo.save_holder(GroupId(999)).await.unwrap();

    let outcome = engine.visibility.hide(&[TabId(5)]).await;

    assert!(outcome.is_applied());
    let holder = engine.repo.load_holder().await.unwrap().unwrap();
    assert_ne!(holder, GroupId(999));
    assert_eq!(browser.group_of(TabId(5)), Some(holder));
    assert_eq!(
        browser.group_info(holder).unwrap().title.as_deref(),
        Some(HOLDER_TITLE)
    );
}

#[tokio::test]
async fn test_holder_destroyed_by_user_is_recreated() {
    let (engine, browser) = seeded_engine(
        vec![workspace("a", &[1]), workspace("b", &[2]), workspace("c", &[3])],
        Some("a"),
    )
    .await;
    let reconciler = engine.dispatcher.reconciler();

    reconciler.activate(&WorkspaceId::new("b")).await.unwrap();
    let first = engine.repo.load_holder().await.unwrap().unwrap();
    browser.destroy_group(first);

    reconciler.activate(&WorkspaceId::new("c")).await.unwrap();
    let second = engine.repo.load_holder().await.unwrap().unwrap();
    assert_ne!(first, second);
    assert_partitioned(&engine, &browser, "c").await;
}

#[tokio::test]
async fn test_holder_vanishing_mid_hide_is_retried_once() {
    let (engine, browser) =
        seeded_engine(vec![workspace("a", &[1, 2]), workspace("b", &[3])], Some("a")).await;
    let reconciler = engine.dispatcher.reconciler();
    reconciler.activate(&WorkspaceId::new("b")).await.unwrap();
    let first = engine.repo.load_holder().await.unwrap().unwrap();

    browser.fail_next(OracleOp::GroupTabs, OracleError::GroupNotFound(first));
    reconciler.activate(&WorkspaceId::new("a")).await.unwrap();

    let second = engine.repo.load_holder().await.unwrap().unwrap();
    assert_ne!(first, second);
    assert_eq!(browser.group_of(TabId(3)), Some(second));
    assert_partitioned(&engine, &browser, "a").await;
}
