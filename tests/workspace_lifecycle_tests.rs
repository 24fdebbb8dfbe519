//! Workspace lifecycle through `WorkspaceManager` and the dispatcher.

mod common;

use common::{assert_unique_ownership, engine_with_tabs, ids, seeded_engine, tabs_of, workspace};
use tabspace::simulated::OracleCall;
use tabspace::{CoreError, Message};
use tabspace_store::{TabId, WorkspaceId};

#[tokio::test]
async fn test_create_and_rename_emit_refresh() {
    let (mut engine, _browser) = engine_with_tabs(&[]);
    let mut rx = engine.bus.subscribe();

    let created = engine.workspaces.create(" Work ").await.unwrap();
    assert_eq!(created.name, "Work");
    assert_eq!(rx.try_recv().unwrap(), Message::Refresh);

    assert!(engine.workspaces.rename(&created.id, "Play").await.unwrap());
    assert_eq!(rx.try_recv().unwrap(), Message::Refresh);

    assert!(!engine.workspaces.rename(&created.id, "Play").await.unwrap());
    assert!(rx.try_recv().is_err());

    let stored = engine.workspaces.get(&created.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Play");

    // Creating queued an activation of the new workspace.
    assert_eq!(engine.dispatcher.run_until_idle().await, 1);
    assert_eq!(engine.workspaces.active().await.unwrap(), Some(created.id));
}

#[tokio::test]
async fn test_created_workspace_becomes_active_and_hides_others() {
    let (mut engine, browser) =
        seeded_engine(vec![workspace("a", &[1, 2])], Some("a")).await;

    let created = engine.workspaces.create("Fresh").await.unwrap();
    assert_eq!(engine.dispatcher.run_until_idle().await, 1);

    assert_eq!(engine.workspaces.active().await.unwrap(), Some(created.id));
    let holder = engine.repo.load_holder().await.unwrap();
    assert!(holder.is_some());
    assert_eq!(browser.group_of(TabId(1)), holder);
    assert_eq!(browser.group_of(TabId(2)), holder);
}

#[tokio::test]
async fn test_delete_shows_surviving_tabs_before_removing_record() {
    let (mut engine, browser) =
        seeded_engine(vec![workspace("a", &[1]), workspace("c", &[7, 8])], Some("a")).await;
    engine.visibility.hide(&ids(&[7, 8])).await;
    browser.close_tab_silently(TabId(7));
    browser.clear_calls();

    assert!(
        engine
            .workspaces
            .delete(&WorkspaceId::new("c"))
            .await
            .unwrap()
    );
    // Nothing happens until the dispatcher runs.
    assert!(browser.calls().is_empty());
    assert_eq!(engine.dispatcher.run_until_idle().await, 1);

    assert_eq!(
        browser.calls(),
        vec![OracleCall::Ungroup {
            tab_ids: ids(&[8]),
        }]
    );
    assert_eq!(browser.group_of(TabId(8)), None);
    assert!(
        engine
            .workspaces
            .get(&WorkspaceId::new("c"))
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(
        engine.workspaces.active().await.unwrap(),
        Some(WorkspaceId::new("a"))
    );
}

#[tokio::test]
async fn test_lifecycle_delete_returns_removed_record() {
    let (engine, _browser) =
        seeded_engine(vec![workspace("a", &[1]), workspace("c", &[7, 8])], Some("a")).await;

    let deleted = engine
        .dispatcher
        .lifecycle()
        .delete(&WorkspaceId::new("c"))
        .await
        .unwrap();
    assert_eq!(deleted.tabs, ids(&[7, 8]));
    assert_eq!(deleted.name, "C");
}

#[tokio::test]
async fn test_deleting_active_workspace_clears_pointer() {
    let (mut engine, _browser) =
        seeded_engine(vec![workspace("a", &[1]), workspace("b", &[2])], Some("b")).await;

    engine
        .workspaces
        .delete(&WorkspaceId::new("b"))
        .await
        .unwrap();
    engine.dispatcher.run_until_idle().await;

    assert_eq!(engine.workspaces.active().await.unwrap(), None);
    assert_eq!(engine.workspaces.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_unknown_workspace() {
    let (mut engine, _browser) = seeded_engine(vec![workspace("a", &[1])], None).await;
    assert!(matches!(
        engine.workspaces.delete(&WorkspaceId::new("zzz")).await,
        Err(CoreError::UnknownWorkspace(_))
    ));
    assert_eq!(engine.dispatcher.run_until_idle().await, 0);
    assert_eq!(engine.workspaces.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_queued_behind_activation_runs_after_it() {
    let (mut engine, browser) =
        seeded_engine(vec![workspace("a", &[1]), workspace("b", &[2, 3])], Some("a")).await;

    // Activating "a" again hides "b"; the delete must then make 2 and 3
    // visible, not race with the hide.
    engine.handle.request_activation(WorkspaceId::new("a"));
    engine
        .workspaces
        .delete(&WorkspaceId::new("b"))
        .await
        .unwrap();
    assert_eq!(engine.dispatcher.run_until_idle().await, 2);

    assert_eq!(browser.group_of(TabId(2)), None);
    assert_eq!(browser.group_of(TabId(3)), None);
    assert_eq!(engine.workspaces.list().await.unwrap().len(), 1);
    assert_eq!(
        engine.workspaces.active().await.unwrap(),
        Some(WorkspaceId::new("a"))
    );
}

#[tokio::test]
async fn test_move_tab_to_inactive_workspace_hides_it() {
    let (mut engine, browser) =
        seeded_engine(vec![workspace("a", &[1, 2]), workspace("b", &[3])], Some("a")).await;

    assert!(
        engine
            .workspaces
            .move_tab(TabId(2), &WorkspaceId::new("b"))
            .await
            .unwrap()
    );
    assert_eq!(engine.dispatcher.run_until_idle().await, 1);

    assert_eq!(tabs_of(&engine, "a").await, ids(&[1]));
    assert_eq!(tabs_of(&engine, "b").await, ids(&[3, 2]));
    let holder = engine.repo.load_holder().await.unwrap();
    assert!(holder.is_some());
    assert_eq!(browser.group_of(TabId(2)), holder);
    assert_unique_ownership(&engine).await;
}

#[tokio::test]
async fn test_move_tab_to_active_workspace_shows_it() {
    let (engine, browser) =
        seeded_engine(vec![workspace("a", &[1]), workspace("b", &[2])], Some("a")).await;
    engine.visibility.hide(&ids(&[2])).await;

    engine
        .dispatcher
        .lifecycle()
        .move_tab(TabId(2), &WorkspaceId::new("a"))
        .await
        .unwrap();

    assert_eq!(tabs_of(&engine, "a").await, ids(&[1, 2]));
    assert!(tabs_of(&engine, "b").await.is_empty());
    assert_eq!(browser.group_of(TabId(2)), None);
}

#[tokio::test]
async fn test_move_tab_to_unknown_workspace_changes_nothing() {
    let (mut engine, _browser) = seeded_engine(vec![workspace("a", &[1])], Some("a")).await;

    assert!(matches!(
        engine
            .workspaces
            .move_tab(TabId(1), &WorkspaceId::new("nope"))
            .await,
        Err(CoreError::UnknownWorkspace(_))
    ));
    assert_eq!(engine.dispatcher.run_until_idle().await, 0);
    assert!(matches!(
        engine
            .dispatcher
            .lifecycle()
            .move_tab(TabId(1), &WorkspaceId::new("nope"))
            .await,
        Err(CoreError::UnknownWorkspace(_))
    ));
    assert_eq!(tabs_of(&engine, "a").await, ids(&[1]));
}

#[tokio::test]
async fn test_request_activation_skips_active_workspace() {
    let (mut engine, browser) =
        seeded_engine(vec![workspace("a", &[1]), workspace("b", &[2])], Some("a")).await;

    assert!(
        !engine
            .workspaces
            .request_activation(&WorkspaceId::new("a"))
            .await
            .unwrap()
    );
    assert_eq!(engine.dispatcher.run_until_idle().await, 0);

    assert!(
        engine
            .workspaces
            .request_activation(&WorkspaceId::new("b"))
            .await
            .unwrap()
    );
    assert_eq!(engine.dispatcher.run_until_idle().await, 1);
    assert_eq!(
        engine.workspaces.active().await.unwrap(),
        Some(WorkspaceId::new("b"))
    );
    assert!(browser.group_of(TabId(1)).is_some());
}
