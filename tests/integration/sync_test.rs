//! Subject sync against a file-backed store.

use std::sync::Arc;

use theday_entity::folder::{FolderNode, FolderStructure};
use theday_remote::{FilesListing, FilesMetadata, FolderListing};
use theday_service::{SessionContext, SubjectSyncEngine, SyncOutcome, SyncPhase};

use crate::helpers::{TestApp, listing};

const CLASS: &str = "CS-2027";

#[tokio::test]
async fn test_first_sync_without_cache_then_incremental() {
    let app = TestApp::new().await;
    let engine = SubjectSyncEngine::for_class(&app.ctx, CLASS);
    app.mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
    app.mock.hold("DS");

    let task = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sync("DS", None).await }
    });
    engine
        .subscribe()
        .wait_for(|view| view.phase == SyncPhase::Fetching)
        .await
        .unwrap();

    let view = engine.view();
    assert!(view.loading);
    assert!(view.fetching);
    assert_eq!(view.data, None);

    app.mock.release("DS");
    assert!(matches!(task.await.unwrap(), SyncOutcome::Updated(_)));
    let view = engine.view();
    assert_eq!(view.data, Some(listing("Lecture1", &["a"])));
    assert_eq!(view.new_items, vec!["a".to_string()]);
    assert!(!view.loading);
    assert!(!view.fetching);

    app.mock.push_materials("DS", Ok(listing("Lecture1", &["a", "b"])));
    let outcome = engine.sync("DS", None).await;
    let SyncOutcome::Updated(diff) = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert!(diff.removed.is_empty());
    assert_eq!(engine.view().new_items, vec!["b".to_string()]);
    assert_eq!(engine.view().data, Some(listing("Lecture1", &["a", "b"])));
}

#[tokio::test]
async fn test_cache_survives_reopen() {
    let app = TestApp::new().await;
    app.mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
    SubjectSyncEngine::for_class(&app.ctx, CLASS)
        .sync("DS", None)
        .await;

    let second = app.reopen().await;
    let engine = SubjectSyncEngine::for_class(&second.ctx, CLASS);
    second.mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
    second.mock.hold("DS");

    let task = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sync("DS", None).await }
    });
    engine
        .subscribe()
        .wait_for(|view| view.phase == SyncPhase::Fetching)
        .await
        .unwrap();
    assert_eq!(engine.view().data, Some(listing("Lecture1", &["a"])));
    assert!(!engine.view().loading);

    second.mock.release("DS");
    assert_eq!(task.await.unwrap(), SyncOutcome::Unchanged);
    assert!(engine.view().new_items.is_empty());
}

#[tokio::test]
async fn test_unchanged_listing_does_not_touch_the_store() {
    let app = TestApp::new().await;
    let engine = SubjectSyncEngine::for_class(&app.ctx, CLASS);
    app.mock.push_materials("DS", Ok(listing("Lecture1", &["a", "b"])));
    engine.sync("DS", None).await;
    let before = app.store_bytes().await;
    assert!(!before.is_empty());

    assert_eq!(engine.sync("DS", None).await, SyncOutcome::Unchanged);
    assert_eq!(app.store_bytes().await, before);
}

#[tokio::test]
async fn test_quota_exceeded_still_shows_fresh_data() {
    let app = TestApp::with_quota(16).await;
    let engine = SubjectSyncEngine::for_class(&app.ctx, CLASS);
    app.mock.push_materials("DS", Ok(listing("Lecture1", &["a", "b"])));

    assert!(matches!(
        engine.sync("DS", None).await,
        SyncOutcome::Updated(_)
    ));
    let view = engine.view();
    assert_eq!(view.data, Some(listing("Lecture1", &["a", "b"])));
    assert_eq!(view.new_items.len(), 2);
    assert_eq!(view.error, None);

    // Nothing was persisted, so the next sync sees everything as new again.
    assert!(matches!(
        engine.sync("DS", None).await,
        SyncOutcome::Updated(_)
    ));
}

#[tokio::test]
async fn test_late_response_of_previous_subject_is_discarded() {
    let app = TestApp::new().await;
    let engine = SubjectSyncEngine::for_class(&app.ctx, CLASS);
    app.mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
    app.mock.push_materials("LA", Ok(listing("Week1", &["x"])));
    app.mock.hold("DS");

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sync("DS", None).await }
    });
    engine
        .subscribe()
        .wait_for(|view| view.subject.as_deref() == Some("DS") && view.fetching)
        .await
        .unwrap();

    assert!(matches!(
        engine.sync("LA", None).await,
        SyncOutcome::Updated(_)
    ));
    app.mock.release("DS");
    assert_eq!(first.await.unwrap(), SyncOutcome::Aborted);

    let view = engine.view();
    assert_eq!(view.subject.as_deref(), Some("LA"));
    assert_eq!(view.data, Some(listing("Week1", &["x"])));
    assert_eq!(app.ctx.subject_cache(CLASS).get("DS").await, None);
}

#[tokio::test]
async fn test_split_protocol_configured_per_subject() {
    let app = TestApp::new().await;
    let mut config = (*app.ctx.config).clone();
    config.sync.split_subjects = vec!["ALGO".to_string()];
    let ctx = SessionContext::new(
        Arc::new(config),
        app.ctx.store.clone(),
        app.ctx.remote.clone(),
        app.ctx.clock.clone(),
    );
    let engine = SubjectSyncEngine::for_class(&ctx, CLASS);

    let structure: FolderStructure = [FolderNode {
        id: "f1".to_string(),
        name: "Week1".to_string(),
        parent_id: None,
    }]
    .into_iter()
    .collect();
    app.mock.push_folders(
        "ALGO",
        Ok(FolderListing {
            folder_structure: structure.clone(),
            ..FolderListing::default()
        }),
    );
    app.mock.push_files(
        "ALGO",
        Ok(FilesListing {
            files_data: listing("Week1", &["w"]),
            metadata: FilesMetadata {
                total_files: 1,
                categories: 1,
            },
            ..FilesListing::default()
        }),
    );
    app.mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));

    assert!(matches!(
        engine.load("ALGO", None).await,
        SyncOutcome::Updated(_)
    ));
    assert_eq!(app.mock.calls("materials:ALGO"), 0);
    assert_eq!(app.mock.last_folders_sent(), Some(structure));

    assert!(matches!(
        engine.load("DS", None).await,
        SyncOutcome::Updated(_)
    ));
    assert_eq!(app.mock.calls("folders:DS"), 0);
    assert_eq!(app.mock.calls("materials:DS"), 1);
}
