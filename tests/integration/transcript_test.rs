//! Class switching, transcript resolution, and the weekly sweep.

use theday_core::config::session::WEEK_MS;
use theday_core::error::AppError;
use theday_entity::transcript::{
    DEFAULT_CLASS, SemesterSelection, TranscriptName, bundled_default,
};
use theday_service::{
    PreferencesService, SubjectSyncEngine, SyncOutcome, TranscriptSessionEngine, TranscriptSource,
};

use crate::helpers::{CLASS_KEY, TestApp, listing, transcript_record};

const CLASS: &str = "CS-2027";

fn script_class(app: &TestApp) {
    app.mock.set_transcript(CLASS_KEY, Ok(transcript_record(CLASS)));
    app.mock.set_transcript_name(
        CLASS_KEY,
        Ok(TranscriptName {
            id: CLASS_KEY.to_string(),
            class: CLASS.to_string(),
        }),
    );
}

#[tokio::test]
async fn test_unreachable_class_falls_back_to_default() {
    let app = TestApp::new().await;
    app.mock.set_transcript(
        CLASS_KEY,
        Err(AppError::external_service("getTranscript failed with status 503")),
    );
    let engine = TranscriptSessionEngine::new(app.ctx.clone());

    let (_, resolution) = engine.bootstrap(Some(CLASS_KEY)).await;

    assert_eq!(resolution.source, TranscriptSource::Fallback);
    assert_eq!(resolution.class_name, DEFAULT_CLASS);
    assert_eq!(&resolution.transcript, bundled_default());
    assert_eq!(resolution.redirect.as_deref(), Some("/?q=default"));
    assert_eq!(engine.active_class_name().await.as_deref(), Some(DEFAULT_CLASS));
    assert!(engine.registered_classes().await.is_empty());
}

#[tokio::test]
async fn test_switch_sync_and_weekly_expiry() {
    let app = TestApp::new().await;
    script_class(&app);
    let engine = TranscriptSessionEngine::new(app.ctx.clone());

    let (report, resolution) = engine.bootstrap(None).await;
    assert!(report.first_run);
    assert_eq!(resolution.class_name, DEFAULT_CLASS);

    let resolution = engine.switch_class(CLASS_KEY).await.unwrap();
    assert_eq!(resolution.source, TranscriptSource::Remote);
    assert_eq!(resolution.class_name, CLASS);
    assert!(resolution.transcript.find_subject("DS").is_some());

    app.mock.push_materials("DS", Ok(listing("Lecture1", &["a"])));
    let sync = SubjectSyncEngine::for_class(&app.ctx, &resolution.class_name);
    assert!(matches!(sync.sync("DS", None).await, SyncOutcome::Updated(_)));

    // Exactly one week old is still fresh.
    app.clock.advance(WEEK_MS);
    let (report, resolution) = engine.bootstrap(None).await;
    assert!(!report.expired);
    assert_eq!(resolution.source, TranscriptSource::Cache);

    app.clock.advance(1);
    let report = engine.sweep().await;
    assert!(report.expired);
    assert_eq!(report.purged_classes, vec![CLASS.to_string()]);
    assert_eq!(report.purged_subjects, 1);
    assert_eq!(app.ctx.subject_cache(CLASS).get("DS").await, None);
    assert_eq!(app.ctx.state.class_transcript(CLASS).await, None);
    assert_eq!(engine.registered_classes().await.len(), 1);

    // The active class survives the purge and is refetched by its key.
    let resolution = engine.resolve(None).await;
    assert_eq!(resolution.source, TranscriptSource::Remote);
    assert_eq!(resolution.class_name, CLASS);
    assert_eq!(app.mock.calls(&format!("transcript:{CLASS_KEY}")), 2);
}

#[tokio::test]
async fn test_session_state_survives_reopen() {
    let app = TestApp::new().await;
    script_class(&app);
    let engine = TranscriptSessionEngine::new(app.ctx.clone());
    let resolution = engine.switch_class(CLASS_KEY).await.unwrap();

    let prefs = PreferencesService::new(&app.ctx);
    prefs
        .select(&resolution.transcript, SemesterSelection::Index(3))
        .await
        .unwrap();
    prefs
        .set_custom_semester(&resolution.transcript, None, &["la".to_string()])
        .await
        .unwrap();

    let second = app.reopen().await;
    let engine = TranscriptSessionEngine::new(second.ctx.clone());
    let (_, resolution) = engine.bootstrap(None).await;
    assert_eq!(resolution.source, TranscriptSource::Cache);
    assert_eq!(resolution.class_name, CLASS);
    assert_eq!(second.mock.total_calls(), 0);

    let prefs = PreferencesService::new(&second.ctx);
    assert_eq!(prefs.selection().await, SemesterSelection::Index(3));
    let view = prefs.current(&resolution.transcript).await.unwrap();
    assert_eq!(view.subjects.len(), 2);
    let custom = prefs.custom_semester(&resolution.transcript).await;
    assert_eq!(custom.subjects.len(), 1);
    assert_eq!(custom.subjects[0].abbreviation, "LA");
}
