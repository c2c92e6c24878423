use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use scaled_core::model::{PracticeSettings, PracticeState};
use scaled_core::time::fixed_clock;
use services::{AppServices, PracticeServiceError, SessionEvent};
use storage::repository::{
    InMemoryStore, KeyValueStore, PRACTICE_STATE_KEY, PracticeStateRepository, SETTINGS_KEY,
    SettingsRepository, Storage, StorageError,
};

struct UnreachableStore;

#[async_trait]
impl KeyValueStore for UnreachableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

fn services_over(store: &InMemoryStore) -> AppServices {
    AppServices::from_storage(&Storage::from_store(store.clone()), fixed_clock())
}

#[tokio::test]
async fn first_launch_starts_from_defaults_and_persists_state() {
    let store = InMemoryStore::new();
    let services = services_over(&store);

    let session = services.practice().open_session().await.unwrap();

    assert_eq!(session.settings(), &PracticeSettings::default());
    assert_eq!(session.state().scale_progress().len(), 13);
    assert_eq!(session.state().completed_count(), 0);
    assert_eq!(store.get_state().await.unwrap().as_ref(), Some(session.state()));
}

#[tokio::test]
async fn progress_survives_a_restart() {
    let store = InMemoryStore::new();
    let services = services_over(&store);

    let mut session = services.practice().open_session().await.unwrap();
    session.accept();
    let events = session.advance_clock(Duration::milliseconds(500));
    assert_eq!(events, vec![SessionEvent::Advanced]);
    services.practice().save_session(&session).await.unwrap();
    let saved = session.state().clone();
    drop(session);

    let reopened = services_over(&store).practice().open_session().await.unwrap();
    assert_eq!(reopened.state(), &saved);
    assert_eq!(reopened.state().current_scale_index(), 1);
}

#[tokio::test]
async fn malformed_entries_fall_back_to_defaults() {
    let store = InMemoryStore::new();
    store.put(SETTINGS_KEY, "{\"scales\":").await.unwrap();
    store
        .put(PRACTICE_STATE_KEY, r#"{"currentScaleIndex":0,"scaleProgress":[],"practiceOrder":[4]}"#)
        .await
        .unwrap();

    let session = services_over(&store).practice().open_session().await.unwrap();

    assert_eq!(session.settings(), &PracticeSettings::default());
    assert!(session.state().tracks_scales(session.settings().scales()));
}

#[tokio::test]
async fn stored_state_for_other_scales_is_rebuilt() {
    let store = InMemoryStore::new();
    let old = PracticeSettings::default();
    let mut state = PracticeState::initialize(&old, &mut rand::rng());
    state.accept(old.repetitions_required());
    let counted = state.current_scale().unwrap().name().to_owned();
    store.save_state(&state).await.unwrap();

    let narrowed = PracticeSettings::default()
        .with_scale_removed("Ab Major")
        .with_scale_added("F# Minor")
        .unwrap();
    store.save_settings(&narrowed).await.unwrap();

    let session = services_over(&store).practice().open_session().await.unwrap();
    let progress = session.state().scale_progress();

    assert!(session.state().tracks_scales(narrowed.scales()));
    assert_eq!(session.state().current_scale_index(), 0);
    if counted != "Ab Major" {
        let kept = progress.iter().find(|p| p.name() == counted).unwrap();
        assert_eq!(kept.success_count(), 1);
    }
    let added = progress.iter().find(|p| p.name() == "F# Minor").unwrap();
    assert_eq!(added.success_count(), 0);
}

#[tokio::test]
async fn reset_progress_replaces_stored_state() {
    let store = InMemoryStore::new();
    let services = services_over(&store);
    let mut session = services.practice().open_session().await.unwrap();
    session.accept();
    services.practice().save_state(session.state()).await.unwrap();

    let fresh = services.practice().reset_progress().await.unwrap();

    assert_eq!(fresh.completed_count(), 0);
    assert!(fresh.scale_progress().iter().all(|p| p.success_count() == 0));
    assert_eq!(store.get_state().await.unwrap(), Some(fresh));
}

#[tokio::test]
async fn unreachable_storage_is_reported() {
    let storage = Storage {
        settings: Arc::new(UnreachableStore),
        practice_state: Arc::new(UnreachableStore),
    };
    let services = AppServices::from_storage(&storage, fixed_clock());

    let result = services.practice().open_session().await;
    assert!(matches!(result, Err(PracticeServiceError::Settings(_))));
}

#[tokio::test]
async fn settings_saved_through_the_service_are_loaded_back() {
    let store = InMemoryStore::new();
    let services = services_over(&store);
    let settings = PracticeSettings::default().with_bpm(132).with_repetitions_required(5);

    services.settings().save(&settings).await.unwrap();

    assert_eq!(services.settings().load().await.unwrap(), settings);
}
