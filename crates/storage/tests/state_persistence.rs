use chrono::{Duration, Utc};
use shared::domain::DrawState;
use storage::{StateRepository, Storage};

#[tokio::test]
async fn state_survives_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("oracle.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));
    let deadline = Utc::now() + Duration::hours(24);
    let deadline = chrono::DateTime::from_timestamp_millis(deadline.timestamp_millis())
        .expect("millis");

    {
        let storage = Storage::new(&database_url).await.expect("open");
        let repo = StateRepository::new(storage, 20);
        repo.save(&DrawState::new(
            vec!["https://example.com/1".into(), "https://example.com/2".into()],
            Some(deadline),
        ))
        .await
        .expect("save");
    }

    let storage = Storage::new(&database_url).await.expect("reopen");
    let repo = StateRepository::new(storage, 20);
    let state = repo.load().await.expect("load");
    assert_eq!(state.history.len(), 2);
    assert_eq!(state.history[1], "https://example.com/2");
    assert_eq!(state.reset_deadline, Some(deadline));

    repo.clear().await.expect("clear");
    assert_eq!(repo.load().await.expect("load"), DrawState::cleared());
}
