//! Store tests against a real Postgres. They run only when `DATABASE_URL`
//! names a postgres:// database and return early otherwise.

mod common;

use anyhow::Result;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use event_planner_api::database::models::{EventChanges, NewEvent, NewUser, User};
use event_planner_api::database::repository::{ALREADY_PARTICIPATING, EVENT_NOT_FOUND};
use event_planner_api::database::{
    Database, DatabaseError, EventRepository, ParticipantRepository, PgStore, UserRepository,
};
use event_planner_api::AppConfig;

fn postgres_config() -> Option<AppConfig> {
    let _ = dotenvy::dotenv();
    let url = std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| url.starts_with("postgres"))?;

    let mut config = AppConfig::for_tests();
    config.database.url = url;
    Some(config)
}

async fn pg_store() -> Result<Option<Arc<PgStore>>> {
    let Some(config) = postgres_config() else {
        eprintln!("DATABASE_URL is not a postgres:// url, skipping");
        return Ok(None);
    };

    match Database::connect(&config).await? {
        Database::Postgres(store) => Ok(Some(store)),
        Database::Memory(_) => Ok(None),
    }
}

/// Every test works on fresh users, so runs can share one database.
async fn user(store: &PgStore) -> Result<User> {
    let user = UserRepository::insert(
        store,
        NewUser {
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await?;
    Ok(user)
}

fn launch() -> NewEvent {
    NewEvent {
        title: "Launch".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 12, 31)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid date"),
    }
}

#[tokio::test]
async fn duplicate_email_conflicts() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let existing = user(&store).await?;

    let err = UserRepository::insert(
        store.as_ref(),
        NewUser {
            email: existing.email.clone(),
            password_hash: "other".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)), "{:?}", err);

    let found = store.find_by_email(&existing.email).await?.expect("registered user");
    assert_eq!(found.id, existing.id);
    Ok(())
}

#[tokio::test]
async fn events_are_scoped_to_their_owner() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let (alice, bob) = (user(&store).await?, user(&store).await?);

    let event = EventRepository::insert(store.as_ref(), alice.id, launch()).await?;

    assert!(store.list_by_owner(bob.id).await?.is_empty());
    assert_eq!(store.list_by_owner(alice.id).await?, vec![event.clone()]);

    let changes = EventChanges {
        title: Some("Hijacked".to_string()),
        date: None,
    };
    let err = EventRepository::update_owned(store.as_ref(), bob.id, event.id, changes)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(ref msg) if msg == EVENT_NOT_FOUND));

    let err = EventRepository::delete_owned(store.as_ref(), bob.id, event.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));

    assert_eq!(store.list_by_owner(alice.id).await?[0].title, "Launch");
    Ok(())
}

#[tokio::test]
async fn update_keeps_unsupplied_columns() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let owner = user(&store).await?;
    let event = EventRepository::insert(store.as_ref(), owner.id, launch()).await?;

    let renamed = EventRepository::update_owned(
        store.as_ref(),
        owner.id,
        event.id,
        EventChanges {
            title: Some("Launch party".to_string()),
            date: None,
        },
    )
    .await?;
    assert_eq!(renamed.title, "Launch party");
    assert_eq!(renamed.date, event.date);

    let new_date = NaiveDate::from_ymd_opt(2025, 1, 15)
        .and_then(|d| d.and_hms_opt(18, 30, 0))
        .expect("valid date");
    let moved = EventRepository::update_owned(
        store.as_ref(),
        owner.id,
        event.id,
        EventChanges {
            title: None,
            date: Some(new_date),
        },
    )
    .await?;
    assert_eq!(moved.title, "Launch party");
    assert_eq!(moved.date, new_date);
    Ok(())
}

#[tokio::test]
async fn deleting_an_event_cascades_to_participants() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let (owner, guest) = (user(&store).await?, user(&store).await?);
    let event = EventRepository::insert(store.as_ref(), owner.id, launch()).await?;
    ParticipantRepository::insert(store.as_ref(), guest.id, event.id).await?;

    EventRepository::delete_owned(store.as_ref(), owner.id, event.id).await?;

    assert!(store.list_by_user(guest.id).await?.is_empty());
    assert!(store.list_by_owner(owner.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn repointing_checks_target_and_uniqueness() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let (owner, guest, stranger) = (user(&store).await?, user(&store).await?, user(&store).await?);
    let first = EventRepository::insert(store.as_ref(), owner.id, launch()).await?;
    let second = EventRepository::insert(store.as_ref(), owner.id, launch()).await?;

    let row_a = ParticipantRepository::insert(store.as_ref(), guest.id, first.id).await?;
    let row_b = ParticipantRepository::insert(store.as_ref(), guest.id, second.id).await?;

    let err = ParticipantRepository::update_owned(store.as_ref(), stranger.id, row_a.id, Some(second.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));

    let err = ParticipantRepository::update_owned(store.as_ref(), guest.id, row_a.id, Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(ref msg) if msg == EVENT_NOT_FOUND));

    let err = ParticipantRepository::update_owned(store.as_ref(), guest.id, row_a.id, Some(second.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(ref msg) if msg == ALREADY_PARTICIPATING));

    let unchanged = ParticipantRepository::update_owned(store.as_ref(), guest.id, row_a.id, Some(first.id)).await?;
    assert_eq!(unchanged, row_a);
    let unchanged = ParticipantRepository::update_owned(store.as_ref(), guest.id, row_a.id, None).await?;
    assert_eq!(unchanged, row_a);

    ParticipantRepository::delete_owned(store.as_ref(), guest.id, row_b.id).await?;
    let moved = ParticipantRepository::update_owned(store.as_ref(), guest.id, row_a.id, Some(second.id)).await?;
    assert_eq!(moved.id, row_a.id);
    assert_eq!(moved.event_id, second.id);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_joins_leave_one_row() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let (owner, guest) = (user(&store).await?, user(&store).await?);
    let event = EventRepository::insert(store.as_ref(), owner.id, launch()).await?;

    let (a, b) = tokio::join!(
        ParticipantRepository::insert(store.as_ref(), guest.id, event.id),
        ParticipantRepository::insert(store.as_ref(), guest.id, event.id)
    );

    let (ok, err) = match (a, b) {
        (Ok(row), Err(err)) | (Err(err), Ok(row)) => (row, err),
        other => panic!("expected exactly one join to succeed: {:?}", other),
    };
    assert_eq!(ok.event_id, event.id);
    assert!(matches!(err, DatabaseError::Conflict(ref msg) if msg == ALREADY_PARTICIPATING));
    assert_eq!(store.list_by_user(guest.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_participant_user_is_not_reported_as_missing_event() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let owner = user(&store).await?;
    let event = EventRepository::insert(store.as_ref(), owner.id, launch()).await?;

    let err = ParticipantRepository::insert(store.as_ref(), Uuid::new_v4(), event.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Sqlx(_)), "{:?}", err);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_join_requests_get_201_and_409() -> Result<()> {
    let Some(config) = postgres_config() else { return Ok(()) };
    let server = common::TestServer::start_with(config).await?;

    let tag = Uuid::new_v4().simple().to_string();
    let owner = server.user_token(&format!("owner-{}@example.com", tag)).await?;
    let guest = server.user_token(&format!("guest-{}@example.com", tag)).await?;

    let created: Value = server
        .create_event(&owner, "Launch", "2024-12-31T10:00:00")
        .await?
        .json()
        .await?;
    let event_id = created["event"]["id"].as_str().unwrap_or_default().to_string();

    let (a, b) = tokio::join!(server.join(&guest, &event_id), server.join(&guest, &event_id));
    let mut statuses = vec![a?.status(), b?.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
    Ok(())
}
