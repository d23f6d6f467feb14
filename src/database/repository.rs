use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Event, EventChanges, NewEvent, NewUser, Participant, User};

pub const EVENT_NOT_FOUND: &str = "Event not found";
pub const PARTICIPANT_NOT_FOUND: &str = "Participant not found";
pub const EMAIL_TAKEN: &str = "Email already registered";
pub const ALREADY_PARTICIPATING: &str = "Already participating in this event";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
}

/// Every read and write is scoped to the owning user. A row owned by someone
/// else is reported exactly like a missing row.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Event>, DatabaseError>;
    async fn insert(&self, owner: Uuid, event: NewEvent) -> Result<Event, DatabaseError>;
    async fn update_owned(
        &self,
        owner: Uuid,
        event_id: Uuid,
        changes: EventChanges,
    ) -> Result<Event, DatabaseError>;
    /// Also removes the event's participant rows.
    async fn delete_owned(&self, owner: Uuid, event_id: Uuid) -> Result<(), DatabaseError>;
}

/// Rows are scoped to the participating user. Target events are looked up
/// globally: any user may join any event.
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn list_by_user(&self, user: Uuid) -> Result<Vec<Participant>, DatabaseError>;
    async fn insert(&self, user: Uuid, event_id: Uuid) -> Result<Participant, DatabaseError>;
    /// `event_id: None` leaves the row as it is (after the ownership check).
    async fn update_owned(
        &self,
        user: Uuid,
        participant_id: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<Participant, DatabaseError>;
    async fn delete_owned(&self, user: Uuid, participant_id: Uuid) -> Result<(), DatabaseError>;
}

/// A complete backend: all three tables plus a liveness probe.
#[async_trait]
pub trait Store: UserRepository + EventRepository + ParticipantRepository {
    async fn ping(&self) -> Result<(), DatabaseError>;
    fn backend(&self) -> &'static str;
}
