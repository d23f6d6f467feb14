use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Event, EventChanges, NewEvent, NewUser, Participant, User};
use crate::database::repository::{
    EventRepository, ParticipantRepository, Store, UserRepository, ALREADY_PARTICIPATING,
    EMAIL_TAKEN, EVENT_NOT_FOUND, PARTICIPANT_NOT_FOUND,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    events: Vec<Event>,
    participants: Vec<Participant>,
}

/// In-process store selected by `DATABASE_URL=memory://`.
///
/// Mutations hold the write lock for their whole check-then-write sequence,
/// which gives the same all-or-nothing behaviour as a transaction. Listings
/// sort the same way the Postgres queries do.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Event>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables.events.iter().filter(|e| e.user_id == owner).cloned().collect();
        events.sort_by_key(|e| (e.date, e.id));
        Ok(events)
    }

    async fn insert(&self, owner: Uuid, event: NewEvent) -> Result<Event, DatabaseError> {
        let mut tables = self.tables.write().await;
        let created = Event {
            id: Uuid::new_v4(),
            title: event.title,
            date: event.date,
            user_id: owner,
        };
        tables.events.push(created.clone());
        Ok(created)
    }

    async fn update_owned(
        &self,
        owner: Uuid,
        event_id: Uuid,
        changes: EventChanges,
    ) -> Result<Event, DatabaseError> {
        let mut tables = self.tables.write().await;
        let event = tables
            .events
            .iter_mut()
            .find(|e| e.id == event_id && e.user_id == owner)
            .ok_or_else(|| DatabaseError::NotFound(EVENT_NOT_FOUND.to_string()))?;

        if let Some(title) = changes.title {
            event.title = title;
        }
        if let Some(date) = changes.date {
            event.date = date;
        }
        Ok(event.clone())
    }

    async fn delete_owned(&self, owner: Uuid, event_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let position = tables
            .events
            .iter()
            .position(|e| e.id == event_id && e.user_id == owner)
            .ok_or_else(|| DatabaseError::NotFound(EVENT_NOT_FOUND.to_string()))?;

        tables.events.remove(position);
        tables.participants.retain(|p| p.event_id != event_id);
        Ok(())
    }
}

#[async_trait]
impl ParticipantRepository for MemoryStore {
    async fn list_by_user(&self, user: Uuid) -> Result<Vec<Participant>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Participant> = tables.participants.iter().filter(|p| p.user_id == user).cloned().collect();
        rows.sort_by_key(|p| (p.event_id, p.id));
        Ok(rows)
    }

    async fn insert(&self, user: Uuid, event_id: Uuid) -> Result<Participant, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.events.iter().any(|e| e.id == event_id) {
            return Err(DatabaseError::NotFound(EVENT_NOT_FOUND.to_string()));
        }
        if tables.participants.iter().any(|p| p.user_id == user && p.event_id == event_id) {
            return Err(DatabaseError::Conflict(ALREADY_PARTICIPATING.to_string()));
        }

        let created = Participant {
            id: Uuid::new_v4(),
            user_id: user,
            event_id,
        };
        tables.participants.push(created.clone());
        Ok(created)
    }

    async fn update_owned(
        &self,
        user: Uuid,
        participant_id: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<Participant, DatabaseError> {
        let mut tables = self.tables.write().await;
        let index = tables
            .participants
            .iter()
            .position(|p| p.id == participant_id && p.user_id == user)
            .ok_or_else(|| DatabaseError::NotFound(PARTICIPANT_NOT_FOUND.to_string()))?;

        let Some(new_event_id) = event_id else {
            return Ok(tables.participants[index].clone());
        };

        if !tables.events.iter().any(|e| e.id == new_event_id) {
            return Err(DatabaseError::NotFound(EVENT_NOT_FOUND.to_string()));
        }
        let clash = tables
            .participants
            .iter()
            .any(|p| p.user_id == user && p.event_id == new_event_id && p.id != participant_id);
        if clash {
            return Err(DatabaseError::Conflict(ALREADY_PARTICIPATING.to_string()));
        }

        let participant = &mut tables.participants[index];
        participant.event_id = new_event_id;
        Ok(participant.clone())
    }

    async fn delete_owned(&self, user: Uuid, participant_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let position = tables
            .participants
            .iter()
            .position(|p| p.id == participant_id && p.user_id == user)
            .ok_or_else(|| DatabaseError::NotFound(PARTICIPANT_NOT_FOUND.to_string()))?;

        tables.participants.remove(position);
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
