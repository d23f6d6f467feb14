use std::sync::Arc;
use uuid::Uuid;

use crate::api::request::{CreateEventRequest, UpdateEventRequest};
use crate::database::models::Event;
use crate::database::repository::EventRepository;
use crate::error::ApiError;

/// Owner-scoped event operations
#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Event>, ApiError> {
        Ok(self.events.list_by_owner(owner).await?)
    }

    pub async fn create(&self, owner: Uuid, request: CreateEventRequest) -> Result<Event, ApiError> {
        let new_event = request.validate()?;
        let event = self.events.insert(owner, new_event).await?;
        tracing::info!("User {} created event {}", owner, event.id);
        Ok(event)
    }

    pub async fn update(
        &self,
        owner: Uuid,
        event_id: Uuid,
        request: UpdateEventRequest,
    ) -> Result<Event, ApiError> {
        let changes = request.validate()?;
        let event = self.events.update_owned(owner, event_id, changes).await?;
        tracing::info!("User {} updated event {}", owner, event.id);
        Ok(event)
    }

    pub async fn delete(&self, owner: Uuid, event_id: Uuid) -> Result<(), ApiError> {
        self.events.delete_owned(owner, event_id).await?;
        tracing::info!("User {} deleted event {}", owner, event_id);
        Ok(())
    }
}
