use std::sync::Arc;
use uuid::Uuid;

use crate::api::request::{CreateParticipantRequest, UpdateParticipantRequest};
use crate::database::models::Participant;
use crate::database::repository::ParticipantRepository;
use crate::error::ApiError;

/// Participation rows, scoped to the participating user
#[derive(Clone)]
pub struct ParticipantService {
    participants: Arc<dyn ParticipantRepository>,
}

impl ParticipantService {
    pub fn new(participants: Arc<dyn ParticipantRepository>) -> Self {
        Self { participants }
    }

    pub async fn list(&self, user: Uuid) -> Result<Vec<Participant>, ApiError> {
        Ok(self.participants.list_by_user(user).await?)
    }

    pub async fn create(&self, user: Uuid, request: CreateParticipantRequest) -> Result<Participant, ApiError> {
        let event_id = request.validate()?;
        let participant = self.participants.insert(user, event_id).await?;
        tracing::info!("User {} joined event {}", user, event_id);
        Ok(participant)
    }

    pub async fn update(
        &self,
        user: Uuid,
        participant_id: Uuid,
        request: UpdateParticipantRequest,
    ) -> Result<Participant, ApiError> {
        let event_id = request.validate()?;
        let participant = self.participants.update_owned(user, participant_id, event_id).await?;
        tracing::info!("User {} updated participation {}", user, participant.id);
        Ok(participant)
    }

    pub async fn delete(&self, user: Uuid, participant_id: Uuid) -> Result<(), ApiError> {
        self.participants.delete_owned(user, participant_id).await?;
        tracing::info!("User {} removed participation {}", user, participant_id);
        Ok(())
    }
}
