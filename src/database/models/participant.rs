use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A user's membership in an event. At most one row per (user_id, event_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Participant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
}
