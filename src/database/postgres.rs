use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::{map_constraint_error, DatabaseError};
use crate::database::models::{Event, EventChanges, NewEvent, NewUser, Participant, User};
use crate::database::repository::{
    EventRepository, ParticipantRepository, Store, UserRepository, ALREADY_PARTICIPATING,
    EMAIL_TAKEN, EVENT_NOT_FOUND, PARTICIPANT_NOT_FOUND,
};

/// Postgres-backed store. Each mutation runs in its own transaction; dropping
/// an uncommitted transaction rolls it back.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        Ok(self.pool.begin().await?)
    }
}

async fn commit(tx: Transaction<'static, Postgres>, conflict: &str) -> Result<(), DatabaseError> {
    tx.commit().await.map_err(|e| map_constraint_error(e, conflict))
}

/// Locks the event row against concurrent deletion for the rest of the transaction.
async fn event_exists(tx: &mut Transaction<'static, Postgres>, event_id: Uuid) -> Result<bool, DatabaseError> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM event WHERE id = $1 FOR KEY SHARE")
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tx = self.begin().await?;

        let created = sqlx::query_as::<_, User>(
            r#"INSERT INTO "user" (id, email, password_hash)
               VALUES ($1, $2, $3)
               RETURNING id, email, password_hash"#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, EMAIL_TAKEN))?;

        commit(tx, EMAIL_TAKEN).await?;
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(r#"SELECT id, email, password_hash FROM "user" WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl EventRepository for PgStore {
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Event>, DatabaseError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, title, date, user_id FROM event WHERE user_id = $1 ORDER BY date, id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn insert(&self, owner: Uuid, event: NewEvent) -> Result<Event, DatabaseError> {
        let mut tx = self.begin().await?;

        let created = sqlx::query_as::<_, Event>(
            "INSERT INTO event (id, title, date, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, title, date, user_id",
        )
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(event.date)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update_owned(
        &self,
        owner: Uuid,
        event_id: Uuid,
        changes: EventChanges,
    ) -> Result<Event, DatabaseError> {
        let mut tx = self.begin().await?;

        let updated = sqlx::query_as::<_, Event>(
            "UPDATE event
             SET title = COALESCE($3, title), date = COALESCE($4, date)
             WHERE id = $1 AND user_id = $2
             RETURNING id, title, date, user_id",
        )
        .bind(event_id)
        .bind(owner)
        .bind(changes.title)
        .bind(changes.date)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(EVENT_NOT_FOUND.to_string()))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_owned(&self, owner: Uuid, event_id: Uuid) -> Result<(), DatabaseError> {
        let mut tx = self.begin().await?;

        let result = sqlx::query("DELETE FROM event WHERE id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(EVENT_NOT_FOUND.to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ParticipantRepository for PgStore {
    async fn list_by_user(&self, user: Uuid) -> Result<Vec<Participant>, DatabaseError> {
        let participants = sqlx::query_as::<_, Participant>(
            "SELECT id, user_id, event_id FROM participant WHERE user_id = $1 ORDER BY event_id, id",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;
        Ok(participants)
    }

    async fn insert(&self, user: Uuid, event_id: Uuid) -> Result<Participant, DatabaseError> {
        let mut tx = self.begin().await?;

        if !event_exists(&mut tx, event_id).await? {
            return Err(DatabaseError::NotFound(EVENT_NOT_FOUND.to_string()));
        }

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM participant WHERE user_id = $1 AND event_id = $2")
                .bind(user)
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Err(DatabaseError::Conflict(ALREADY_PARTICIPATING.to_string()));
        }

        // A racing insert of the same pair surfaces here or at commit as a unique violation
        let created = sqlx::query_as::<_, Participant>(
            "INSERT INTO participant (id, user_id, event_id)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, event_id",
        )
        .bind(Uuid::new_v4())
        .bind(user)
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, ALREADY_PARTICIPATING))?;

        commit(tx, ALREADY_PARTICIPATING).await?;
        Ok(created)
    }

    async fn update_owned(
        &self,
        user: Uuid,
        participant_id: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<Participant, DatabaseError> {
        let mut tx = self.begin().await?;

        let current = sqlx::query_as::<_, Participant>(
            "SELECT id, user_id, event_id FROM participant WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(participant_id)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(PARTICIPANT_NOT_FOUND.to_string()))?;

        let Some(new_event_id) = event_id else {
            return Ok(current);
        };

        if !event_exists(&mut tx, new_event_id).await? {
            return Err(DatabaseError::NotFound(EVENT_NOT_FOUND.to_string()));
        }

        let clash: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM participant WHERE user_id = $1 AND event_id = $2 AND id <> $3",
        )
        .bind(user)
        .bind(new_event_id)
        .bind(participant_id)
        .fetch_optional(&mut *tx)
        .await?;
        if clash.is_some() {
            return Err(DatabaseError::Conflict(ALREADY_PARTICIPATING.to_string()));
        }

        let updated = sqlx::query_as::<_, Participant>(
            "UPDATE participant SET event_id = $3
             WHERE id = $1 AND user_id = $2
             RETURNING id, user_id, event_id",
        )
        .bind(participant_id)
        .bind(user)
        .bind(new_event_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, ALREADY_PARTICIPATING))?;

        commit(tx, ALREADY_PARTICIPATING).await?;
        Ok(updated)
    }

    async fn delete_owned(&self, user: Uuid, participant_id: Uuid) -> Result<(), DatabaseError> {
        let mut tx = self.begin().await?;

        let result = sqlx::query("DELETE FROM participant WHERE id = $1 AND user_id = $2")
            .bind(participant_id)
            .bind(user)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(PARTICIPANT_NOT_FOUND.to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
