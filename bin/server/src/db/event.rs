//! Database repository for events and participations.
//!
//! Joins and leaves run in one transaction that locks the event row with
//! `SELECT ... FOR UPDATE`, so the participation record and the event's
//! `participant_count` always move together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventgate_booking::{BookingError, Event, EventStore, Participation};
use eventgate_core::{EventId, UserId};
use rootcause::Report;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::str::FromStr;

fn storage(e: sqlx::Error) -> BookingError {
    BookingError::Storage {
        details: e.to_string(),
    }
}

fn corrupt(key: &str, reason: impl std::fmt::Display) -> BookingError {
    BookingError::Storage {
        details: format!("record '{key}' is corrupt: {reason}"),
    }
}

fn parse_event_id(raw: &str) -> Result<EventId, BookingError> {
    EventId::from_str(raw).map_err(|e| corrupt(raw, e))
}

/// Row type for event queries.
#[derive(FromRow)]
struct EventRow {
    id: String,
    name: String,
    description: String,
    starts_at: DateTime<Utc>,
    location: String,
    capacity: i32,
    image_url: String,
    created_by: String,
    created_at: DateTime<Utc>,
    participant_count: i32,
}

impl EventRow {
    fn try_into_event(self) -> Result<Event, BookingError> {
        let id = parse_event_id(&self.id)?;
        let capacity = u32::try_from(self.capacity).map_err(|e| corrupt(&self.id, e))?;
        let participant_count =
            u32::try_from(self.participant_count).map_err(|e| corrupt(&self.id, e))?;
        Ok(Event::with_all_fields(
            id,
            self.name,
            self.description,
            self.starts_at,
            self.location,
            capacity,
            self.image_url,
            UserId::new(self.created_by),
            self.created_at,
            participant_count,
        ))
    }
}

/// Row type for participation queries.
#[derive(FromRow)]
struct ParticipationRow {
    event_id: String,
    user_id: String,
    joined_at: DateTime<Utc>,
}

impl ParticipationRow {
    fn try_into_participation(self) -> Result<Participation, BookingError> {
        Ok(Participation::with_all_fields(
            parse_event_id(&self.event_id)?,
            UserId::new(self.user_id),
            self.joined_at,
        ))
    }
}

/// Repository for events and participations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Locks the event row for the rest of the transaction.
    async fn lock_event(
        tx: &mut Transaction<'_, Postgres>,
        id: EventId,
    ) -> Result<Option<Event>, BookingError> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, starts_at, location, capacity, image_url,
                   created_by, created_at, participant_count
            FROM events
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut **tx)
        .await
        .map_err(storage)?;

        row.map(EventRow::try_into_event).transpose()
    }

    /// Adds `delta` to the event's participant count, flooring at zero.
    async fn adjust_count(
        tx: &mut Transaction<'_, Postgres>,
        id: EventId,
        delta: i32,
    ) -> Result<Event, BookingError> {
        let row: EventRow = sqlx::query_as(
            r#"
            UPDATE events
            SET participant_count = GREATEST(participant_count + $2, 0)
            WHERE id = $1
            RETURNING id, name, description, starts_at, location, capacity, image_url,
                      created_by, created_at, participant_count
            "#,
        )
        .bind(id.to_string())
        .bind(delta)
        .fetch_one(&mut **tx)
        .await
        .map_err(storage)?;

        row.try_into_event()
    }
}

#[async_trait]
impl EventStore for EventRepository {
    async fn insert_event(&self, event: &Event) -> Result<(), Report<BookingError>> {
        let capacity = i32::try_from(event.capacity()).map_err(|_| BookingError::InvalidDraft {
            field: "capacity",
            reason: "Capacity is too large".to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO events (id, name, description, starts_at, location, capacity, image_url,
                                created_by, created_at, participant_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0)
            "#,
        )
        .bind(event.id().to_string())
        .bind(event.name())
        .bind(event.description())
        .bind(event.starts_at())
        .bind(event.location())
        .bind(capacity)
        .bind(event.image_url().unwrap_or_default())
        .bind(event.created_by().as_str())
        .bind(event.created_at())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>, Report<BookingError>> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, starts_at, location, capacity, image_url,
                   created_by, created_at, participant_count
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        Ok(row.map(EventRow::try_into_event).transpose()?)
    }

    async fn list_events(&self) -> Result<Vec<Event>, Report<BookingError>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, starts_at, location, capacity, image_url,
                   created_by, created_at, participant_count
            FROM events
            ORDER BY starts_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows
            .into_iter()
            .map(EventRow::try_into_event)
            .collect::<Result<_, _>>()?)
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, Report<BookingError>> {
        // Participations go with the event through ON DELETE CASCADE.
        let result = sqlx::query(
            r#"
            DELETE FROM events
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn join_event(
        &self,
        participation: &Participation,
    ) -> Result<Event, Report<BookingError>> {
        let event_id = participation.event_id();
        let user_id = participation.user_id();
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let event = Self::lock_event(&mut tx, event_id).await?;

        let joined: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT 1
            FROM participations
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id.to_string())
        .bind(user_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;
        if joined.is_some() {
            return Err(BookingError::AlreadyJoined {
                event_id,
                user_id: user_id.clone(),
            }
            .into());
        }

        let event = event.ok_or(BookingError::EventNotFound { event_id })?;
        if !event.has_available_spots() {
            return Err(BookingError::EventFull {
                event_id,
                capacity: event.capacity(),
            }
            .into());
        }

        sqlx::query(
            r#"
            INSERT INTO participations (event_id, user_id, joined_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(event_id.to_string())
        .bind(user_id.as_str())
        .bind(participation.joined_at())
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        let event = Self::adjust_count(&mut tx, event_id, 1).await?;
        tx.commit().await.map_err(storage)?;
        Ok(event)
    }

    async fn leave_event(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<Event, Report<BookingError>> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let event = Self::lock_event(&mut tx, event_id).await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM participations
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id.to_string())
        .bind(user_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(storage)?;
        if removed.rows_affected() == 0 {
            return Err(BookingError::NotJoined {
                event_id,
                user_id: user_id.clone(),
            }
            .into());
        }
        if event.is_none() {
            return Err(BookingError::EventNotFound { event_id }.into());
        }

        let event = Self::adjust_count(&mut tx, event_id, -1).await?;
        tx.commit().await.map_err(storage)?;
        Ok(event)
    }

    async fn find_participation(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<Option<Participation>, Report<BookingError>> {
        let row: Option<ParticipationRow> = sqlx::query_as(
            r#"
            SELECT event_id, user_id, joined_at
            FROM participations
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id.to_string())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        Ok(row
            .map(ParticipationRow::try_into_participation)
            .transpose()?)
    }

    async fn participants(
        &self,
        event_id: EventId,
    ) -> Result<Vec<Participation>, Report<BookingError>> {
        let rows: Vec<ParticipationRow> = sqlx::query_as(
            r#"
            SELECT event_id, user_id, joined_at
            FROM participations
            WHERE event_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows
            .into_iter()
            .map(ParticipationRow::try_into_participation)
            .collect::<Result<_, _>>()?)
    }

    async fn events_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EventId>, Report<BookingError>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT event_id
            FROM participations
            WHERE user_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(ids
            .iter()
            .map(|id| parse_event_id(id))
            .collect::<Result<_, _>>()?)
    }
}
