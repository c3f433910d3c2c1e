use std::collections::HashMap;
use std::marker::PhantomData;
use tokio::sync::RwLock;
use uuid::Uuid;
use anyhow::{Result, bail};

use crate::event_sourcing::core::{DomainEvent, EventEnvelope, Aggregate};

// ============================================================================
// Generic Event Store - Repository for Events
// ============================================================================
//
// In-process, append-only event store. Works with ANY event type.
//
// Responsibilities:
// 1. Append events per aggregate stream
// 2. Load event history for aggregates
// 3. Enforce optimistic concurrency (expected version)
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Concurrency conflict: expected version {expected}, but current is {current}")]
    ConcurrencyConflict { expected: i64, current: i64 },

    #[error("Aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    #[error("Cannot append empty event list")]
    EmptyAppend,
}

pub struct EventStore<E: DomainEvent> {
    streams: RwLock<HashMap<Uuid, Vec<EventEnvelope<E>>>>,
    aggregate_type_name: String,
    _phantom: PhantomData<E>,
}

impl<E: DomainEvent> EventStore<E> {
    pub fn new(aggregate_type_name: &str) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            aggregate_type_name: aggregate_type_name.to_string(),
            _phantom: PhantomData,
        }
    }

    pub fn aggregate_type_name(&self) -> &str {
        &self.aggregate_type_name
    }

    /// Append events to an aggregate stream.
    /// Returns the new version number after appending.
    pub async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64> {
        if events.is_empty() {
            bail!(StoreError::EmptyAppend);
        }

        let mut streams = self.streams.write().await;
        let current_version = streams
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map(|e| e.sequence_number)
            .unwrap_or(0);
        if current_version != expected_version {
            tracing::warn!(
                aggregate_id = %aggregate_id,
                expected_version,
                current_version,
                "Rejected append on stale version"
            );
            bail!(StoreError::ConcurrencyConflict {
                expected: expected_version,
                current: current_version,
            });
        }

        // Streams only come into existence once an append succeeds
        let stream = streams.entry(aggregate_id).or_default();
        let event_count = events.len();
        let mut new_version = expected_version;

        for mut envelope in events {
            new_version += 1;
            envelope.sequence_number = new_version;
            stream.push(envelope);
        }

        tracing::info!(
            aggregate_id = %aggregate_id,
            aggregate_type = %self.aggregate_type_name,
            new_version,
            event_count,
            "Appended events to event store"
        );

        Ok(new_version)
    }

    /// Load all events for an aggregate, in sequence order
    pub async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>> {
        let streams = self.streams.read().await;
        let events = streams.get(&aggregate_id).cloned().unwrap_or_default();

        tracing::debug!("Loaded {} events for aggregate {}", events.len(), aggregate_id);
        Ok(events)
    }

    pub async fn get_current_version(&self, aggregate_id: Uuid) -> Result<i64> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map(|e| e.sequence_number)
            .unwrap_or(0))
    }

    /// Load aggregate from events
    pub async fn load_aggregate<A>(&self, aggregate_id: Uuid) -> Result<A>
    where
        A: Aggregate<Event = E>,
        <A as Aggregate>::Error: std::fmt::Display,
    {
        let events = self.load_events(aggregate_id).await?;

        if events.is_empty() {
            bail!(StoreError::AggregateNotFound(aggregate_id));
        }

        A::load_from_events(events)
    }

    pub async fn aggregate_exists(&self, aggregate_id: Uuid) -> Result<bool> {
        let version = self.get_current_version(aggregate_id).await?;
        Ok(version > 0)
    }

    /// Ids of every stored aggregate
    pub async fn aggregate_ids(&self) -> Vec<Uuid> {
        self.streams.read().await.keys().copied().collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
