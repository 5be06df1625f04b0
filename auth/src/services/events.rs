//! Event management.
//!
//! Events are public to read. Creating one derives its context and makes the
//! creator its first admin; only admins may update it afterwards, and the
//! context fields never change.

use crate::config::EventConfig;
use crate::error::{ProofPassError, Result};
use crate::providers::{ContextRegistry, EventAdminRepository, EventRepository};
use crate::services::context::ContextBinder;
use crate::state::{Event, EventId, EventUpdate, NewEvent, UserId};
use crate::utils::require_non_empty;
use proofpass_core::RequestContext;

/// Event catalogue operations.
#[derive(Clone, Debug)]
pub struct EventService<D, R> {
    db: D,
    binder: ContextBinder<R>,
    config: EventConfig,
}

impl<D, R> EventService<D, R>
where
    D: EventRepository + EventAdminRepository,
    R: ContextRegistry,
{
    /// Create an event service.
    #[must_use]
    pub const fn new(db: D, binder: ContextBinder<R>, config: EventConfig) -> Self {
        Self { db, binder, config }
    }

    /// All events.
    ///
    /// # Errors
    ///
    /// Returns `Internal`/`Cancelled` from the store.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Event>> {
        ctx.run("events.list", self.db.list_events()).await
    }

    /// One event.
    ///
    /// # Errors
    ///
    /// `NotFound` if the event does not exist.
    pub async fn get(&self, ctx: &RequestContext, event_id: EventId) -> Result<Event> {
        ctx.run("events.get", self.db.get_event(event_id))
            .await?
            .ok_or(ProofPassError::NotFound("event"))
    }

    /// Create an event owned by `creator`.
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is empty or the event ends before it starts
    /// - `Internal`/`Cancelled` from the registry or the store
    #[tracing::instrument(
        skip_all,
        name = "events.create",
        fields(correlation_id = %ctx.correlation_id(), creator = %creator)
    )]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        creator: UserId,
        input: NewEvent,
    ) -> Result<Event> {
        require_non_empty("name", &input.name)?;
        require_non_empty("description", &input.description)?;
        require_non_empty("url", &input.url)?;
        require_non_empty("admin_code", &input.admin_code)?;
        if input.end_date < input.start_date {
            return Err(ProofPassError::Validation(
                "end_date must not be before start_date".to_string(),
            ));
        }

        let id = EventId::new();
        let (context_id, context_string) =
            self.binder.derive_context_id(ctx, id, &input.name).await?;

        let event = Event {
            id,
            name: input.name,
            description: input.description,
            url: input.url,
            admin_code: input.admin_code,
            chain_id: self.config.chain_id.clone(),
            context_id: Some(context_id),
            context_string,
            issuer_key_id: self.config.issuer_key_id.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
        };

        ctx.run("events.create", self.db.create_event(&event, creator))
            .await?;

        tracing::info!(event_id = %event.id, "Event created");
        Ok(event)
    }

    /// Apply a partial update. The caller must administer the event.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the event does not exist
    /// - `Unauthorized` if `caller` is not an admin of it
    /// - `Validation` for an emptied field or inverted dates
    #[tracing::instrument(
        skip_all,
        name = "events.update",
        fields(correlation_id = %ctx.correlation_id(), caller = %caller, event_id = %event_id)
    )]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        caller: UserId,
        event_id: EventId,
        update: EventUpdate,
    ) -> Result<Event> {
        let mut event = self.get(ctx, event_id).await?;

        let is_admin = ctx
            .run("event_admins.check", self.db.is_event_admin(event_id, caller))
            .await?;
        if !is_admin {
            tracing::info!("Caller is not an event admin");
            return Err(ProofPassError::Unauthorized(
                "not an admin of this event".to_string(),
            ));
        }

        if let Some(name) = update.name {
            require_non_empty("name", &name)?;
            event.name = name;
        }
        if let Some(description) = update.description {
            require_non_empty("description", &description)?;
            event.description = description;
        }
        if let Some(url) = update.url {
            require_non_empty("url", &url)?;
            event.url = url;
        }
        if let Some(admin_code) = update.admin_code {
            require_non_empty("admin_code", &admin_code)?;
            event.admin_code = admin_code;
        }
        if let Some(start_date) = update.start_date {
            event.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            event.end_date = end_date;
        }
        if event.end_date < event.start_date {
            return Err(ProofPassError::Validation(
                "end_date must not be before start_date".to_string(),
            ));
        }

        ctx.run("events.update", self.db.update_event(&event)).await?;

        tracing::info!("Event updated");
        Ok(event)
    }
}
