//! Repository traits.
//!
//! One trait per aggregate. Uniqueness invariants (one attendance per
//! `(event, nullifier)`, one user per email, one ticket credential per
//! `(event, email)`, one email credential per identity commitment) are
//! enforced by the store, never by a read followed by a write.

use crate::error::Result;
use crate::state::{
    EmailCredential, Event, EventId, IdentityUpdate, TicketCredential, User, UserId,
};
use std::future::Future;
use uuid::Uuid;

/// User accounts.
pub trait UserRepository: Send + Sync {
    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_user(&self, user_id: UserId) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Look up a user by normalized email.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_user_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Return the user for `email`, creating it with empty identity fields if
    /// absent. Atomic: concurrent first logins yield one user.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_or_create_user(&self, email: &str) -> impl Future<Output = Result<User>> + Send;

    /// Set the identity fields, only if all three are still empty.
    ///
    /// # Returns
    ///
    /// `true` if the row was updated, `false` if the user does not exist or
    /// already has identity fields.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn set_identity(
        &self,
        user_id: UserId,
        identity: &IdentityUpdate,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Events.
pub trait EventRepository: Send + Sync {
    /// All events, earliest start first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;

    /// Look up an event.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_event(&self, event_id: EventId) -> impl Future<Output = Result<Option<Event>>> + Send;

    /// Insert an event and make `creator` its first admin, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    fn create_event(&self, event: &Event, creator: UserId) -> impl Future<Output = Result<()>> + Send;

    /// Persist the mutable fields of an event. Context fields are left as stored.
    ///
    /// # Errors
    ///
    /// Returns error if the update fails.
    fn update_event(&self, event: &Event) -> impl Future<Output = Result<()>> + Send;
}

/// Event admins.
pub trait EventAdminRepository: Send + Sync {
    /// Whether `user_id` administers `event_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn is_event_admin(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Registrations (read-only).
pub trait RegistrationRepository: Send + Sync {
    /// Whether `email` is registered for `event_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn is_registered(&self, event_id: EventId, email: &str) -> impl Future<Output = Result<bool>> + Send;
}

/// Stored ticket credentials.
pub trait TicketCredentialRepository: Send + Sync {
    /// Whether a ticket credential is stored for `(event_id, email)`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn ticket_credential_exists(
        &self,
        event_id: EventId,
        email: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// All ticket credentials of `email`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_ticket_credentials(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Vec<TicketCredential>>> + Send;

    /// Insert or replace the credential for `(event_id, email)`.
    ///
    /// A replaced row keeps its original id; the stored row is returned.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn upsert_ticket_credential(
        &self,
        credential: &TicketCredential,
    ) -> impl Future<Output = Result<TicketCredential>> + Send;
}

/// Stored email credentials.
pub trait EmailCredentialRepository: Send + Sync {
    /// The credential stored for `identity_commitment`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_email_credential(
        &self,
        identity_commitment: &str,
    ) -> impl Future<Output = Result<Option<EmailCredential>>> + Send;

    /// Insert or replace the credential for its identity commitment.
    ///
    /// A replaced row keeps its original id; the stored row is returned.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn upsert_email_credential(
        &self,
        credential: &EmailCredential,
    ) -> impl Future<Output = Result<EmailCredential>> + Send;
}

/// Attendance ledger storage.
pub trait AttendanceRepository: Send + Sync {
    /// Atomically insert `(event_id, nullifier)`.
    ///
    /// # Returns
    ///
    /// `Some(id)` for a new record, `None` if the pair was already recorded.
    ///
    /// # Security
    ///
    /// **CRITICAL**: must be a single conditional insert against a uniqueness
    /// constraint (`INSERT .. ON CONFLICT DO NOTHING RETURNING id`), never an
    /// existence check followed by an insert.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn record_attendance(
        &self,
        event_id: EventId,
        nullifier: &str,
    ) -> impl Future<Output = Result<Option<Uuid>>> + Send;

    /// Number of attendances recorded for an event.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn count_attendance(&self, event_id: EventId) -> impl Future<Output = Result<u64>> + Send;
}

/// Every repository, implemented by one backing store.
pub trait Database:
    UserRepository
    + EventRepository
    + EventAdminRepository
    + RegistrationRepository
    + TicketCredentialRepository
    + EmailCredentialRepository
    + AttendanceRepository
    + Clone
    + 'static
{
}

impl<T> Database for T where
    T: UserRepository
        + EventRepository
        + EventAdminRepository
        + RegistrationRepository
        + TicketCredentialRepository
        + EmailCredentialRepository
        + AttendanceRepository
        + Clone
        + 'static
{
}
