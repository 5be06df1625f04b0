//! In-memory database for testing.

use crate::error::{ProofPassError, Result};
use crate::providers::{
    AttendanceRepository, EmailCredentialRepository, EventAdminRepository, EventRepository,
    RegistrationRepository, TicketCredentialRepository, UserRepository,
};
use crate::state::{
    Attendance, EmailCredential, Event, EventId, IdentityUpdate, TicketCredential, User, UserId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    events: HashMap<EventId, Event>,
    event_admins: HashSet<(EventId, UserId)>,
    registrations: HashSet<(EventId, String)>,
    ticket_credentials: HashMap<(EventId, String), TicketCredential>,
    email_credentials: HashMap<String, EmailCredential>,
    attendances: HashMap<(EventId, String), Attendance>,
}

/// Mock database implementing every repository.
///
/// All tables live behind one mutex, so each repository call is atomic the
/// way a single SQL statement is. Uniqueness is enforced by map keys.
#[derive(Debug, Clone, Default)]
pub struct MockDatabase {
    tables: Arc<Mutex<Tables>>,
    failing: Arc<Mutex<bool>>,
}

impl MockDatabase {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (simulates a lost connection).
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }

    /// Register `email` for `event_id`.
    pub fn add_registration(&self, event_id: EventId, email: &str) {
        self.tables()
            .registrations
            .insert((event_id, email.to_string()));
    }

    /// Insert an event without an admin.
    pub fn insert_event(&self, event: Event) {
        self.tables().events.insert(event.id, event);
    }

    /// Insert a user.
    pub fn insert_user(&self, user: User) {
        self.tables().users.insert(user.id, user);
    }

    /// Number of users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.tables().users.len()
    }

    /// Attendances recorded for `event_id`.
    #[must_use]
    pub fn attendances(&self, event_id: EventId) -> Vec<Attendance> {
        self.tables()
            .attendances
            .values()
            .filter(|attendance| attendance.event_id == event_id)
            .cloned()
            .collect()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self, operation: &'static str) -> Result<()> {
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(ProofPassError::internal(operation, "connection refused"));
        }
        Ok(())
    }
}

impl UserRepository for MockDatabase {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.check_available("users.get")?;
        Ok(self.tables().users.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.check_available("users.get_by_email")?;
        Ok(self
            .tables()
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn get_or_create_user(&self, email: &str) -> Result<User> {
        self.check_available("users.get_or_create")?;
        let mut tables = self.tables();

        if let Some(user) = tables.users.values().find(|user| user.email == email) {
            return Ok(user.clone());
        }

        let user = User::new(email);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_identity(&self, user_id: UserId, identity: &IdentityUpdate) -> Result<bool> {
        self.check_available("users.set_identity")?;
        let mut tables = self.tables();

        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(false);
        };
        if !user.identity_is_unset() {
            return Ok(false);
        }

        user.identity_commitment.clone_from(&identity.identity_commitment);
        user.encrypted_internal_nullifier
            .clone_from(&identity.encrypted_internal_nullifier);
        user.encrypted_identity_secret
            .clone_from(&identity.encrypted_identity_secret);
        Ok(true)
    }
}

impl EventRepository for MockDatabase {
    async fn list_events(&self) -> Result<Vec<Event>> {
        self.check_available("events.list")?;
        let mut events: Vec<Event> = self.tables().events.values().cloned().collect();
        events.sort_by_key(|event| event.start_date);
        Ok(events)
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>> {
        self.check_available("events.get")?;
        Ok(self.tables().events.get(&event_id).cloned())
    }

    async fn create_event(&self, event: &Event, creator: UserId) -> Result<()> {
        self.check_available("events.create")?;
        let mut tables = self.tables();
        tables.events.insert(event.id, event.clone());
        tables.event_admins.insert((event.id, creator));
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        self.check_available("events.update")?;
        let mut tables = self.tables();
        let Some(stored) = tables.events.get_mut(&event.id) else {
            return Err(ProofPassError::NotFound("event"));
        };

        stored.name.clone_from(&event.name);
        stored.description.clone_from(&event.description);
        stored.url.clone_from(&event.url);
        stored.admin_code.clone_from(&event.admin_code);
        stored.start_date = event.start_date;
        stored.end_date = event.end_date;
        Ok(())
    }
}

impl EventAdminRepository for MockDatabase {
    async fn is_event_admin(&self, event_id: EventId, user_id: UserId) -> Result<bool> {
        self.check_available("event_admins.check")?;
        Ok(self.tables().event_admins.contains(&(event_id, user_id)))
    }
}

impl RegistrationRepository for MockDatabase {
    async fn is_registered(&self, event_id: EventId, email: &str) -> Result<bool> {
        self.check_available("registrations.exists")?;
        Ok(self
            .tables()
            .registrations
            .contains(&(event_id, email.to_string())))
    }
}

impl TicketCredentialRepository for MockDatabase {
    async fn ticket_credential_exists(&self, event_id: EventId, email: &str) -> Result<bool> {
        self.check_available("ticket_credentials.exists")?;
        Ok(self
            .tables()
            .ticket_credentials
            .contains_key(&(event_id, email.to_string())))
    }

    async fn list_ticket_credentials(&self, email: &str) -> Result<Vec<TicketCredential>> {
        self.check_available("ticket_credentials.list")?;
        Ok(self
            .tables()
            .ticket_credentials
            .values()
            .filter(|credential| credential.email == email)
            .cloned()
            .collect())
    }

    async fn upsert_ticket_credential(&self, credential: &TicketCredential) -> Result<TicketCredential> {
        self.check_available("ticket_credentials.upsert")?;
        let mut tables = self.tables();
        let key = (credential.event_id, credential.email.clone());
        let mut stored = credential.clone();
        if let Some(existing) = tables.ticket_credentials.get(&key) {
            stored.id = existing.id;
        }
        tables.ticket_credentials.insert(key, stored.clone());
        Ok(stored)
    }
}

impl EmailCredentialRepository for MockDatabase {
    async fn get_email_credential(&self, identity_commitment: &str) -> Result<Option<EmailCredential>> {
        self.check_available("email_credentials.get")?;
        Ok(self
            .tables()
            .email_credentials
            .get(identity_commitment)
            .cloned())
    }

    async fn upsert_email_credential(&self, credential: &EmailCredential) -> Result<EmailCredential> {
        self.check_available("email_credentials.upsert")?;
        let mut tables = self.tables();
        let mut stored = credential.clone();
        if let Some(existing) = tables.email_credentials.get(&credential.identity_commitment) {
            stored.id = existing.id;
        }
        tables
            .email_credentials
            .insert(credential.identity_commitment.clone(), stored.clone());
        Ok(stored)
    }
}

impl AttendanceRepository for MockDatabase {
    async fn record_attendance(&self, event_id: EventId, nullifier: &str) -> Result<Option<Uuid>> {
        self.check_available("attendance.record")?;
        let mut tables = self.tables();
        let key = (event_id, nullifier.to_string());
        if tables.attendances.contains_key(&key) {
            return Ok(None);
        }

        let attendance = Attendance {
            id: Uuid::new_v4(),
            event_id,
            nullifier: nullifier.to_string(),
        };
        let id = attendance.id;
        tables.attendances.insert(key, attendance);
        Ok(Some(id))
    }

    async fn count_attendance(&self, event_id: EventId) -> Result<u64> {
        self.check_available("attendance.count")?;
        let count = self
            .tables()
            .attendances
            .keys()
            .filter(|(id, _)| *id == event_id)
            .count();
        Ok(count as u64)
    }
}
