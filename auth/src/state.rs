//! Domain model.
//!
//! Users, events and the credentials and attendance records that hang off
//! them. Encrypted blobs and signed credentials are opaque strings: the server
//! stores them but never decrypts or inspects them.

use crate::constants::UNIT_CREDENTIAL_TYPE_ID;
use crate::error::ProofPassError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a new random `EventId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EventId {
    type Err = ProofPassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ProofPassError::Validation(format!("invalid event id: {s}")))
    }
}

/// Deterministic identifier scoping a credential to one event or purpose.
///
/// Rendered as the decimal value returned by the context registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    /// Wrap a registry-produced identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Credential Kinds
// ═══════════════════════════════════════════════════════════════════════

/// Credential kinds understood by the attendance ledger and the issuer.
///
/// The wire form is the numeric type id.
///
/// ```
/// use proofpass_auth::state::CredentialKind;
///
/// assert_eq!("1".parse::<CredentialKind>().ok(), Some(CredentialKind::Unit));
/// assert!("2".parse::<CredentialKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Unit credential: carries no claims beyond its context and subject.
    Unit,
}

impl CredentialKind {
    /// Numeric type id sent to the issuer.
    #[must_use]
    pub const fn type_id(self) -> &'static str {
        match self {
            Self::Unit => UNIT_CREDENTIAL_TYPE_ID,
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_id())
    }
}

impl FromStr for CredentialKind {
    type Err = ProofPassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UNIT_CREDENTIAL_TYPE_ID => Ok(Self::Unit),
            _ => Err(ProofPassError::InvalidRequest(
                "invalid credential type".to_string(),
            )),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Users
// ═══════════════════════════════════════════════════════════════════════

/// A user, created on first successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// User ID.
    pub id: UserId,

    /// Normalized email address.
    pub email: String,

    /// Public commitment to the user's identity secret (empty until set).
    pub identity_commitment: String,

    /// Client-encrypted internal nullifier (opaque).
    pub encrypted_internal_nullifier: String,

    /// Client-encrypted identity secret (opaque).
    pub encrypted_identity_secret: String,

    /// Whether the blobs above are encrypted.
    pub is_encrypted: bool,
}

impl User {
    /// A freshly created user with empty identity fields.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            identity_commitment: String::new(),
            encrypted_internal_nullifier: String::new(),
            encrypted_identity_secret: String::new(),
            is_encrypted: true,
        }
    }

    /// `true` once the identity commitment has been set.
    #[must_use]
    pub fn has_identity_commitment(&self) -> bool {
        !self.identity_commitment.is_empty()
    }

    /// `true` while none of the three identity fields has been set.
    #[must_use]
    pub fn identity_is_unset(&self) -> bool {
        self.identity_commitment.is_empty()
            && self.encrypted_internal_nullifier.is_empty()
            && self.encrypted_identity_secret.is_empty()
    }
}

/// Identity fields, settable exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IdentityUpdate {
    /// Identity commitment.
    pub identity_commitment: String,

    /// Client-encrypted internal nullifier.
    pub encrypted_internal_nullifier: String,

    /// Client-encrypted identity secret.
    pub encrypted_identity_secret: String,
}

// ═══════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════

/// An event. The admin code is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Event ID.
    pub id: EventId,

    /// Display name.
    pub name: String,

    /// Description.
    pub description: String,

    /// Event website.
    pub url: String,

    /// Shared secret authorizing attendance recording.
    #[serde(skip_serializing)]
    pub admin_code: String,

    /// Chain the context registry lives on.
    pub chain_id: String,

    /// Context id derived at creation time (immutable once set).
    pub context_id: Option<ContextId>,

    /// Canonical string the context id was derived from.
    pub context_string: String,

    /// Issuer key trusted for this event's credentials.
    pub issuer_key_id: String,

    /// Start of the event.
    pub start_date: DateTime<Utc>,

    /// End of the event.
    pub end_date: DateTime<Utc>,
}

/// Input for event creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEvent {
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Event website.
    pub url: String,
    /// Shared secret authorizing attendance recording.
    pub admin_code: String,
    /// Start of the event.
    pub start_date: DateTime<Utc>,
    /// End of the event.
    pub end_date: DateTime<Utc>,
}

/// Partial update of an event. Context fields are not updatable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventUpdate {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New website.
    pub url: Option<String>,
    /// New admin code.
    pub admin_code: Option<String>,
    /// New start.
    pub start_date: Option<DateTime<Utc>>,
    /// New end.
    pub end_date: Option<DateTime<Utc>>,
}

/// External evidence that `email` may request a ticket for `event_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Event.
    pub event_id: EventId,
    /// Registered email.
    pub email: String,
}

// ═══════════════════════════════════════════════════════════════════════
// Credentials
// ═══════════════════════════════════════════════════════════════════════

/// A stored, client-encrypted ticket credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketCredential {
    /// Record id.
    pub id: Uuid,
    /// Event the ticket is for.
    pub event_id: EventId,
    /// Owner's email.
    pub email: String,
    /// Opaque ciphertext.
    pub credential: String,
    /// Client-chosen issuance time.
    pub issued_at: DateTime<Utc>,
    /// Client-chosen expiry.
    pub expire_at: DateTime<Utc>,
}

/// A stored, client-encrypted email credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailCredential {
    /// Record id.
    pub id: Uuid,
    /// Owner's identity commitment.
    pub identity_commitment: String,
    /// Opaque ciphertext.
    pub credential: String,
    /// Client-chosen issuance time.
    pub issued_at: DateTime<Utc>,
    /// Client-chosen expiry.
    pub expire_at: DateTime<Utc>,
}

/// Ciphertext plus timestamps submitted for storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialUpload {
    /// Opaque ciphertext.
    pub credential: String,
    /// Issuance time chosen by the client.
    pub issued_at: DateTime<Utc>,
    /// Expiry chosen by the client.
    pub expire_at: DateTime<Utc>,
}

/// A freshly signed credential, not yet encrypted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCredential {
    /// Signed credential as returned by the issuer.
    pub credential: String,
    /// Issuance time (server clock).
    pub issued_at: DateTime<Utc>,
    /// Expiry (server clock plus validity window).
    pub expire_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════
// Attendance
// ═══════════════════════════════════════════════════════════════════════

/// One recorded attendance. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attendance {
    /// Record id.
    pub id: Uuid,
    /// Event attended.
    pub event_id: EventId,
    /// Single-use token derived from the presented credential.
    pub nullifier: String,
}

/// An attendance claim presented at check-in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceClaim {
    /// Credential type id.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Credential context.
    pub context: String,
    /// Nullifier derived from the credential.
    pub nullifier: String,
    /// Issuer key the credential claims to be signed with.
    #[serde(default)]
    pub key_id: String,
    /// Event admin code.
    pub admin_code: String,
}
