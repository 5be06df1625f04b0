//! Credential issuer trait and request shape.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Credential header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialHeader {
    /// Protocol version.
    pub version: u32,

    /// Credential type id.
    #[serde(rename = "type")]
    pub type_id: String,

    /// Context id the credential is bound to.
    pub context: String,

    /// Subject id (hash of the holder's email).
    pub id: String,
}

/// Credential type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialType {
    /// Credential type id.
    pub type_id: String,

    /// Revocation nonce; `0` means not revocable.
    pub revocable: u64,
}

/// Credential body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialBody {
    /// Type descriptor.
    pub tp: CredentialType,
}

/// One credential-signing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRequest {
    /// Header.
    pub header: CredentialHeader,

    /// Body.
    pub body: CredentialBody,

    /// Free-form attachments (`event_id` or `email`).
    pub attachments: BTreeMap<String, String>,

    /// Chain id of the issuer's key registry.
    pub chain_id: String,

    /// Holder's identity commitment.
    pub identity_commitment: String,

    /// Absolute expiry, sent as unix seconds.
    #[serde(serialize_with = "unix_seconds")]
    pub expired_at: DateTime<Utc>,
}

fn unix_seconds<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.timestamp().to_string())
}

/// External service that signs credentials on this system's behalf.
///
/// The core never signs anything itself. Calls are made once; retries belong
/// to the client implementation, if anywhere.
pub trait CredentialIssuer: Send + Sync {
    /// Sign a credential.
    ///
    /// # Returns
    ///
    /// The signed credential, opaque to the core.
    ///
    /// # Errors
    ///
    /// Returns error if the issuer is unreachable or rejects the request.
    fn generate_signed_credential(
        &self,
        request: &IssueRequest,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_request_wire_shape() {
        let request = IssueRequest {
            header: CredentialHeader {
                version: 1,
                type_id: "1".to_string(),
                context: "42".to_string(),
                id: "7".to_string(),
            },
            body: CredentialBody {
                tp: CredentialType {
                    type_id: "1".to_string(),
                    revocable: 0,
                },
            },
            attachments: BTreeMap::from([("event_id".to_string(), "e1".to_string())]),
            chain_id: "1".to_string(),
            identity_commitment: "123".to_string(),
            expired_at: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default(),
        };

        let json = serde_json::to_value(&request).unwrap_or_default();
        assert_eq!(json["header"]["type"], "1");
        assert_eq!(json["body"]["tp"]["revocable"], 0);
        assert_eq!(json["attachments"]["event_id"], "e1");
        assert_eq!(json["expired_at"], "1700000000");
    }
}
