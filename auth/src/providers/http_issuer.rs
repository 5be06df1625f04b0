//! HTTP client for the credential issuer.

use crate::error::{ProofPassError, Result};
use crate::providers::issuer::{CredentialIssuer, IssueRequest};
use reqwest::Client;
use serde::Deserialize;

const OPERATION: &str = "issuer.generate_signed_credential";

/// Issuer response body.
#[derive(Debug, Deserialize)]
struct SignedCredentialResponse {
    signed_cred: String,
}

/// Credential issuer reached over HTTP/JSON.
///
/// Posts the [`IssueRequest`] to `{base_url}/v1/generate-signed-credential`
/// and returns the `signed_cred` field of the response.
#[derive(Clone, Debug)]
pub struct HttpCredentialIssuer {
    /// HTTP client (connection pool).
    http_client: Client,

    /// Signing endpoint.
    endpoint: String,
}

impl HttpCredentialIssuer {
    /// Create an issuer client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Issuer base URL (e.g., `http://issuer:8080`)
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create an issuer client over an existing `reqwest` client.
    #[must_use]
    pub fn with_client(http_client: Client, base_url: &str) -> Self {
        Self {
            http_client,
            endpoint: format!(
                "{}/v1/generate-signed-credential",
                base_url.trim_end_matches('/')
            ),
        }
    }

    /// Signing endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CredentialIssuer for HttpCredentialIssuer {
    async fn generate_signed_credential(&self, request: &IssueRequest) -> Result<String> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ProofPassError::internal(OPERATION, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %error_body,
                context = %request.header.context,
                "Issuer rejected credential request"
            );
            return Err(ProofPassError::internal(
                OPERATION,
                format!("issuer returned {status}"),
            ));
        }

        let signed: SignedCredentialResponse = response
            .json()
            .await
            .map_err(|e| ProofPassError::internal(OPERATION, e))?;

        Ok(signed.signed_cred)
    }
}
