//! ProofPass constants.

/// Prefix of the canonical context string, followed by `[{event_id}]{name}`.
pub const CONTEXT_PREFIX: &str = "[proofpass.io]";

/// Credential type id of the single recognized credential kind.
pub const UNIT_CREDENTIAL_TYPE_ID: &str = "1";

/// Credential protocol version sent to the issuer.
pub const CREDENTIAL_PROTOCOL_VERSION: u32 = 1;

/// Default context id of email credentials.
pub const DEFAULT_EMAIL_CREDENTIAL_CONTEXT_ID: &str = "111";

/// Default chain id recorded on events (Ethereum mainnet).
pub const DEFAULT_CHAIN_ID: &str = "1";

/// Default issuer key recorded on events.
pub const DEFAULT_ISSUER_KEY_ID: &str = "0xc4525dA874A6A3877db65e37f21eEc0b41ef9877";

/// Redis key namespace for one-time codes.
pub const OTC_KEY_PREFIX: &str = "proofpass:otc:";

/// Metric names.
pub mod metrics {
    /// Verification codes delivered.
    pub const OTC_ISSUED: &str = "proofpass_otc_issued_total";

    /// Successful logins.
    pub const LOGINS: &str = "proofpass_logins_total";

    /// Attendance records created.
    pub const ATTENDANCE_RECORDED: &str = "proofpass_attendance_recorded_total";

    /// Credentials signed by the issuer, labelled by `kind`.
    pub const CREDENTIALS_ISSUED: &str = "proofpass_credentials_issued_total";
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_context_prefix_format() {
        let canonical = format!("{CONTEXT_PREFIX}[{}]{}", "e1", "DevCon");
        assert_eq!(canonical, "[proofpass.io][e1]DevCon");
    }
}
