//! Webhook subscription handshake.
//!
//! Meta verifies a webhook URL by sending `GET /webhook` with `hub.mode`,
//! `hub.verify_token` and `hub.challenge` query parameters; the server must
//! echo the challenge back iff the token matches the configured secret.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Query parameters of the handshake request. All optional: Meta sends all
/// three, but the route is publicly reachable.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Token matched; echo the challenge with a 200.
    Verified(String),
    /// Mode and token were present but did not match; 403.
    Forbidden,
    /// Mode or token missing; 400.
    BadRequest,
}

/// Check a handshake attempt against the configured verify token.
///
/// No side effects beyond logging the attempt.
pub fn verify(params: &VerifyParams, expected: &SecretString) -> VerifyOutcome {
    let mode = params.mode.as_deref();
    tracing::info!(mode = mode.unwrap_or("<none>"), "Webhook verification request");

    match (mode, params.verify_token.as_deref()) {
        (Some("subscribe"), Some(token)) if token == expected.expose_secret() => {
            tracing::info!("Webhook verified successfully");
            VerifyOutcome::Verified(params.challenge.clone().unwrap_or_default())
        }
        (Some(_), Some(_)) => {
            tracing::error!("Webhook verification failed: token mismatch");
            VerifyOutcome::Forbidden
        }
        _ => VerifyOutcome::BadRequest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mode: Option<&str>, token: Option<&str>, challenge: Option<&str>) -> VerifyParams {
        VerifyParams {
            mode: mode.map(String::from),
            verify_token: token.map(String::from),
            challenge: challenge.map(String::from),
        }
    }

    fn secret() -> SecretString {
        SecretString::from("my_verify_token")
    }

    #[test]
    fn subscribe_with_matching_token_returns_challenge() {
        let outcome = verify(
            &params(Some("subscribe"), Some("my_verify_token"), Some("1158201444")),
            &secret(),
        );
        assert_eq!(outcome, VerifyOutcome::Verified("1158201444".into()));
    }

    #[test]
    fn matching_token_without_challenge_returns_empty_challenge() {
        let outcome = verify(&params(Some("subscribe"), Some("my_verify_token"), None), &secret());
        assert_eq!(outcome, VerifyOutcome::Verified(String::new()));
    }

    #[test]
    fn wrong_token_is_forbidden() {
        let outcome = verify(
            &params(Some("subscribe"), Some("wrong"), Some("c")),
            &secret(),
        );
        assert_eq!(outcome, VerifyOutcome::Forbidden);
    }

    #[test]
    fn wrong_mode_is_forbidden() {
        let outcome = verify(
            &params(Some("unsubscribe"), Some("my_verify_token"), Some("c")),
            &secret(),
        );
        assert_eq!(outcome, VerifyOutcome::Forbidden);
    }

    #[test]
    fn missing_mode_is_bad_request() {
        let outcome = verify(&params(None, Some("my_verify_token"), Some("c")), &secret());
        assert_eq!(outcome, VerifyOutcome::BadRequest);
    }

    #[test]
    fn missing_token_is_bad_request() {
        let outcome = verify(&params(Some("subscribe"), None, Some("c")), &secret());
        assert_eq!(outcome, VerifyOutcome::BadRequest);
    }

    #[test]
    fn missing_everything_is_bad_request() {
        let outcome = verify(&VerifyParams::default(), &secret());
        assert_eq!(outcome, VerifyOutcome::BadRequest);
    }

    #[test]
    fn token_comparison_is_exact() {
        let outcome = verify(
            &params(Some("subscribe"), Some("my_verify_token "), Some("c")),
            &secret(),
        );
        assert_eq!(outcome, VerifyOutcome::Forbidden);
    }
}
