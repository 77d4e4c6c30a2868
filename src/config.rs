//! Configuration types.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Relay configuration, read from the environment once at startup.
///
/// Secrets default to empty strings rather than failing fast, so the server
/// can be deployed before tokens are provisioned. `unset_secrets` reports
/// which ones are still missing so startup can warn about them.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Base URL of the Langflow instance.
    pub langflow_api_url: String,
    /// Identifier of the workflow to execute per message.
    pub langflow_workflow_id: String,
    /// Bearer token for the Langflow API.
    pub langflow_api_token: SecretString,
    /// Shared secret for the webhook subscription handshake.
    pub verify_token: SecretString,
    /// Page access token for outbound Messenger delivery.
    pub page_access_token: SecretString,
    /// Port the HTTP server listens on.
    pub port: u16,
}

impl RelayConfig {
    /// Read configuration from the environment. Only a malformed `PORT` is a
    /// startup error; missing secrets are tolerated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let langflow_api_url = std::env::var("LANGFLOW_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let langflow_workflow_id = std::env::var("LANGFLOW_WORKFLOW_ID").unwrap_or_default();

        let langflow_api_token =
            SecretString::from(std::env::var("LANGFLOW_API_TOKEN").unwrap_or_default());

        let verify_token = SecretString::from(
            std::env::var("FACEBOOK_VERIFY_TOKEN")
                .unwrap_or_else(|_| "your_verify_token".to_string()),
        );

        let page_access_token =
            SecretString::from(std::env::var("FACEBOOK_PAGE_ACCESS_TOKEN").unwrap_or_default());

        let port = parse_port(std::env::var("PORT").ok())?;

        Ok(Self {
            langflow_api_url,
            langflow_workflow_id,
            langflow_api_token,
            verify_token,
            page_access_token,
            port,
        })
    }

    /// Names of secret variables that are still unset (empty).
    pub fn unset_secrets(&self) -> Vec<&'static str> {
        let mut unset = Vec::new();
        if self.langflow_api_token.expose_secret().is_empty() {
            unset.push("LANGFLOW_API_TOKEN");
        }
        if self.page_access_token.expose_secret().is_empty() {
            unset.push("FACEBOOK_PAGE_ACCESS_TOKEN");
        }
        unset
    }
}

fn parse_port(raw: Option<String>) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(5000),
        Some(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
            key: "PORT".into(),
            message: format!("not a valid port number: {s}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_config() -> RelayConfig {
        RelayConfig {
            langflow_api_url: "http://localhost:3000".into(),
            langflow_workflow_id: String::new(),
            langflow_api_token: SecretString::from(""),
            verify_token: SecretString::from("your_verify_token"),
            page_access_token: SecretString::from(""),
            port: 5000,
        }
    }

    #[test]
    fn unset_secrets_reports_empty_tokens() {
        let config = empty_config();
        assert_eq!(
            config.unset_secrets(),
            vec!["LANGFLOW_API_TOKEN", "FACEBOOK_PAGE_ACCESS_TOKEN"]
        );
    }

    #[test]
    fn unset_secrets_empty_when_all_set() {
        let config = RelayConfig {
            langflow_api_token: SecretString::from("lf-token"),
            page_access_token: SecretString::from("page-token"),
            ..empty_config()
        };
        assert!(config.unset_secrets().is_empty());
    }

    #[test]
    fn parse_port_defaults_when_unset() {
        assert_eq!(parse_port(None).unwrap(), 5000);
    }

    #[test]
    fn parse_port_accepts_valid_number() {
        assert_eq!(parse_port(Some("8080".into())).unwrap(), 8080);
    }

    #[test]
    fn parse_port_rejects_garbage() {
        let err = parse_port(Some("five-thousand".into())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "PORT"));
    }
}
