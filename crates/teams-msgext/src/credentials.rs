//! Azure AD client-credentials token acquisition.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{ensure_success, BotError, Result};

/// What the requested token is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAudience {
    /// v1 endpoint (`/oauth2/token`) with a `resource`
    Resource(String),
    /// v2 endpoint (`/oauth2/v2.0/token`) with a `scope`
    Scope(String),
}

/// Application credentials for the client-credentials grant.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    client: reqwest::Client,
    authority_url: String,
    tenant: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
}

impl AppCredentials {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        authority_url: &str,
        tenant: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Self {
        Self {
            client,
            authority_url: authority_url.trim_end_matches('/').to_string(),
            tenant: tenant.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    fn token_url(&self, audience: &TokenAudience) -> String {
        match audience {
            TokenAudience::Resource(_) => {
                format!("{}/{}/oauth2/token", self.authority_url, self.tenant)
            }
            TokenAudience::Scope(_) => {
                format!("{}/{}/oauth2/v2.0/token", self.authority_url, self.tenant)
            }
        }
    }

    /// Request a fresh access token. Nothing is cached.
    #[instrument(skip(self), fields(tenant = %self.tenant))]
    pub async fn acquire(&self, audience: &TokenAudience) -> Result<String> {
        let (key, value) = match audience {
            TokenAudience::Resource(resource) => ("resource", resource.as_str()),
            TokenAudience::Scope(scope) => ("scope", scope.as_str()),
        };
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            (key, value),
        ];

        let response = self
            .client
            .post(self.token_url(audience))
            .form(&form)
            .send()
            .await?;
        let response = ensure_success("Azure AD token endpoint", response).await?;

        let payload: AccessTokenResponse = response.json().await?;
        let token = payload
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BotError::Authentication("missing access_token".into()))?;

        debug!("Acquired client-credentials token");
        Ok(token)
    }
}
