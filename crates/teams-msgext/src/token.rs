//! User token provider backed by the Bot Framework token service.
//!
//! The token service owns OAuth connections, magic-code verification and SSO
//! token exchange. This module exposes it through [`UserTokenProvider`] so the
//! handler can be exercised against a fake in tests.

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, instrument};

use crate::activity::Activity;
use crate::credentials::{AppCredentials, TokenAudience};
use crate::error::{ensure_success, Result};
use crate::models::TokenResponse;

/// Scope of the bot's own token when calling the token service.
const BOT_FRAMEWORK_SCOPE: &str = "https://api.botframework.com/.default";

/// Identity-provider operations used by the handler.
#[async_trait]
pub trait UserTokenProvider: Send + Sync {
    /// Previously issued token for the caller, `None` when not signed in.
    async fn get_user_token(
        &self,
        activity: &Activity,
        connection_name: &str,
        magic_code: &str,
    ) -> Result<Option<TokenResponse>>;

    /// URL that starts the OAuth sign-in for the caller.
    async fn get_sign_in_link(&self, activity: &Activity, connection_name: &str)
        -> Result<String>;

    /// Revoke the caller's token for the connection.
    async fn sign_out_user(&self, activity: &Activity, connection_name: &str) -> Result<()>;

    /// Exchange an SSO token for a connection token.
    async fn exchange_token(
        &self,
        activity: &Activity,
        connection_name: &str,
        user_id: &str,
        token: &str,
    ) -> Result<Option<TokenResponse>>;
}

/// Bot Framework token service REST client.
#[derive(Debug, Clone)]
pub struct BotTokenClient {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    credentials: AppCredentials,
}

impl BotTokenClient {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        app_id: &str,
        credentials: AppCredentials,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn bot_token(&self) -> Result<String> {
        self.credentials
            .acquire(&TokenAudience::Scope(BOT_FRAMEWORK_SCOPE.to_string()))
            .await
    }

    /// Base64 state the token service echoes back through the sign-in flow.
    fn sign_in_state(&self, activity: &Activity, connection_name: &str) -> String {
        let state = json!({
            "ConnectionName": connection_name,
            "Conversation": activity.conversation_reference(),
            "RelatesTo": null,
            "MsAppId": self.app_id,
        });
        base64::engine::general_purpose::STANDARD.encode(state.to_string())
    }
}

#[async_trait]
impl UserTokenProvider for BotTokenClient {
    #[instrument(skip(self, activity, magic_code), fields(user_id = %activity.from.id))]
    async fn get_user_token(
        &self,
        activity: &Activity,
        connection_name: &str,
        magic_code: &str,
    ) -> Result<Option<TokenResponse>> {
        let bot_token = self.bot_token().await?;
        let mut query = vec![
            ("userId", activity.from.id.as_str()),
            ("connectionName", connection_name),
            ("channelId", activity.channel_id.as_str()),
        ];
        if !magic_code.is_empty() {
            query.push(("code", magic_code));
        }

        let response = self
            .client
            .get(self.url("/api/usertoken/GetToken"))
            .bearer_auth(bot_token)
            .query(&query)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No user token stored");
            return Ok(None);
        }
        let response = ensure_success("Token service", response).await?;
        let token: TokenResponse = response.json().await?;
        debug!(has_token = token.bearer().is_some(), "Fetched user token");
        Ok(Some(token))
    }

    #[instrument(skip(self, activity), fields(user_id = %activity.from.id))]
    async fn get_sign_in_link(
        &self,
        activity: &Activity,
        connection_name: &str,
    ) -> Result<String> {
        let bot_token = self.bot_token().await?;
        let state = self.sign_in_state(activity, connection_name);

        let response = self
            .client
            .get(self.url("/api/botsignin/GetSignInUrl"))
            .bearer_auth(bot_token)
            .query(&[("state", state.as_str())])
            .send()
            .await?;
        let response = ensure_success("Token service", response).await?;

        // Plain text, occasionally JSON-quoted
        let body = response.text().await?;
        Ok(body.trim().trim_matches('"').to_string())
    }

    #[instrument(skip(self, activity), fields(user_id = %activity.from.id))]
    async fn sign_out_user(&self, activity: &Activity, connection_name: &str) -> Result<()> {
        let bot_token = self.bot_token().await?;
        let response = self
            .client
            .delete(self.url("/api/usertoken/SignOut"))
            .bearer_auth(bot_token)
            .query(&[
                ("userId", activity.from.id.as_str()),
                ("connectionName", connection_name),
                ("channelId", activity.channel_id.as_str()),
            ])
            .send()
            .await?;
        ensure_success("Token service", response).await?;
        Ok(())
    }

    #[instrument(skip(self, activity, token))]
    async fn exchange_token(
        &self,
        activity: &Activity,
        connection_name: &str,
        user_id: &str,
        token: &str,
    ) -> Result<Option<TokenResponse>> {
        let bot_token = self.bot_token().await?;
        let response = self
            .client
            .post(self.url("/api/usertoken/exchange"))
            .bearer_auth(bot_token)
            .query(&[
                ("userId", user_id),
                ("connectionName", connection_name),
                ("channelId", activity.channel_id.as_str()),
            ])
            .json(&json!({ "token": token }))
            .send()
            .await?;
        let response = ensure_success("Token service", response).await?;
        let exchanged: TokenResponse = response.json().await?;
        Ok(Some(exchanged))
    }
}
