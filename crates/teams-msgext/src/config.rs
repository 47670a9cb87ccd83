//! Configuration for the messaging extension service.

use std::env;

/// Anonymous sample search service.
pub const DEFAULT_ANON_SERVICE_URL: &str =
    "https://msteamssamples-httpsample.azurewebsites.net/api/HttpSample";
/// Sample search service protected by client-credentials OAuth.
pub const DEFAULT_AUTH_SERVICE_URL: &str =
    "https://msteamssamples-httpsampleauth.azurewebsites.net/api/HttpSampleAuth";
/// Public package registry search.
pub const DEFAULT_PACKAGE_REGISTRY_URL: &str = "https://registry.npmjs.com/-/v1/search";
/// Azure AD authority.
pub const DEFAULT_LOGIN_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
/// Microsoft Graph v1.0.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
/// Bot Framework token service.
pub const DEFAULT_TOKEN_SERVICE_URL: &str = "https://token.botframework.com";

/// Messaging extension configuration.
///
/// Everything is read once from the environment and consumed as-is.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Bot application (client) ID.
    pub app_id: String,
    /// Bot application secret.
    pub app_password: String,
    /// Tenant used to obtain the custom web service token.
    pub tenant_id: String,
    /// OAuth connection name registered on the bot channel.
    pub connection_name: String,
    /// Public base URL hosting the settings page.
    pub site_url: String,
    /// Tenant used to obtain the bot's own token for the token service.
    pub bot_auth_tenant: String,
    /// Bot Framework token service base URL.
    pub token_service_url: String,
    /// Microsoft Graph base URL.
    pub graph_base_url: String,
    /// Azure AD authority base URL.
    pub login_authority_url: String,
    /// Anonymous search endpoint.
    pub anon_service_url: String,
    /// Authenticated search endpoint.
    pub auth_service_url: String,
    /// Package registry search endpoint.
    pub package_registry_url: String,
    /// Team receiving shared messages (falls back to the activity's team).
    pub share_team_id: Option<String>,
    /// Channel receiving shared messages (falls back to the activity's channel).
    pub share_channel_id: Option<String>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3978),
            app_id: env::var("MicrosoftAppId").unwrap_or_default(),
            app_password: env::var("MicrosoftAppPassword").unwrap_or_default(),
            tenant_id: env::var("TenantId").unwrap_or_default(),
            connection_name: env::var("ConnectionName").unwrap_or_default(),
            site_url: env::var("SiteUrl").unwrap_or_default(),
            bot_auth_tenant: var_or("BOT_AUTH_TENANT", "botframework.com"),
            token_service_url: var_or("TOKEN_SERVICE_URL", DEFAULT_TOKEN_SERVICE_URL),
            graph_base_url: var_or("GRAPH_BASE_URL", DEFAULT_GRAPH_BASE_URL),
            login_authority_url: var_or("LOGIN_AUTHORITY_URL", DEFAULT_LOGIN_AUTHORITY_URL),
            anon_service_url: var_or("ANON_SERVICE_URL", DEFAULT_ANON_SERVICE_URL),
            auth_service_url: var_or("AUTH_SERVICE_URL", DEFAULT_AUTH_SERVICE_URL),
            package_registry_url: var_or("PACKAGE_REGISTRY_URL", DEFAULT_PACKAGE_REGISTRY_URL),
            share_team_id: env::var("SHARE_TEAM_ID").ok().filter(|s| !s.is_empty()),
            share_channel_id: env::var("SHARE_CHANNEL_ID").ok().filter(|s| !s.is_empty()),
        }
    }
}

impl Config {
    /// Settings page URL with the current configuration escaped into `settings`.
    #[must_use]
    pub fn settings_page_url(&self, current: &str) -> String {
        format!(
            "{}/public/searchSettings.html?settings={}",
            self.site_url.trim_end_matches('/'),
            escape_setting(current)
        )
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
#[must_use]
pub fn escape_setting(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
