//! Search backends selected by the per-user configuration string.

use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::credentials::{AppCredentials, TokenAudience};
use crate::error::{ensure_success, Result};
use crate::models::{RegistrySearchResponse, SampleServiceResponse, SearchItem};

/// Page size requested from the package registry.
pub const REGISTRY_PAGE_SIZE: u32 = 8;

/// Backend chosen for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Signed-in user's Graph profile
    Profile,
    /// Anonymous sample web service
    CustomWebServiceAnon,
    /// Sample web service behind client credentials
    CustomWebServiceAuth,
    /// Public package registry
    PackageRegistry,
}

impl SearchMode {
    /// Resolve a stored configuration value.
    ///
    /// Substring match, first hit wins in the order profile, anon, auth.
    #[must_use]
    pub fn from_setting(setting: &str) -> Self {
        if setting.contains("profile") {
            Self::Profile
        } else if setting.contains("customwebserviceanon") {
            Self::CustomWebServiceAnon
        } else if setting.contains("customwebserviceauth") {
            Self::CustomWebServiceAuth
        } else {
            Self::PackageRegistry
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::CustomWebServiceAnon => "customwebserviceanon",
            Self::CustomWebServiceAuth => "customwebserviceauth",
            Self::PackageRegistry => "registry",
        }
    }
}

/// HTTP search backends (everything except the Graph profile).
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    anon_service_url: String,
    auth_service_url: String,
    package_registry_url: String,
    app_id: String,
    credentials: AppCredentials,
}

impl SearchClient {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        let credentials = AppCredentials::new(
            client.clone(),
            &config.login_authority_url,
            &config.tenant_id,
            &config.app_id,
            &config.app_password,
        );
        Self {
            client,
            anon_service_url: config.anon_service_url.clone(),
            auth_service_url: config.auth_service_url.clone(),
            package_registry_url: config.package_registry_url.clone(),
            app_id: config.app_id.clone(),
            credentials,
        }
    }

    /// Query the anonymous sample service with `name=<query>`.
    #[instrument(skip(self))]
    pub async fn search_anonymous(&self, query: &str) -> Result<Vec<SearchItem>> {
        let response = self
            .client
            .get(&self.anon_service_url)
            .query(&[("name", query)])
            .send()
            .await?;
        let response = ensure_success("Anonymous search service", response).await?;
        let body: SampleServiceResponse = response.json().await?;

        debug!(count = body.objects.len(), "Anonymous search results");
        Ok(body.objects.into_iter().map(|o| o.item).collect())
    }

    /// Acquire a service token, then query the authenticated sample service.
    #[instrument(skip(self))]
    pub async fn search_authenticated(&self, query: &str) -> Result<Vec<SearchItem>> {
        let token = self
            .credentials
            .acquire(&TokenAudience::Resource(self.app_id.clone()))
            .await?;
        info!("Acquired custom web service token");

        let response = self
            .client
            .get(&self.auth_service_url)
            .query(&[("name", query)])
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success("Authenticated search service", response).await?;
        let body: SampleServiceResponse = response.json().await?;

        debug!(count = body.objects.len(), "Authenticated search results");
        Ok(body.objects.into_iter().map(|o| o.item).collect())
    }

    /// Query the package registry with `text=<query>&size=8`.
    #[instrument(skip(self))]
    pub async fn search_registry(&self, query: &str) -> Result<Vec<SearchItem>> {
        let size = REGISTRY_PAGE_SIZE.to_string();
        let response = self
            .client
            .get(&self.package_registry_url)
            .query(&[("text", query), ("size", size.as_str())])
            .send()
            .await?;
        let response = ensure_success("Package registry", response).await?;
        let body: RegistrySearchResponse = response.json().await?;

        debug!(count = body.objects.len(), "Registry search results");
        Ok(body.objects.into_iter().map(|o| o.package).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_setting() {
        assert_eq!(SearchMode::from_setting("profile"), SearchMode::Profile);
        assert_eq!(
            SearchMode::from_setting("customwebserviceanon"),
            SearchMode::CustomWebServiceAnon
        );
        assert_eq!(
            SearchMode::from_setting("customwebserviceauth"),
            SearchMode::CustomWebServiceAuth
        );
        assert_eq!(SearchMode::from_setting(""), SearchMode::PackageRegistry);
    }

    #[test]
    fn test_mode_unrecognized_values_fall_through() {
        for setting in ["npm", "Profile", "customwebservice", "PROFILE", "anon", "{}"] {
            assert_eq!(
                SearchMode::from_setting(setting),
                SearchMode::PackageRegistry,
                "{setting}"
            );
        }
    }

    #[test]
    fn test_mode_substring_and_precedence() {
        assert_eq!(SearchMode::from_setting("my-profile-v2"), SearchMode::Profile);
        assert_eq!(
            SearchMode::from_setting("customwebserviceauth,profile"),
            SearchMode::Profile
        );
        assert_eq!(
            SearchMode::from_setting("customwebserviceauth customwebserviceanon"),
            SearchMode::CustomWebServiceAnon
        );
    }
}
