//! Messaging extension handlers: search, configuration and action commands.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::activity::Activity;
use crate::cards::{
    profile_adaptive_card, profile_thumbnail, search_result_card, shared_message_card,
    signed_out_card, title_thumbnail, MessagingExtensionAttachment,
};
use crate::config::Config;
use crate::error::Result;
use crate::graph::GraphClient;
use crate::models::{
    magic_code, AppBasedLinkQuery, GraphProfile, MessagingExtensionAction,
    MessagingExtensionQuery,
};
use crate::responses::{InvokeResponse, MessagingExtensionResponse, ResultType, TaskModuleResponse};
use crate::search::{SearchClient, SearchMode};
use crate::store::UserConfigStore;
use crate::token::UserTokenProvider;

/// Command IDs handled by `composeExtension/fetchTask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCommand {
    /// `SHOWPROFILE`
    ShowProfile,
    /// `SignOutCommand`
    SignOut,
    /// `shareMessage`
    ShareMessage,
    /// Anything else
    Other,
}

impl ActionCommand {
    #[must_use]
    pub fn from_command_id(command_id: &str) -> Self {
        match command_id {
            "SHOWPROFILE" => Self::ShowProfile,
            "SignOutCommand" => Self::SignOut,
            "shareMessage" => Self::ShareMessage,
            _ => Self::Other,
        }
    }
}

/// Outcome of sign-in resolution.
#[derive(Debug)]
pub enum SignIn {
    /// User token for the configured connection
    Token(String),
    /// Not signed in yet; send this prompt back
    Prompt(MessagingExtensionResponse),
}

/// Handler for every invoke this extension answers.
pub struct SearchAuthConfigHandler {
    config: Config,
    store: Arc<dyn UserConfigStore>,
    tokens: Arc<dyn UserTokenProvider>,
    search: SearchClient,
    graph: GraphClient,
}

impl SearchAuthConfigHandler {
    /// Build the handler; search backends and Graph share `client`.
    #[must_use]
    pub fn new(
        config: Config,
        store: Arc<dyn UserConfigStore>,
        tokens: Arc<dyn UserTokenProvider>,
        client: reqwest::Client,
    ) -> Self {
        let search = SearchClient::new(client.clone(), &config);
        let graph = GraphClient::new(client, &config.graph_base_url);
        Self {
            config,
            store,
            tokens,
            search,
            graph,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &dyn UserTokenProvider {
        self.tokens.as_ref()
    }

    async fn user_setting(&self, activity: &Activity) -> Result<String> {
        Ok(self.store.get(&activity.from.id).await?.unwrap_or_default())
    }

    /// Look up the caller's token; without one, build a sign-in prompt.
    pub async fn resolve_sign_in(
        &self,
        activity: &Activity,
        state: Option<&str>,
        prompt_type: ResultType,
    ) -> Result<SignIn> {
        let code = magic_code(state);
        let connection = &self.config.connection_name;

        let token = self
            .tokens
            .get_user_token(activity, connection, code)
            .await?
            .and_then(|t| t.bearer().map(String::from));

        if let Some(token) = token {
            return Ok(SignIn::Token(token));
        }

        debug!(user_id = %activity.from.id, "User not signed in, sending sign-in link");
        let link = self.tokens.get_sign_in_link(activity, connection).await?;
        Ok(SignIn::Prompt(MessagingExtensionResponse::sign_in(
            prompt_type,
            link,
        )))
    }

    async fn profile_with_photo(&self, token: &str) -> Result<(GraphProfile, String)> {
        let profile = self.graph.get_my_profile(token).await?;
        let photo = self.graph.get_photo_data_url(token).await?;
        Ok((profile, photo))
    }

    /// `composeExtension/queryLink`
    pub async fn on_app_based_link_query(
        &self,
        activity: &Activity,
        query: AppBasedLinkQuery,
    ) -> Result<InvokeResponse> {
        let token = match self
            .resolve_sign_in(activity, query.state.as_deref(), ResultType::Auth)
            .await?
        {
            SignIn::Token(token) => token,
            SignIn::Prompt(prompt) => return InvokeResponse::ok(prompt),
        };

        let (profile, photo) = self.profile_with_photo(&token).await?;
        let card = profile_thumbnail(&profile.display_name, &photo);
        InvokeResponse::ok(MessagingExtensionResponse::result(vec![card.into()]))
    }

    /// `composeExtension/querySettingUrl`
    pub async fn on_query_setting_url(&self, activity: &Activity) -> Result<InvokeResponse> {
        let setting = self.user_setting(activity).await?;
        let url = self.config.settings_page_url(&setting);
        InvokeResponse::ok(MessagingExtensionResponse::config(url))
    }

    /// `composeExtension/setting`
    pub async fn on_setting(
        &self,
        activity: &Activity,
        settings: MessagingExtensionQuery,
    ) -> Result<InvokeResponse> {
        if let Some(state) = settings.state {
            info!(user_id = %activity.from.id, setting = %state, "Saving user configuration");
            self.store.set(&activity.from.id, state).await?;
        }
        Ok(InvokeResponse::empty())
    }

    /// `composeExtension/query`
    pub async fn on_query(
        &self,
        activity: &Activity,
        query: MessagingExtensionQuery,
    ) -> Result<InvokeResponse> {
        let search_text = query.search_text();
        let setting = self.user_setting(activity).await?;
        let mode = SearchMode::from_setting(&setting);

        info!(
            user_id = %activity.from.id,
            mode = mode.as_str(),
            query = %search_text,
            "Running messaging extension search"
        );

        let attachments: Vec<MessagingExtensionAttachment> = match mode {
            SearchMode::Profile => {
                let token = match self
                    .resolve_sign_in(activity, query.state.as_deref(), ResultType::SilentAuth)
                    .await?
                {
                    SignIn::Token(token) => token,
                    SignIn::Prompt(prompt) => return InvokeResponse::ok(prompt),
                };
                let (profile, photo) = self.profile_with_photo(&token).await?;
                vec![profile_thumbnail(&profile.display_name, &photo).into()]
            }
            SearchMode::CustomWebServiceAnon => self
                .search
                .search_anonymous(&search_text)
                .await?
                .iter()
                .map(search_result_card)
                .collect(),
            SearchMode::CustomWebServiceAuth => self
                .search
                .search_authenticated(&search_text)
                .await?
                .iter()
                .map(search_result_card)
                .collect(),
            SearchMode::PackageRegistry => self
                .search
                .search_registry(&search_text)
                .await?
                .iter()
                .map(search_result_card)
                .collect(),
        };

        InvokeResponse::ok(MessagingExtensionResponse::result(attachments))
    }

    /// `composeExtension/selectItem`
    pub fn on_select_item(&self, item: &Value) -> Result<InvokeResponse> {
        let description = item
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let card = title_thumbnail(description);
        InvokeResponse::ok(MessagingExtensionResponse::result(vec![card.into()]))
    }

    /// `composeExtension/fetchTask`
    pub async fn on_fetch_task(
        &self,
        activity: &Activity,
        action: MessagingExtensionAction,
    ) -> Result<InvokeResponse> {
        match ActionCommand::from_command_id(&action.command_id) {
            ActionCommand::ShowProfile => {
                let token = match self
                    .resolve_sign_in(activity, action.state.as_deref(), ResultType::SilentAuth)
                    .await?
                {
                    SignIn::Token(token) => token,
                    SignIn::Prompt(prompt) => return InvokeResponse::ok(prompt),
                };
                let (profile, photo) = self.profile_with_photo(&token).await?;
                let card = profile_adaptive_card(&profile.display_name, &photo);
                InvokeResponse::ok(TaskModuleResponse::continue_with(
                    card,
                    250,
                    400,
                    "Show Profile Card",
                ))
            }
            ActionCommand::SignOut => {
                self.tokens
                    .sign_out_user(activity, &self.config.connection_name)
                    .await?;
                info!(user_id = %activity.from.id, "User signed out");
                InvokeResponse::ok(TaskModuleResponse::continue_with(
                    signed_out_card(),
                    200,
                    400,
                    "Adaptive Card: Inputs",
                ))
            }
            ActionCommand::ShareMessage => match self.share_message(activity, &action).await? {
                Some(prompt) => InvokeResponse::ok(prompt),
                None => Ok(InvokeResponse::empty()),
            },
            ActionCommand::Other => {
                debug!(command_id = %action.command_id, "Ignoring unknown fetchTask command");
                Ok(InvokeResponse::empty())
            }
        }
    }

    /// `composeExtension/submitAction`
    pub async fn on_submit_action(
        &self,
        activity: &Activity,
        action: MessagingExtensionAction,
    ) -> Result<InvokeResponse> {
        match ActionCommand::from_command_id(&action.command_id) {
            ActionCommand::ShareMessage => match self.share_message(activity, &action).await? {
                Some(prompt) => InvokeResponse::ok(prompt),
                None => InvokeResponse::ok(json!({})),
            },
            _ => InvokeResponse::ok(json!({})),
        }
    }

    /// Re-post the message an action was invoked on, as the signed-in user.
    ///
    /// Returns the sign-in prompt when the user has no token yet.
    pub async fn share_message(
        &self,
        activity: &Activity,
        action: &MessagingExtensionAction,
    ) -> Result<Option<MessagingExtensionResponse>> {
        let token = match self
            .resolve_sign_in(activity, action.state.as_deref(), ResultType::SilentAuth)
            .await?
        {
            SignIn::Token(token) => token,
            SignIn::Prompt(prompt) => return Ok(Some(prompt)),
        };

        let team_id = self.config.share_team_id.clone().or_else(|| activity.team_id());
        let channel_id = self
            .config
            .share_channel_id
            .clone()
            .or_else(|| activity.teams_channel_id());
        let (Some(team_id), Some(channel_id)) = (team_id, channel_id) else {
            warn!(
                user_id = %activity.from.id,
                "No team/channel to share into, skipping shareMessage"
            );
            return Ok(None);
        };

        let content = action
            .message_payload
            .as_ref()
            .map(|m| m.content().to_string())
            .unwrap_or_default();

        let sent = self
            .graph
            .send_channel_message(&token, &team_id, &channel_id, &shared_message_card(&content))
            .await?;

        info!(
            team_id = %team_id,
            channel_id = %channel_id,
            message_id = ?sent.get("id"),
            "Shared message to channel"
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_command_ids() {
        assert_eq!(
            ActionCommand::from_command_id("SHOWPROFILE"),
            ActionCommand::ShowProfile
        );
        assert_eq!(
            ActionCommand::from_command_id("SignOutCommand"),
            ActionCommand::SignOut
        );
        assert_eq!(
            ActionCommand::from_command_id("shareMessage"),
            ActionCommand::ShareMessage
        );
        assert_eq!(
            ActionCommand::from_command_id("showprofile"),
            ActionCommand::Other
        );
    }
}
