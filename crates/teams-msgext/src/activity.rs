//! Inbound Bot Framework activity parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Activity type discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    /// Synchronous request expecting an invoke response
    Invoke,
    /// Chat message
    Message,
    /// Conversation membership change
    ConversationUpdate,
    /// Anything else (catch-all to avoid parse failures)
    #[serde(other)]
    Unknown,
}

/// Channel account (user or bot).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    /// Channel-specific account ID
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Azure AD object ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aad_object_id: Option<String>,
}

/// Conversation the activity belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    /// Conversation ID
    #[serde(default)]
    pub id: String,
    /// Conversation type (personal, channel, groupChat)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_type: Option<String>,
    /// Tenant ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Bot Framework activity (only the fields this service reads).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Activity type
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Invoke name (e.g. `composeExtension/query`)
    #[serde(default)]
    pub name: Option<String>,
    /// Activity ID
    #[serde(default)]
    pub id: Option<String>,
    /// Channel ID (`msteams`)
    #[serde(default)]
    pub channel_id: String,
    /// Connector service URL
    #[serde(default)]
    pub service_url: Option<String>,
    /// Sender
    #[serde(default)]
    pub from: ChannelAccount,
    /// Recipient (the bot)
    #[serde(default)]
    pub recipient: ChannelAccount,
    /// Conversation
    #[serde(default)]
    pub conversation: ConversationAccount,
    /// Teams channel data
    #[serde(default)]
    pub channel_data: Option<Value>,
    /// Invoke payload
    #[serde(default)]
    pub value: Option<Value>,
}

/// SSO token exchange payload attached to an invoke value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeInvokeRequest {
    /// Request ID
    #[serde(default)]
    pub id: Option<String>,
    /// Connection name requested by the client
    #[serde(default)]
    pub connection_name: Option<String>,
    /// Token to exchange
    #[serde(default)]
    pub token: Option<String>,
}

/// Invoke activities this extension answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    /// `composeExtension/queryLink`
    AppBasedLinkQuery,
    /// `composeExtension/query`
    Query,
    /// `composeExtension/selectItem`
    SelectItem,
    /// `composeExtension/fetchTask`
    FetchTask,
    /// `composeExtension/submitAction`
    SubmitAction,
    /// `composeExtension/querySettingUrl`
    QuerySettingUrl,
    /// `composeExtension/setting`
    Setting,
}

impl InvokeKind {
    /// Map an invoke activity name to its kind.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "composeExtension/queryLink" => Some(Self::AppBasedLinkQuery),
            "composeExtension/query" => Some(Self::Query),
            "composeExtension/selectItem" => Some(Self::SelectItem),
            "composeExtension/fetchTask" => Some(Self::FetchTask),
            "composeExtension/submitAction" => Some(Self::SubmitAction),
            "composeExtension/querySettingUrl" => Some(Self::QuerySettingUrl),
            "composeExtension/setting" => Some(Self::Setting),
            _ => None,
        }
    }
}

impl Activity {
    /// Check if this is an invoke activity
    #[must_use]
    pub fn is_invoke(&self) -> bool {
        matches!(self.activity_type, ActivityType::Invoke)
    }

    /// Kind of invoke, if the name is one we handle
    #[must_use]
    pub fn invoke_kind(&self) -> Option<InvokeKind> {
        self.name.as_deref().and_then(InvokeKind::from_name)
    }

    /// Token exchange payload carried in `value.authentication`, if it has a token.
    ///
    /// Presence is decided by `token` alone (falsy values count as absent);
    /// the other fields are read leniently.
    #[must_use]
    pub fn token_exchange_request(&self) -> Option<TokenExchangeInvokeRequest> {
        let auth = self.value.as_ref()?.get("authentication")?;
        let token = match auth.get("token")? {
            Value::Null | Value::Bool(false) => return None,
            Value::String(s) if s.is_empty() => return None,
            Value::Number(n) if n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON) => return None,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let text = |key: &str| auth.get(key).and_then(Value::as_str).map(String::from);

        Some(TokenExchangeInvokeRequest {
            id: text("id"),
            connection_name: text("connectionName"),
            token: Some(token),
        })
    }

    /// Team ID from Teams channel data
    #[must_use]
    pub fn team_id(&self) -> Option<String> {
        self.channel_data_id("team")
    }

    /// Teams channel ID from Teams channel data
    #[must_use]
    pub fn teams_channel_id(&self) -> Option<String> {
        self.channel_data_id("channel")
    }

    fn channel_data_id(&self, key: &str) -> Option<String> {
        self.channel_data
            .as_ref()
            .and_then(|d| d.get(key))
            .and_then(|v| v.get("id"))
            .and_then(Value::as_str)
            .map(String::from)
    }

    /// Conversation reference used when requesting a sign-in link
    #[must_use]
    pub fn conversation_reference(&self) -> Value {
        serde_json::json!({
            "activityId": self.id,
            "user": self.from,
            "bot": self.recipient,
            "conversation": self.conversation,
            "channelId": self.channel_id,
            "serviceUrl": self.service_url,
        })
    }
}
