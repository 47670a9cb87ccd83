//! Invoke payload and external service type definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messaging extension query parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionParameter {
    /// Parameter name
    #[serde(default)]
    pub name: String,
    /// Parameter value
    #[serde(default)]
    pub value: Value,
}

/// Paging options sent with a query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionQueryOptions {
    /// Number of entries to skip
    #[serde(default)]
    pub skip: Option<u32>,
    /// Number of entries to return
    #[serde(default)]
    pub count: Option<u32>,
}

/// `composeExtension/query`, `querySettingUrl` and `setting` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionQuery {
    /// Command ID from the app manifest
    #[serde(default)]
    pub command_id: Option<String>,
    /// Query parameters
    #[serde(default)]
    pub parameters: Vec<MessagingExtensionParameter>,
    /// Paging options
    #[serde(default)]
    pub query_options: Option<MessagingExtensionQueryOptions>,
    /// Magic code or settings-page payload
    #[serde(default)]
    pub state: Option<String>,
}

impl MessagingExtensionQuery {
    /// Search text (value of the first parameter)
    #[must_use]
    pub fn search_text(&self) -> String {
        match self.parameters.first().map(|p| &p.value) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// `composeExtension/queryLink` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppBasedLinkQuery {
    /// Link that was unfurled
    #[serde(default)]
    pub url: Option<String>,
    /// Magic code
    #[serde(default)]
    pub state: Option<String>,
}

/// `composeExtension/fetchTask` and `submitAction` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionAction {
    /// Command ID from the app manifest
    #[serde(default)]
    pub command_id: String,
    /// Where the command was invoked (compose, commandBox, message)
    #[serde(default)]
    pub command_context: Option<String>,
    /// Magic code
    #[serde(default)]
    pub state: Option<String>,
    /// Message the action was invoked on
    #[serde(default)]
    pub message_payload: Option<MessageActionsPayload>,
    /// Task module submission data
    #[serde(default)]
    pub data: Option<Value>,
}

/// Message an action command was invoked on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageActionsPayload {
    /// Message ID
    #[serde(default)]
    pub id: Option<String>,
    /// Message body
    #[serde(default)]
    pub body: Option<MessageActionsPayloadBody>,
    /// Sender
    #[serde(default)]
    pub from: Option<Value>,
}

/// Message body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageActionsPayloadBody {
    /// `html` or `text`
    #[serde(default)]
    pub content_type: Option<String>,
    /// Body content
    #[serde(default)]
    pub content: Option<String>,
}

impl MessageActionsPayload {
    /// Body content, empty if missing
    #[must_use]
    pub fn content(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.content.as_deref())
            .unwrap_or("")
    }
}

/// User token issued by the token service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Channel ID
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Connection name
    #[serde(default)]
    pub connection_name: Option<String>,
    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,
    /// Expiration (ISO 8601)
    #[serde(default)]
    pub expiration: Option<String>,
}

impl TokenResponse {
    /// Token if present and non-empty
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Extract the OAuth magic code from an invoke `state`.
///
/// Only integer-valued states count; anything else yields an empty code.
#[must_use]
pub fn magic_code(state: Option<&str>) -> &str {
    match state {
        Some(s) if !s.is_empty() && is_integer_literal(s) => s,
        _ => "",
    }
}

/// Whether `state` reads as an integer numeric literal.
///
/// Blank input counts as zero; `0x`, `0o` and `0b` prefixes are accepted
/// without a sign.
fn is_integer_literal(state: &str) -> bool {
    let trimmed = state.trim();
    if trimmed.is_empty() {
        return true;
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }

    trimmed
        .parse::<f64>()
        .is_ok_and(|n| n.is_finite() && n.fract() == 0.0)
}

/// Graph `/me` profile (fields used by the cards)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphProfile {
    /// Object ID
    #[serde(default)]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub display_name: String,
    /// Mail address
    #[serde(default)]
    pub mail: Option<String>,
    /// UPN
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

/// Item returned by a search backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    /// Item name (card title)
    pub name: String,
    /// Item description (shown on select)
    #[serde(default)]
    pub description: Option<String>,
}

/// Sample web service response: `{ objects: [ { item } ] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleServiceResponse {
    /// Result objects
    #[serde(default)]
    pub objects: Vec<SampleServiceObject>,
}

/// Sample web service result object
#[derive(Debug, Clone, Deserialize)]
pub struct SampleServiceObject {
    /// Result item
    pub item: SearchItem,
}

/// Package registry response: `{ objects: [ { package } ] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrySearchResponse {
    /// Result objects
    #[serde(default)]
    pub objects: Vec<RegistrySearchObject>,
}

/// Package registry result object
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySearchObject {
    /// Package metadata
    pub package: SearchItem,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_code() {
        assert_eq!(magic_code(Some("123456")), "123456");
        assert_eq!(magic_code(Some(" 42 ")), " 42 ");
        assert_eq!(magic_code(Some("1e3")), "1e3");
        assert_eq!(magic_code(Some("12.5")), "");
        assert_eq!(magic_code(Some("profile")), "");
        assert_eq!(magic_code(Some("NaN")), "");
        assert_eq!(magic_code(Some("")), "");
        assert_eq!(magic_code(None), "");
    }

    #[test]
    fn test_magic_code_blank_and_prefixed_literals() {
        assert_eq!(magic_code(Some("  ")), "  ");
        assert_eq!(magic_code(Some("0x10")), "0x10");
        assert_eq!(magic_code(Some("0b101")), "0b101");
        assert_eq!(magic_code(Some("0o17")), "0o17");
        assert_eq!(magic_code(Some("0x")), "");
        assert_eq!(magic_code(Some("0xZZ")), "");
        assert_eq!(magic_code(Some("0b102")), "");
        assert_eq!(magic_code(Some("-0x10")), "");
        assert_eq!(magic_code(Some("Infinity")), "");
    }

    #[test]
    fn test_search_text() {
        let query: MessagingExtensionQuery = serde_json::from_str(
            r#"{ "commandId": "searchQuery", "parameters": [ { "name": "searchQuery", "value": "widget" } ] }"#,
        )
        .unwrap();
        assert_eq!(query.search_text(), "widget");

        let empty = MessagingExtensionQuery::default();
        assert_eq!(empty.search_text(), "");
    }

    #[test]
    fn test_token_response_bearer() {
        let token: TokenResponse =
            serde_json::from_str(r#"{ "connectionName": "c", "token": "abc" }"#).unwrap();
        assert_eq!(token.bearer(), Some("abc"));

        let blank: TokenResponse = serde_json::from_str(r#"{ "token": "" }"#).unwrap();
        assert_eq!(blank.bearer(), None);
    }

    #[test]
    fn test_parse_registry_response() {
        let json = r#"{
            "objects": [
                { "package": { "name": "left-pad", "description": "pads" }, "score": {} },
                { "package": { "name": "no-desc" } }
            ],
            "total": 2
        }"#;
        let response: RegistrySearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.objects.len(), 2);
        assert_eq!(response.objects[0].package.name, "left-pad");
        assert!(response.objects[1].package.description.is_none());
    }

    #[test]
    fn test_message_payload_content() {
        let action: MessagingExtensionAction = serde_json::from_str(
            r#"{ "commandId": "shareMessage", "messagePayload": { "body": { "contentType": "html", "content": "<p>hi</p>" } } }"#,
        )
        .unwrap();
        assert_eq!(action.message_payload.unwrap().content(), "<p>hi</p>");
    }
}
