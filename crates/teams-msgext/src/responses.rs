//! Invoke response payloads (compose extension results and task modules).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cards::{Attachment, CardAction, MessagingExtensionAttachment};

/// Title of the sign-in suggested action.
pub const SIGN_IN_ACTION_TITLE: &str = "Bot Service OAuth";

/// Compose extension result type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultType {
    /// Sign-in required (link unfurling)
    Auth,
    /// Sign-in required (search, task fetch)
    SilentAuth,
    /// Open the configuration page
    Config,
    /// Card results
    Result,
}

/// Suggested actions container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedActions {
    /// Actions
    pub actions: Vec<CardAction>,
}

/// `composeExtension` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionResult {
    /// Result type
    #[serde(rename = "type")]
    pub result_type: ResultType,
    /// `list` or `grid`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_layout: Option<String>,
    /// Result cards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<MessagingExtensionAttachment>>,
    /// Auth/config actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<SuggestedActions>,
}

/// Messaging extension invoke response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionResponse {
    /// Compose extension result
    pub compose_extension: MessagingExtensionResult,
}

impl MessagingExtensionResponse {
    /// Card list result
    #[must_use]
    pub fn result(attachments: Vec<MessagingExtensionAttachment>) -> Self {
        Self {
            compose_extension: MessagingExtensionResult {
                result_type: ResultType::Result,
                attachment_layout: Some("list".to_string()),
                attachments: Some(attachments),
                suggested_actions: None,
            },
        }
    }

    /// Sign-in prompt carrying one `openUrl` action
    #[must_use]
    pub fn sign_in(result_type: ResultType, sign_in_link: String) -> Self {
        Self::suggested(
            result_type,
            CardAction::open_url(sign_in_link, Some(SIGN_IN_ACTION_TITLE)),
        )
    }

    /// Configuration page prompt
    #[must_use]
    pub fn config(settings_url: String) -> Self {
        Self::suggested(ResultType::Config, CardAction::open_url(settings_url, None))
    }

    fn suggested(result_type: ResultType, action: CardAction) -> Self {
        Self {
            compose_extension: MessagingExtensionResult {
                result_type,
                attachment_layout: None,
                attachments: None,
                suggested_actions: Some(SuggestedActions {
                    actions: vec![action],
                }),
            },
        }
    }
}

/// Task module dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskModuleTaskInfo {
    /// Embedded card
    pub card: Attachment,
    /// Height in pixels
    pub height: u32,
    /// Width in pixels
    pub width: u32,
    /// Dialog title
    pub title: String,
}

/// Task module body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskModuleContinue {
    /// Always `continue`
    #[serde(rename = "type")]
    pub response_type: String,
    /// Dialog
    pub value: TaskModuleTaskInfo,
}

/// Task module invoke response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskModuleResponse {
    /// Task body
    pub task: TaskModuleContinue,
}

impl TaskModuleResponse {
    /// Show a card in a dialog
    #[must_use]
    pub fn continue_with(card: Attachment, height: u32, width: u32, title: &str) -> Self {
        Self {
            task: TaskModuleContinue {
                response_type: "continue".to_string(),
                value: TaskModuleTaskInfo {
                    card,
                    height,
                    width,
                    title: title.to_string(),
                },
            },
        }
    }
}

/// Response to an invoke activity, written back as the HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeResponse {
    /// HTTP status
    pub status: u16,
    /// JSON body; `None` writes no body
    pub body: Option<Value>,
}

impl InvokeResponse {
    /// `200` with a body
    pub fn ok(body: impl Serialize) -> crate::Result<Self> {
        Ok(Self {
            status: 200,
            body: Some(serde_json::to_value(body)?),
        })
    }

    /// `200` without a body
    #[must_use]
    pub const fn empty() -> Self {
        Self::status(200)
    }

    /// Bare status
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self { status, body: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sign_in_payload() {
        let response =
            MessagingExtensionResponse::sign_in(ResultType::SilentAuth, "https://sign.in".into());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "composeExtension": {
                    "type": "silentAuth",
                    "suggestedActions": {
                        "actions": [
                            { "type": "openUrl", "value": "https://sign.in", "title": "Bot Service OAuth" }
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_config_payload_has_untitled_action() {
        let value =
            serde_json::to_value(MessagingExtensionResponse::config("https://x/s".into())).unwrap();
        assert_eq!(value["composeExtension"]["type"], "config");
        let action = &value["composeExtension"]["suggestedActions"]["actions"][0];
        assert_eq!(action["type"], "openUrl");
        assert!(action.get("title").is_none());
    }

    #[test]
    fn test_empty_result_payload() {
        let value = serde_json::to_value(MessagingExtensionResponse::result(vec![])).unwrap();
        assert_eq!(
            value,
            json!({ "composeExtension": { "type": "result", "attachmentLayout": "list", "attachments": [] } })
        );
    }

    #[test]
    fn test_task_module_payload() {
        let card = Attachment::adaptive(json!({ "type": "AdaptiveCard" }));
        let value =
            serde_json::to_value(TaskModuleResponse::continue_with(card, 200, 400, "T")).unwrap();
        assert_eq!(value["task"]["type"], "continue");
        assert_eq!(value["task"]["value"]["height"], 200);
        assert_eq!(value["task"]["value"]["width"], 400);
        assert_eq!(value["task"]["value"]["title"], "T");
        assert_eq!(
            value["task"]["value"]["card"]["contentType"],
            crate::cards::ADAPTIVE_CARD
        );
    }
}
