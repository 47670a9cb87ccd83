//! Card attachments (hero, thumbnail, adaptive).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::SearchItem;

/// Hero card content type
pub const HERO_CARD: &str = "application/vnd.microsoft.card.hero";
/// Thumbnail card content type
pub const THUMBNAIL_CARD: &str = "application/vnd.microsoft.card.thumbnail";
/// Adaptive card content type
pub const ADAPTIVE_CARD: &str = "application/vnd.microsoft.card.adaptive";

/// Card image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardImage {
    /// Image URL (may be a data URL)
    pub url: String,
}

/// Card action (button or tap)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardAction {
    /// Action type (`openUrl`, `invoke`, ...)
    #[serde(rename = "type")]
    pub action_type: String,
    /// Action title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Action value
    pub value: Value,
}

impl CardAction {
    /// Open a URL in the browser
    #[must_use]
    pub fn open_url(url: impl Into<String>, title: Option<&str>) -> Self {
        Self {
            action_type: "openUrl".to_string(),
            title: title.map(String::from),
            value: Value::String(url.into()),
        }
    }

    /// Send an invoke activity back to the bot
    #[must_use]
    pub fn invoke(value: Value) -> Self {
        Self {
            action_type: "invoke".to_string(),
            title: None,
            value,
        }
    }
}

/// Hero/thumbnail card body (same shape)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicCard {
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Subtitle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Images
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<CardImage>,
    /// Buttons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<CardAction>,
    /// Tap action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap: Option<CardAction>,
}

/// Card attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// MIME content type
    pub content_type: String,
    /// Card body
    pub content: Value,
}

impl Attachment {
    /// Hero card attachment
    #[must_use]
    pub fn hero(card: &BasicCard) -> Self {
        Self::basic(HERO_CARD, card)
    }

    /// Thumbnail card attachment
    #[must_use]
    pub fn thumbnail(card: &BasicCard) -> Self {
        Self::basic(THUMBNAIL_CARD, card)
    }

    /// Adaptive card attachment
    #[must_use]
    pub fn adaptive(card: Value) -> Self {
        Self {
            content_type: ADAPTIVE_CARD.to_string(),
            content: card,
        }
    }

    fn basic(content_type: &str, card: &BasicCard) -> Self {
        Self {
            content_type: content_type.to_string(),
            // Serializing a plain struct of strings cannot fail
            content: serde_json::to_value(card).unwrap_or(Value::Null),
        }
    }
}

/// Messaging extension attachment: a card plus its list preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionAttachment {
    /// Card inserted into the compose box
    #[serde(flatten)]
    pub card: Attachment,
    /// Card shown in the result list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<Attachment>,
}

impl From<Attachment> for MessagingExtensionAttachment {
    fn from(card: Attachment) -> Self {
        Self {
            card,
            preview: None,
        }
    }
}

/// Hero card pair for a search result; tapping the preview sends `{description}`.
#[must_use]
pub fn search_result_card(item: &SearchItem) -> MessagingExtensionAttachment {
    let card = BasicCard {
        title: Some(item.name.clone()),
        ..BasicCard::default()
    };
    let mut description = serde_json::Map::new();
    if let Some(text) = &item.description {
        description.insert("description".to_string(), Value::String(text.clone()));
    }
    let preview = BasicCard {
        tap: Some(CardAction::invoke(Value::Object(description))),
        ..card.clone()
    };
    MessagingExtensionAttachment {
        card: Attachment::hero(&card),
        preview: Some(Attachment::hero(&preview)),
    }
}

/// Thumbnail card with a title and one image.
#[must_use]
pub fn profile_thumbnail(display_name: &str, photo_url: &str) -> Attachment {
    Attachment::thumbnail(&BasicCard {
        title: Some(display_name.to_string()),
        images: vec![CardImage {
            url: photo_url.to_string(),
        }],
        ..BasicCard::default()
    })
}

/// Thumbnail card carrying only a title.
#[must_use]
pub fn title_thumbnail(title: &str) -> Attachment {
    Attachment::thumbnail(&BasicCard {
        title: Some(title.to_string()),
        ..BasicCard::default()
    })
}

/// Adaptive card greeting the signed-in user with their photo.
#[must_use]
pub fn profile_adaptive_card(display_name: &str, photo_url: &str) -> Attachment {
    Attachment::adaptive(json!({
        "version": "1.0.0",
        "type": "AdaptiveCard",
        "body": [
            { "type": "TextBlock", "text": format!("Hello: {display_name}") },
            { "type": "Image", "url": photo_url }
        ]
    }))
}

/// Adaptive card acknowledging sign-out, with a single Close action.
#[must_use]
pub fn signed_out_card() -> Attachment {
    Attachment::adaptive(json!({
        "version": "1.0.0",
        "type": "AdaptiveCard",
        "body": [
            { "type": "TextBlock", "text": "You have been signed out." }
        ],
        "actions": [
            { "type": "Action.Submit", "title": "Close", "data": { "key": "close" } }
        ]
    }))
}

/// Hero card quoting a shared message.
#[must_use]
pub fn shared_message_card(content: &str) -> Attachment {
    Attachment::hero(&BasicCard {
        title: Some("originally sent this message:".to_string()),
        text: Some(content.to_string()),
        ..BasicCard::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_card_shape() {
        let item = SearchItem {
            name: "widget".to_string(),
            description: Some("A widget".to_string()),
        };
        let value = serde_json::to_value(search_result_card(&item)).unwrap();

        assert_eq!(value["contentType"], HERO_CARD);
        assert_eq!(value["content"]["title"], "widget");
        assert!(value["content"].get("tap").is_none());
        assert_eq!(value["preview"]["contentType"], HERO_CARD);
        assert_eq!(value["preview"]["content"]["title"], "widget");
        assert_eq!(value["preview"]["content"]["tap"]["type"], "invoke");
        assert_eq!(
            value["preview"]["content"]["tap"]["value"]["description"],
            "A widget"
        );
    }

    #[test]
    fn test_search_result_card_without_description() {
        let item = SearchItem {
            name: "bare".to_string(),
            description: None,
        };
        let value = serde_json::to_value(search_result_card(&item)).unwrap();
        assert_eq!(value["preview"]["content"]["tap"]["value"], json!({}));
    }

    #[test]
    fn test_profile_thumbnail() {
        let value = serde_json::to_value(profile_thumbnail("Ada", "data:image/png;base64,AA==")).unwrap();
        assert_eq!(value["contentType"], THUMBNAIL_CARD);
        assert_eq!(value["content"]["title"], "Ada");
        assert_eq!(value["content"]["images"][0]["url"], "data:image/png;base64,AA==");
        assert!(value["content"].get("buttons").is_none());
    }

    #[test]
    fn test_signed_out_card_has_one_action() {
        let card = signed_out_card();
        assert_eq!(card.content_type, ADAPTIVE_CARD);
        let actions = card.content["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0]["title"], "Close");
    }
}
