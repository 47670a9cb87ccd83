//! Invoke routing and the token-exchange de-duplication guard.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::activity::{Activity, InvokeKind};
use crate::error::{BotError, Result};
use crate::handler::SearchAuthConfigHandler;
use crate::responses::InvokeResponse;

/// Status returned when an SSO token cannot be exchanged (duplicate request).
pub const PRECONDITION_FAILED: u16 = 412;

/// Status returned for invoke names this extension does not handle.
pub const NOT_IMPLEMENTED: u16 = 501;

/// Entry point for one invoke activity.
///
/// Activities carrying an SSO token are only dispatched when the token can be
/// exchanged; otherwise the turn is rejected with `412`.
pub async fn on_invoke_activity(
    handler: &SearchAuthConfigHandler,
    activity: &Activity,
) -> Result<InvokeResponse> {
    info!(
        name = activity.name.as_deref().unwrap_or(""),
        user_id = %activity.from.id,
        "Received invoke"
    );

    if activity.token_exchange_request().is_some() && !token_is_exchangeable(handler, activity).await
    {
        warn!(user_id = %activity.from.id, "Token not exchangeable, rejecting invoke");
        return Ok(InvokeResponse::status(PRECONDITION_FAILED));
    }

    dispatch_invoke(handler, activity).await
}

/// Try the SSO exchange; any failure counts as not exchangeable.
pub async fn token_is_exchangeable(
    handler: &SearchAuthConfigHandler,
    activity: &Activity,
) -> bool {
    let Some(request) = activity.token_exchange_request() else {
        return false;
    };
    let token = request.token.unwrap_or_default();

    let exchanged = handler
        .tokens()
        .exchange_token(
            activity,
            &handler.config().connection_name,
            &activity.from.id,
            &token,
        )
        .await;

    match exchanged {
        Ok(Some(response)) if response.bearer().is_some() => {
            debug!(user_id = %activity.from.id, "Exchanged SSO token");
            true
        }
        Ok(_) => {
            debug!(user_id = %activity.from.id, "Token exchange returned no token");
            false
        }
        Err(e) => {
            debug!(user_id = %activity.from.id, error = %e, "Token exchange failed");
            false
        }
    }
}

fn invoke_value<T: DeserializeOwned + Default>(activity: &Activity) -> Result<T> {
    match &activity.value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| BotError::invalid_activity(format!("malformed invoke value: {e}"))),
    }
}

/// Route an invoke to exactly one handler by activity name.
pub async fn dispatch_invoke(
    handler: &SearchAuthConfigHandler,
    activity: &Activity,
) -> Result<InvokeResponse> {
    let Some(kind) = activity.invoke_kind() else {
        debug!(name = ?activity.name, "Unhandled invoke name");
        return Ok(InvokeResponse::status(NOT_IMPLEMENTED));
    };

    match kind {
        InvokeKind::AppBasedLinkQuery => {
            handler
                .on_app_based_link_query(activity, invoke_value(activity)?)
                .await
        }
        InvokeKind::Query => handler.on_query(activity, invoke_value(activity)?).await,
        InvokeKind::SelectItem => {
            handler.on_select_item(activity.value.as_ref().unwrap_or(&Value::Null))
        }
        InvokeKind::FetchTask => {
            handler
                .on_fetch_task(activity, invoke_value(activity)?)
                .await
        }
        InvokeKind::SubmitAction => {
            handler
                .on_submit_action(activity, invoke_value(activity)?)
                .await
        }
        InvokeKind::QuerySettingUrl => handler.on_query_setting_url(activity).await,
        InvokeKind::Setting => handler.on_setting(activity, invoke_value(activity)?).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessagingExtensionQuery;
    use serde_json::json;

    fn activity(value: Value) -> Activity {
        serde_json::from_value(json!({
            "type": "invoke",
            "name": "composeExtension/setting",
            "from": { "id": "u1" },
            "value": value
        }))
        .unwrap()
    }

    #[test]
    fn test_invoke_value_defaults_when_missing() {
        let query: MessagingExtensionQuery = invoke_value(&activity(Value::Null)).unwrap();
        assert!(query.state.is_none());
        assert!(query.parameters.is_empty());
    }

    #[test]
    fn test_invoke_value_rejects_wrong_shape() {
        let result: Result<MessagingExtensionQuery> =
            invoke_value(&activity(json!({ "parameters": "not-a-list" })));
        assert!(matches!(result, Err(BotError::InvalidActivity(_))));
    }
}
