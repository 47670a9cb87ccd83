//! HTTP server for Bot Framework activities.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, error, warn};

use crate::activity::Activity;
use crate::config::Config;
use crate::credentials::AppCredentials;
use crate::dispatch::on_invoke_activity;
use crate::error::{BotError, Result};
use crate::handler::SearchAuthConfigHandler;
use crate::responses::InvokeResponse;
use crate::store::MemoryConfigStore;
use crate::token::BotTokenClient;

/// Upper bound on an inbound activity body.
const MAX_ACTIVITY_BYTES: usize = 1024 * 1024;

/// Configuration page opened from the `config` suggested action.
const SETTINGS_PAGE: &str = include_str!("../assets/searchSettings.html");

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Invoke handler.
    pub handler: Arc<SearchAuthConfigHandler>,
}

impl AppState {
    #[must_use]
    pub fn new(handler: SearchAuthConfigHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Wire the token service, search backends and in-memory store.
    pub fn from_config(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("teams-msgext/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let bot_credentials = AppCredentials::new(
            client.clone(),
            &config.login_authority_url,
            &config.bot_auth_tenant,
            &config.app_id,
            &config.app_password,
        );
        let tokens = BotTokenClient::new(
            client.clone(),
            &config.token_service_url,
            &config.app_id,
            bot_credentials,
        );

        Ok(Self::new(SearchAuthConfigHandler::new(
            config,
            Arc::new(MemoryConfigStore::new()),
            Arc::new(tokens),
            client,
        )))
    }
}

/// Build the HTTP router for the messaging extension.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages", post(messages_handler))
        .route("/public/searchSettings.html", get(settings_page))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_ACTIVITY_BYTES)),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn settings_page() -> Html<&'static str> {
    Html(SETTINGS_PAGE)
}

fn invoke_http_response(response: InvokeResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    match response.body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    }
}

/// Handle an incoming activity.
///
/// Invoke responses are written back as the HTTP response; every other
/// activity type is acknowledged with `200`.
pub async fn messages_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let activity: Activity = match serde_json::from_slice(&body) {
        Ok(activity) => activity,
        Err(e) => {
            warn!(error = %e, "Failed to parse activity");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if !activity.is_invoke() {
        debug!(activity_type = ?activity.activity_type, "Acknowledging non-invoke activity");
        return StatusCode::OK.into_response();
    }

    match on_invoke_activity(&state.handler, &activity).await {
        Ok(response) => invoke_http_response(response),
        Err(BotError::InvalidActivity(reason)) => {
            warn!(reason = %reason, "Rejecting invalid invoke");
            StatusCode::BAD_REQUEST.into_response()
        }
        Err(e) => {
            error!(
                name = activity.name.as_deref().unwrap_or(""),
                error = %e,
                "Invoke handler failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
