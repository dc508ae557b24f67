//! HTTP API server implementation

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Host, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::core::config::{WebSettings, MAX_BODY_BYTES};
use crate::core::errors::KotkiError;
use crate::core::lang::describe_model;
use crate::core::models::TranslationRequest;
use crate::core::registry::Registry;
use crate::core::service::Translator;

pub const API_ROUTE_TRANSLATE: &str = "/api/1/translate";

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: Translator,
    content_limit: usize,
    /// Authority used when a request carries no `Host`
    fallback_host: String,
    /// Index page with `{{API_URL}}` left for per-request substitution
    index_html: Arc<str>,
}

impl AppState {
    pub fn new(translator: Translator, settings: &WebSettings) -> Self {
        let index_html = render_index(translator.registry(), settings.api_content_limit);

        Self {
            translator,
            content_limit: settings.api_content_limit,
            fallback_host: settings.bind_addr(),
            index_html: index_html.into(),
        }
    }
}

/// Translation request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateBody {
    /// Text to translate
    pub translate: String,
    /// Model id; omitted, empty or `auto` to detect the source language
    #[serde(default)]
    pub model: Option<String>,
}

/// Translation response body
#[derive(Debug, Serialize, ToSchema)]
pub struct TranslateReply {
    pub translate: String,
    pub model: String,
    /// Detected source language code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_code: Option<String>,
    /// Display name of the detected language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected: Option<String>,
}

/// Error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(api_translate),
    components(schemas(TranslateBody, TranslateReply, ErrorBody))
)]
struct ApiDoc;

/// Errors surfaced as `{"error": ...}`
#[derive(Debug)]
pub enum ApiError {
    Kotki(KotkiError),
    Rejected(JsonRejection),
}

impl From<KotkiError> for ApiError {
    fn from(err: KotkiError) -> Self {
        ApiError::Kotki(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Kotki(err) => {
                let status = match &err {
                    KotkiError::EmptyInput => StatusCode::BAD_REQUEST,
                    KotkiError::ContentTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    KotkiError::Detection { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            ApiError::Rejected(rejection) => (rejection.status(), rejection.body_text()),
        };

        if status.is_server_error() {
            warn!("{}: {}", status, message);
        } else {
            debug!("{}: {}", status, message);
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Index page; the API example points at the host the client used
async fn root(State(state): State<Arc<AppState>>, host: Option<Host>) -> Html<String> {
    let authority = host
        .map(|Host(h)| h)
        .unwrap_or_else(|| state.fallback_host.clone());
    let api_url = format!("http://{}{}", authority, API_ROUTE_TRANSLATE);
    Html(state.index_html.replace("{{API_URL}}", &escape_html(&api_url)))
}

/// OpenAPI document
async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Translate text, detecting the source language when no model is given
#[utoipa::path(
    post,
    path = "/api/1/translate",
    request_body = TranslateBody,
    responses(
        (status = 200, description = "Translated text", body = TranslateReply),
        (status = 400, description = "Empty or malformed request", body = ErrorBody),
        (status = 413, description = "Text exceeds API_CONTENT_LIMIT", body = ErrorBody),
        (status = 422, description = "Source language could not be detected", body = ErrorBody),
        (status = 500, description = "Unknown model or engine failure", body = ErrorBody)
    )
)]
async fn api_translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateBody>, JsonRejection>,
) -> Result<Json<TranslateReply>, ApiError> {
    let Json(payload) = payload.map_err(ApiError::Rejected)?;

    let length = payload.translate.chars().count();
    if length > state.content_limit {
        return Err(KotkiError::ContentTooLong {
            length,
            limit: state.content_limit,
        }
        .into());
    }

    let mut request = TranslationRequest::new(payload.translate);
    if let Some(model) = payload.model {
        request = request.with_model(model);
    }

    let outcome = state.translator.translate(&request).await?;
    let (detected_code, detected) = match outcome.detected {
        Some(detection) => {
            let name = detection.name.unwrap_or_else(|| detection.code.clone());
            (Some(detection.code), Some(name))
        }
        None => (None, None),
    };

    Ok(Json(TranslateReply {
        translate: outcome.translation,
        model: outcome.model.to_string(),
        detected_code,
        detected,
    }))
}

/// Build the router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/openapi.json", get(openapi))
        .route(API_ROUTE_TRANSLATE, post(api_translate))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(Arc::new(state))
}

/// Run the HTTP server
pub async fn run_server(settings: &WebSettings, translator: Translator) -> anyhow::Result<()> {
    let addr: SocketAddr = settings.bind_addr().parse()?;
    let app = app(AppState::new(translator, settings));

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn render_index(registry: &Registry, content_limit: usize) -> String {
    let options: String = registry
        .ids()
        .map(|id| {
            let label = describe_model(id).unwrap_or_else(|| id.to_string());
            format!(
                "      <option value=\"{0}\">{0}: {1}</option>\n",
                escape_html(id.as_str()),
                escape_html(&label)
            )
        })
        .collect();

    INDEX_TEMPLATE
        .replace("{{MODEL_OPTIONS}}", options.trim_end_matches('\n'))
        .replace("{{CONTENT_LIMIT}}", &content_limit.to_string())
        .replace("{{API_PATH}}", API_ROUTE_TRANSLATE)
        .replace("{{MODEL_COUNT}}", &registry.len().to_string())
        .replace("{{YEAR}}", &chrono::Local::now().format("%Y").to_string())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
