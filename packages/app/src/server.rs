//! Proxy-facing HTTP surface.
//!
//! Exposes an [`App`] on the routes the proxy calls:
//!
//! - `POST /invoke/{method}`: method dispatch, Envelope in and out
//! - `GET /dapr/subscribe`, `GET /dapr/bindings`: subscription handshake
//! - `POST /topics/{topic}`, `POST /bindings/{binding}`: event delivery
//! - `GET /healthz`: liveness

use std::future::Future;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use sidecar_client::ErrorBody;
use sidecar_envelope::{CodecError, Envelope, TypeTag};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app::App;
use crate::error::DispatchError;
use crate::events::{BindingEvent, TopicEvent};

/// Build the router for `app`.
pub fn router<S: Send + Sync + 'static>(app: Arc<App<S>>) -> Router {
    Router::new()
        .route("/invoke/{method}", post(handle_invoke::<S>))
        .route("/dapr/subscribe", get(handle_topics::<S>))
        .route("/dapr/bindings", get(handle_bindings::<S>))
        .route("/topics/{topic}", post(handle_topic_event::<S>))
        .route("/bindings/{binding}", post(handle_binding_event::<S>))
        .route("/healthz", get(handle_health))
        .with_state(app)
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish; the app moves to
/// `ShuttingDown` as soon as the signal fires.
pub async fn serve<S, F>(
    listener: TcpListener,
    app: Arc<App<S>>,
    shutdown: F,
) -> std::io::Result<()>
where
    S: Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "callback server listening");
    }

    let signal_app = Arc::clone(&app);
    axum::serve(listener, router(app))
        .with_graceful_shutdown(async move {
            shutdown.await;
            signal_app.begin_shutdown();
        })
        .await
}

async fn handle_invoke<S: Send + Sync + 'static>(
    State(app): State<Arc<App<S>>>,
    Path(method): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match Envelope::from_json(&body) {
        Ok(payload) => payload,
        Err(e) => return DispatchError::from(e).into_response(),
    };

    match app.dispatch(&method, payload).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_topics<S: Send + Sync + 'static>(
    State(app): State<Arc<App<S>>>,
) -> Json<Vec<String>> {
    Json(app.topics())
}

async fn handle_bindings<S: Send + Sync + 'static>(
    State(app): State<Arc<App<S>>>,
) -> Json<Vec<String>> {
    Json(app.bindings())
}

async fn handle_topic_event<S: Send + Sync + 'static>(
    State(app): State<Arc<App<S>>>,
    Path(topic): Path<String>,
    body: Bytes,
) -> Response {
    if !app.subscriptions().has_topic(&topic) {
        warn!(%topic, "event for undeclared topic");
        return DispatchError::UnknownTopic(topic).into_response();
    }
    let event: TopicEvent = match parse_body(&body, "TopicEvent") {
        Ok(event) => event,
        Err(e) => return e.into_response(),
    };

    match app.on_topic_event(&topic, event).await {
        Ok(()) => ack(),
        Err(e) => e.into_response(),
    }
}

async fn handle_binding_event<S: Send + Sync + 'static>(
    State(app): State<Arc<App<S>>>,
    Path(binding): Path<String>,
    body: Bytes,
) -> Response {
    if !app.subscriptions().has_binding(&binding) {
        warn!(%binding, "event for undeclared binding");
        return DispatchError::UnknownBinding(binding).into_response();
    }
    let event: BindingEvent = match parse_body(&body, "BindingEvent") {
        Ok(event) => event,
        Err(e) => return e.into_response(),
    };

    match app.on_binding_event(&binding, event).await {
        Ok(()) => ack(),
        Err(e) => e.into_response(),
    }
}

async fn handle_health() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn ack() -> Response {
    Json(serde_json::json!({})).into_response()
}

fn parse_body<T: DeserializeOwned>(body: &[u8], what: &'static str) -> Result<T, DispatchError> {
    serde_json::from_slice(body).map_err(|e| {
        DispatchError::Codec(CodecError::decode(
            TypeTag::from_static(what),
            e.to_string(),
        ))
    })
}

impl DispatchError {
    /// HTTP status the proxy sees for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::UnknownMethod(_)
            | DispatchError::UnknownTopic(_)
            | DispatchError::UnknownBinding(_) => StatusCode::NOT_FOUND,
            DispatchError::Codec(CodecError::SchemaMismatch { .. })
            | DispatchError::Codec(CodecError::Decode { .. }) => StatusCode::BAD_REQUEST,
            DispatchError::Codec(CodecError::Encode { .. }) | DispatchError::Handler { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(self.error_code(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}
