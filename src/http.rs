use crate::analytics::{Analytics, DRONE_COLUMN};
use crate::config::HttpServerConfig;
use crate::error::{CrashGraphError, Result};
use crate::normalize::Record;
use crate::query::{operations, ParamSource, DERIVE_RISK, DERIVE_RISK_ROUTES, TEMPLATES};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// HTTP routing layer over [`Analytics`]
pub struct HttpServer {
    analytics: Arc<Analytics>,
    config: HttpServerConfig,
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    analytics: Arc<Analytics>,
}

#[derive(Debug, Deserialize)]
struct ValueParam {
    value: Option<String>,
}

impl IntoResponse for CrashGraphError {
    fn into_response(self) -> Response {
        let status = match &self {
            CrashGraphError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CrashGraphError::Parse(_) => StatusCode::BAD_GATEWAY,
            CrashGraphError::UnknownOperation(_) => StatusCode::NOT_FOUND,
            CrashGraphError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CrashGraphError::Query { .. }
            | CrashGraphError::Inference(_)
            | CrashGraphError::Store(_)
            | CrashGraphError::Config(_)
            | CrashGraphError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let CrashGraphError::Query { template, .. } = &self {
            body["template"] = serde_json::Value::String(template.clone());
        }

        (status, Json(body)).into_response()
    }
}

impl HttpServer {
    pub fn new(analytics: Analytics, config: HttpServerConfig) -> Self {
        Self {
            analytics: Arc::new(analytics),
            config,
        }
    }

    /// Bind the configured address and serve until the process stops
    pub async fn run(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            CrashGraphError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {}", addr, e),
            ))
        })?;

        log::info!("Starting crashgraph HTTP server on http://{}", addr);
        log::info!("Graph endpoint: {}", self.analytics.client().endpoint());
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        axum::serve(listener, self.create_router())
            .await
            .map_err(|e| CrashGraphError::Io(std::io::Error::other(format!("HTTP server error: {}", e))))
    }

    /// Create the axum router
    pub fn create_router(&self) -> Router {
        // No configured origins: allow any (local dev).
        let cors = if self.config.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<HeaderValue> = self
                .config
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let mut router = Router::new()
            .route("/health", get(handle_health))
            .route("/operations", get(handle_list))
            .route("/operations/:name", get(handle_operation))
            .route("/operations/:name/:value", get(handle_operation_with_value));

        for template in TEMPLATES {
            let name = template.name;
            router = match template.param {
                None => router.route(
                    template.legacy_route,
                    get(move |State(state): State<AppState>| async move {
                        run(&state, name, None).await
                    }),
                ),
                Some(spec) if spec.source == ParamSource::Path => router.route(
                    &format!("{}/:value", template.legacy_route),
                    get(
                        move |State(state): State<AppState>, Path(value): Path<String>| async move {
                            run(&state, name, Some(value)).await
                        },
                    ),
                ),
                Some(spec) => router.route(
                    template.legacy_route,
                    get(
                        move |State(state): State<AppState>,
                              Query(params): Query<HashMap<String, String>>| async move {
                            run(&state, name, params.get(spec.name).cloned()).await
                        },
                    ),
                ),
            };
        }

        for route in DERIVE_RISK_ROUTES {
            router = router.route(route, get(handle_derive_risk));
        }

        router
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(AppState {
                analytics: Arc::clone(&self.analytics),
            })
    }
}

async fn run(
    state: &AppState,
    name: &str,
    value: Option<String>,
) -> std::result::Result<Json<Vec<Record>>, CrashGraphError> {
    state.analytics.run(name, value.as_deref()).await.map(Json)
}

async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "crashgraph",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
        .into_response()
}

async fn handle_list() -> Response {
    Json(operations()).into_response()
}

async fn handle_operation(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ValueParam>,
) -> std::result::Result<Json<Vec<Record>>, CrashGraphError> {
    run(&state, &name, params.value).await
}

async fn handle_operation_with_value(
    State(state): State<AppState>,
    Path((name, value)): Path<(String, String)>,
) -> std::result::Result<Json<Vec<Record>>, CrashGraphError> {
    run(&state, &name, Some(value)).await
}

/// Legacy shape of the risk inference: a bare list of drone identities.
async fn handle_derive_risk(State(state): State<AppState>) -> Response {
    match state.analytics.run(DERIVE_RISK, None).await {
        Ok(records) => {
            let drones: Vec<&str> = records.iter().filter_map(|r| r.value(DRONE_COLUMN)).collect();
            Json(serde_json::json!({ "drones_with_high_risk": drones })).into_response()
        }
        Err(e) => e.into_response(),
    }
}
