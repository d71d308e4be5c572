//! HTTP API.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /api/lecturas?fecha=YYYY-MM-DD` | Readings for a date (today by default) |
//! | `GET /api/health` | Liveness probe |
//! | `GET /api/help` | Endpoint description |
//!
//! A successful pipeline outcome is returned with 200, a failed one with 404.
//! Panics inside a handler are caught and turned into a generic 500 body.

use crate::pipeline::ReadingsService;
use crate::utils::today;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

type SharedService = Arc<dyn ReadingsService>;

/// Build the API router around a readings service.
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/api/lecturas", get(lecturas))
        .route("/api/health", get(health))
        .route("/api/help", get(help))
        .with_state(service)
        .layer(CatchPanicLayer::custom(internal_error))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, service: SharedService) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(%local, "API Evangelio del Día listening");
    info!(help = %format!("http://localhost:{}/api/help", local.port()), "Usage available");
    axum::serve(listener, router(service)).await
}

#[derive(Debug, Deserialize)]
struct LecturasQuery {
    fecha: Option<String>,
}

async fn lecturas(
    State(service): State<SharedService>,
    Query(query): Query<LecturasQuery>,
) -> Response {
    let fecha = query
        .fecha
        .filter(|f| !f.is_empty())
        .unwrap_or_else(today);

    let outcome = service.readings(&fecha).await;
    let status = if outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    info!(fecha = outcome.fecha(), %status, "Served readings");
    (status, Json(outcome)).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn help() -> Json<Value> {
    Json(json!({
        "nombre": "API Evangelio del Día",
        "descripcion": "Extrae las lecturas del día desde Vatican News",
        "endpoints": {
            "lecturas": {
                "url": "/api/lecturas",
                "metodo": "GET",
                "parametros": {
                    "fecha": "Opcional. Formato: YYYY-MM-DD. Si no se proporciona, usa la fecha actual."
                },
                "ejemplo": "GET /api/lecturas?fecha=2025-12-03"
            },
            "health": {
                "url": "/api/health",
                "metodo": "GET",
                "descripcion": "Verifica que el servidor está activo"
            },
            "help": {
                "url": "/api/help",
                "metodo": "GET",
                "descripcion": "Muestra esta ayuda"
            }
        }
    }))
}

fn internal_error(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(%details, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": "Error interno del servidor",
            "details": details,
        })),
    )
        .into_response()
}
