//! HTTP surface for the migration coordinator.
//!
//! `POST /migrate/{pod_uid}?components=a,b,c` runs a full migration on
//! the calling task and answers with the checkpoint result; the preparer
//! is released only after the result bytes have been handed to the
//! connection, so the caller holds the checkpoint location before the
//! pod is torn down.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::migration::{Coordinator, MigrationPhase, MigrationSession};
use crate::{AppError, Result};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Config(_) | Self::Io(_) | Self::Encoding(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

/// Handler for `GET /health` — returns 200 OK with a plain-text body.
async fn health() -> &'static str {
    "ok"
}

/// Query parameters accepted by `POST /migrate/{pod_uid}`.
#[derive(Debug, Deserialize)]
struct MigrateParams {
    /// Comma-separated component names to checkpoint.
    components: Option<String>,
}

/// Split a comma-separated component list, dropping empty segments.
fn parse_components(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Schedules the session teardown when dropped.
///
/// The guard travels inside the trailing response-body chunk, so on the
/// happy path it drops after the result bytes reach the connection. It
/// also drops when the requester abandons the response mid-write, or the
/// handler bails out after capture started. Teardown always waits for
/// capture completion first: the preparer is never released early.
struct FinishGuard {
    coordinator: Arc<Coordinator>,
    session: Arc<MigrationSession>,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let coordinator = Arc::clone(&self.coordinator);
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            session.wait_captured().await;
            coordinator.finish_migration(session.pod_uid());
        });
    }
}

/// Handler for `POST /migrate/{pod_uid}`.
///
/// Blocks the calling task for the entire migration span: begins the
/// migration, waits for the preparer to finish capture, then streams the
/// result back with the release deferred into the body tail.
async fn migrate(
    State(coordinator): State<Arc<Coordinator>>,
    Path(pod_uid): Path<String>,
    Query(params): Query<MigrateParams>,
) -> Result<Response> {
    let components = parse_components(params.components.as_deref());
    info!(%pod_uid, ?components, "migration requested");

    let session = coordinator.begin_migration(&pod_uid, components).await?;
    let guard = FinishGuard {
        coordinator,
        session: Arc::clone(&session),
    };

    session.wait_captured().await;

    let result = session.result();
    let body = match serde_json::to_vec(&result) {
        Ok(body) => body,
        Err(err) => {
            // The migration is not rolled back: the guard still releases
            // the preparer on the way out.
            error!(%pod_uid, %err, "failed to encode migration result");
            return Err(AppError::Encoding(err.to_string()));
        }
    };

    let tail = stream::once(async move {
        drop(guard);
        Ok::<Bytes, Infallible>(Bytes::new())
    });
    let stream =
        stream::once(std::future::ready(Ok::<Bytes, Infallible>(Bytes::from(body)))).chain(tail);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(stream))
        .map_err(|err| AppError::Encoding(err.to_string()))
}

/// Live-session status reported by `GET /migrations/{pod_uid}`.
#[derive(Debug, Serialize)]
struct MigrationStatus {
    pod_uid: String,
    path: PathBuf,
    components: Vec<String>,
    phase: MigrationPhase,
    started_at: DateTime<Utc>,
}

/// Handler for `GET /migrations/{pod_uid}` — non-blocking lookup.
async fn migration_status(
    State(coordinator): State<Arc<Coordinator>>,
    Path(pod_uid): Path<String>,
) -> Result<Json<MigrationStatus>> {
    let session = coordinator
        .find_migration(&pod_uid)
        .ok_or_else(|| AppError::NotFound(format!("no migration in flight for pod {pod_uid}")))?;

    Ok(Json(MigrationStatus {
        pod_uid,
        path: session.path().to_path_buf(),
        components: session.components().to_vec(),
        phase: session.phase(),
        started_at: session.started_at(),
    }))
}

/// Build the migration API router.
#[must_use]
pub fn router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/migrate/{pod_uid}", post(migrate))
        .route("/migrations/{pod_uid}", get(migration_status))
        .with_state(coordinator)
}

/// Serve the migration API until the token is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the listener fails to bind or the
/// server errors out.
pub async fn serve(
    coordinator: Arc<Coordinator>,
    bind: SocketAddr,
    ct: CancellationToken,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind on {bind}: {err}")))?;

    info!(%bind, "starting migration API");

    axum::serve(listener, router(coordinator))
        .with_graceful_shutdown(async move {
            ct.cancelled().await;
        })
        .await
        .map_err(|err| AppError::Config(format!("migration API error: {err}")))?;

    info!("migration API shut down");
    Ok(())
}
