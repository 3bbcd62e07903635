use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, info_span, warn, Instrument};

/// Run each request inside an `http` span and log its outcome.
///
/// Server errors are logged at warn level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let span = info_span!(
        "http",
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(request).await;
        let status = response.status();
        let elapsed_ms = started.elapsed().as_millis();

        if status.is_server_error() {
            warn!(%status, elapsed_ms, "request failed");
        } else {
            info!(%status, elapsed_ms, "request completed");
        }

        response
    }
    .instrument(span)
    .await
}
