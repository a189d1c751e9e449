//! Request logging.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Logs method, path, status and elapsed time of every request.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if status.is_server_error() {
        log::warn!("{} {} -> {} ({:.1} ms)", method, path, status.as_u16(), elapsed_ms);
    } else {
        log::info!("{} {} -> {} ({:.1} ms)", method, path, status.as_u16(), elapsed_ms);
    }
    response
}
