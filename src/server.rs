//! HTTP server assembly.

use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::remote::IssueTracker;
use crate::routes;
use crate::sync::Synchronizer;

/// Serve the API on the given address until the process is stopped.
pub async fn run<T: IssueTracker + 'static>(
    sync: Synchronizer<T>,
    addr: &str,
) -> Result<()> {
    let app = routes::router(Arc::new(sync)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
