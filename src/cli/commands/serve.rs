//! HTTP API server command.

use crate::cli::Output;
use crate::config::Settings;
use crate::http::router;
use anyhow::Result;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = super::bootstrap(settings).await?;
    let report = orchestrator.report();
    let app = router(orchestrator.app_state());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("DUPR RAG API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Indexed documents", &report.status.documents().to_string());
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
