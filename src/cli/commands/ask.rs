//! Ask command implementation.

use crate::chat::{clamp_top_k, format_meta, format_sources};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use std::time::Instant;

/// Run the ask command.
pub async fn run_ask(question: &str, top_k: Option<usize>, settings: Settings) -> Result<()> {
    let orchestrator = super::bootstrap(settings).await?;
    let pipeline = orchestrator.pipeline();
    let top_k = clamp_top_k(top_k.unwrap_or_else(|| pipeline.default_top_k()));

    let spinner = Output::spinner("Searching knowledge base...");
    let started = Instant::now();
    let result = pipeline.answer(question, &[], top_k).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            Output::answer(&response.answer);
            Output::header("Sources");
            Output::reply_panels(
                &format_sources(&response.context),
                &format_meta(started.elapsed(), top_k, response.context.len()),
            );
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
