//! Index command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{count, Output};
use crate::config::Settings;
use crate::index::IndexStatus;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Build or refresh the persisted index.
pub async fn run_index(force: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'dupr-rag doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info(&format!(
        "Indexing {} and {}",
        settings.summaries_path().display(),
        settings.blogs_path().display()
    ));

    let spinner = Output::spinner("Embedding documents...");
    let result = Orchestrator::reindex(&settings, force).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            super::report_failure("Indexing", &e);
            return Err(e.into());
        }
    };

    match report.status {
        IndexStatus::Reused { documents } => {
            Output::success(&format!("Index is up to date ({}).", count(documents, "document")));
            Output::info("Use --force to rebuild anyway.");
        }
        IndexStatus::Rebuilt { documents } => {
            Output::success(&format!("Indexed {}.", count(documents, "document")));
        }
    }
    Output::kv("Player summaries", &report.player_count.to_string());
    Output::kv("Blog posts", &report.blog_count.to_string());
    Output::kv("Location", &settings.index_path().display().to_string());

    Ok(())
}
