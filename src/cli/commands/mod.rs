//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod index;
mod serve;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use index::run_index;
pub use serve::run_serve;

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::DuprError;
use crate::orchestrator::Orchestrator;

/// Pre-flight check plus bootstrap, shared by the answering commands.
async fn bootstrap(settings: Settings) -> anyhow::Result<Orchestrator> {
    if let Err(e) = preflight::check(Operation::Answer, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'dupr-rag doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let spinner = Output::spinner("Loading knowledge base...");
    let result = Orchestrator::bootstrap(settings).await;
    spinner.finish_and_clear();

    match result {
        Ok(orchestrator) => Ok(orchestrator),
        Err(e) => {
            report_failure("Startup", &e);
            Err(e.into())
        }
    }
}

/// Print a failed step, pointing at `doctor` when retrying cannot help.
fn report_failure(step: &str, e: &DuprError) {
    let (message, hint) = failure_message(step, e);
    Output::error(&message);
    if let Some(hint) = hint {
        Output::info(hint);
    }
}

fn failure_message(step: &str, e: &DuprError) -> (String, Option<&'static str>) {
    if e.is_startup_fatal() {
        (
            format!("Cannot start: {}", e),
            Some("Run 'dupr-rag doctor' for detailed diagnostics."),
        )
    } else {
        (format!("{} failed: {}", step, e), None)
    }
}
