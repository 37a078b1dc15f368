//! Pre-flight checks before expensive operations.
//!
//! Validates that the configured credentials are present before loading
//! inputs or calling any hosted model.

use crate::config::Settings;
use crate::error::{DuprError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Indexing needs the embedding credential.
    Index,
    /// Answering needs both the embedding and the chat model credentials.
    Answer,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_with(operation, settings, |var| std::env::var(var).ok())
}

/// [`check`] with an injected environment lookup.
pub fn check_with<F>(operation: Operation, settings: &Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let require = |var: &str| -> Result<()> {
        match lookup(var) {
            Some(value) if !value.trim().is_empty() => Ok(()),
            _ => Err(DuprError::MissingCredential(var.to_string())),
        }
    };

    match operation {
        Operation::Index => {
            require(&settings.embedding.api_key_env)?;
        }
        Operation::Answer => {
            require(&settings.llm.api_key_env)?;
            require(&settings.embedding.api_key_env)?;
        }
    }
    Ok(())
}
