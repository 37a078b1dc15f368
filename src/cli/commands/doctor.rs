//! Doctor command - verify credentials, inputs and the index.

use crate::cli::{count, Output};
use crate::config::Settings;
use crate::fingerprint::source_fingerprint;
use crate::loader::{blog_document, load_jsonl, player_document};
use crate::vector_store::{SqliteVectorStore, VectorStore};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("dupr-rag Doctor");
    println!();
    println!("Checking credentials, inputs and index...\n");

    let mut checks = Vec::new();

    let credentials = vec![
        check_api_key(&settings.llm.api_key_env, std::env::var(&settings.llm.api_key_env).ok()),
        check_api_key(
            &settings.embedding.api_key_env,
            std::env::var(&settings.embedding.api_key_env).ok(),
        ),
    ];
    print_section("API Configuration", &credentials);
    checks.extend(credentials);

    let summaries = settings.summaries_path();
    let blogs = settings.blogs_path();
    let inputs = vec![
        check_input("Player summaries", &summaries, InputKind::Players),
        check_input("Blog posts", &blogs, InputKind::Blogs),
    ];
    let inputs_loaded = inputs.iter().any(|c| c.status == CheckStatus::Ok);
    print_section("Input Files", &inputs);
    checks.extend(inputs);

    if !inputs_loaded {
        checks.push(CheckResult::error(
            "Documents",
            "no documents can be loaded",
            "Point SUMMARIES_JSONL / BLOGS_JSONL at the scraped .jsonl files",
        ));
    }

    let index = vec![check_index(settings, &summaries, &blogs).await];
    print_section("Index", &index);
    checks.extend(index);

    let config = vec![check_config_file()];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} found. Please fix them before serving.",
            count(errors, "error")
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {}.", count(warnings, "warning")));
    } else {
        Output::success("All checks passed! dupr-rag is ready to use.");
    }

    Ok(())
}

/// Check that an API key variable holds a value.
fn check_api_key(var: &str, value: Option<String>) -> CheckResult {
    match value {
        Some(key) if key.trim().is_empty() => {
            CheckResult::error(var, "empty", &format!("Set it with: export {}='...' or add it to .env", var))
        }
        Some(key) => CheckResult::ok(var, &format!("configured ({})", mask_key(&key))),
        None => CheckResult::error(var, "not set", &format!("Set it with: export {}='...' or add it to .env", var)),
    }
}

/// Keep only the first and last few characters of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[derive(Clone, Copy)]
enum InputKind {
    Players,
    Blogs,
}

/// Check an input file exists and yields documents.
fn check_input(name: &str, path: &Path, kind: InputKind) -> CheckResult {
    if !path.exists() {
        return CheckResult::warning(
            name,
            &format!("{} (not found)", path.display()),
            "The index will be built without these records",
        );
    }

    if !path.is_file() {
        return CheckResult::error(
            name,
            &format!("{} (not a regular file)", path.display()),
            "Point the setting at a .jsonl file, not a directory",
        );
    }

    let docs = match kind {
        InputKind::Players => load_jsonl(path, player_document),
        InputKind::Blogs => load_jsonl(path, blog_document),
    };

    if docs.is_empty() {
        CheckResult::warning(
            name,
            &format!("{} (no valid records)", path.display()),
            "Each line must be a JSON object",
        )
    } else {
        CheckResult::ok(name, &format!("{} ({})", path.display(), count(docs.len(), "record")))
    }
}

/// Check the persisted index and whether it matches the inputs.
async fn check_index(settings: &Settings, summaries: &Path, blogs: &Path) -> CheckResult {
    let index_path = settings.index_path();
    if !index_path.exists() {
        return CheckResult::warning(
            "Vector index",
            &format!("{} (not built yet)", index_path.display()),
            "Build it with: dupr-rag index",
        );
    }

    let store = match SqliteVectorStore::new(&index_path) {
        Ok(store) => store,
        Err(e) => {
            return CheckResult::error(
                "Vector index",
                &format!("cannot open: {}", e),
                "Rebuild it with: dupr-rag index --force",
            )
        }
    };

    let documents = store.document_count().await.unwrap_or(0);
    let stored = store.fingerprint().await.ok().flatten();
    let current = source_fingerprint(&[summaries, blogs], &settings.embedding.model);
    let built = store
        .last_indexed_at()
        .ok()
        .flatten()
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if documents == 0 {
        CheckResult::warning("Vector index", "empty", "Build it with: dupr-rag index")
    } else if stored.as_deref() != Some(current.as_str()) {
        CheckResult::warning(
            "Vector index",
            &format!("{}, built {} (out of date)", count(documents, "document"), built),
            "It will be rebuilt on next start, or run: dupr-rag index",
        )
    } else {
        CheckResult::ok("Vector index", &format!("{}, built {}", count(documents, "document"), built))
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override them", config_path.display()),
        )
    }
}
