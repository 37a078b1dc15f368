//! Record loading from line-delimited JSON files.
//!
//! Player summaries and blog posts are read line by line. A line that is not a
//! JSON object is skipped, and a missing file contributes nothing; neither
//! stops the load.

use crate::config::SourceSettings;
use crate::document::{BlogMeta, Document, PlayerSummaryMeta};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Placeholder rendered in document text for missing fields.
pub const MISSING_FIELD: &str = "N/A";

/// A parsed JSON record.
pub type Record = Map<String, Value>;

/// Documents loaded from both sources.
#[derive(Debug, Clone, Default)]
pub struct LoadedDocuments {
    /// Player documents first, then blog documents, each in file order.
    pub documents: Vec<Document>,
    pub player_count: usize,
    pub blog_count: usize,
}

impl LoadedDocuments {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Load every document from the configured sources.
pub fn load_documents(sources: &SourceSettings) -> LoadedDocuments {
    let summaries = crate::config::Settings::expand_path(&sources.summaries_path);
    let blogs = crate::config::Settings::expand_path(&sources.blogs_path);
    load_documents_from(&summaries, &blogs)
}

/// Load every document from explicit file paths.
pub fn load_documents_from(summaries_path: &Path, blogs_path: &Path) -> LoadedDocuments {
    let player_docs = load_jsonl(summaries_path, player_document);
    let blog_docs = load_jsonl(blogs_path, blog_document);

    let player_count = player_docs.len();
    let blog_count = blog_docs.len();

    let mut documents = player_docs;
    documents.extend(blog_docs);

    info!(
        "Loaded {} player + {} blog documents ({} total)",
        player_count,
        blog_count,
        documents.len()
    );

    LoadedDocuments {
        documents,
        player_count,
        blog_count,
    }
}

/// Read a JSONL file, mapping each object line through `build`.
#[instrument(skip(build), fields(path = %path.display()))]
pub fn load_jsonl<F>(path: &Path, build: F) -> Vec<Document>
where
    F: Fn(&Record) -> Document,
{
    match std::fs::metadata(path) {
        Ok(meta) if !meta.is_file() => {
            warn!("Input path is not a regular file: {}", path.display());
            return Vec::new();
        }
        _ => {}
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Input file not found: {}", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Could not open {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut docs = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                // Read errors repeat forever; give up on the rest of the file
                warn!(
                    "Stopped reading {} at line {}: {}",
                    path.display(),
                    line_no + 1,
                    e
                );
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(&line) {
            Ok(Value::Object(record)) => docs.push(build(&record)),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed lines in {}", skipped, path.display());
    }

    docs
}

/// Build a player summary document from a record.
pub fn player_document(record: &Record) -> Document {
    let text = format!(
        "Player summary: {}\n\
         Player ID: {}\n\
         Club ID: {}\n\
         Total matches: {}\n\
         Wins/Losses: {}/{}\n\
         Singles record: {} wins - {} losses\n\
         Doubles record: {} wins - {} losses\n\
         Detailed summary: {}",
        text_field(record, "player_name"),
        text_field(record, "player_id"),
        text_field(record, "club_id"),
        text_field(record, "total_matches"),
        text_field(record, "wins"),
        text_field(record, "losses"),
        text_field(record, "singles_wins"),
        text_field(record, "singles_losses"),
        text_field(record, "doubles_wins"),
        text_field(record, "doubles_losses"),
        text_field(record, "summary"),
    );

    Document::player_summary(
        text,
        PlayerSummaryMeta {
            player_id: meta_field(record, "player_id"),
            player_name: meta_field(record, "player_name"),
        },
    )
}

/// Build a blog document from a record.
pub fn blog_document(record: &Record) -> Document {
    let text = format!(
        "Blog title: {}\nPublished: {}\nContent: {}",
        text_field(record, "title"),
        text_field(record, "date"),
        text_field(record, "content"),
    );

    Document::blog(
        text,
        BlogMeta {
            url: meta_field(record, "url"),
            title: meta_field(record, "title"),
        },
    )
}

/// Render a field for document text; missing and null become [`MISSING_FIELD`].
fn text_field(record: &Record, key: &str) -> String {
    render_value(record.get(key)).unwrap_or_else(|| MISSING_FIELD.to_string())
}

/// Render a field for metadata; missing and null become an empty string.
fn meta_field(record: &Record, key: &str) -> String {
    render_value(record.get(key)).unwrap_or_default()
}

fn render_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
