//! Terminal rendering for the dupr-rag commands.
//!
//! Status lines go to stdout, warnings and errors to stderr. Answers and the
//! sources/info panels share one look between `ask` and `chat`.

use crate::chat::ChatReply;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Dim, indented markdown such as the sources and info panels.
    pub fn panel(text: &str) {
        for line in text.lines() {
            println!("  {}", style(line).dim());
        }
    }

    /// An assistant answer, labelled the way the chat shows it.
    pub fn answer(text: &str) {
        println!("\n{} {}\n", style("DUPR:").cyan().bold(), text);
    }

    /// The sources and info panels that follow an answer.
    pub fn reply_panels(sources: &str, meta: &str) {
        Output::panel(sources);
        println!();
        Output::panel(meta);
        println!();
    }

    /// Render a chat reply: the newest assistant turn, then its panels.
    pub fn reply(reply: &ChatReply) {
        if let Some(answer) = reply.answer() {
            Output::answer(answer);
        }
        Output::reply_panels(&reply.sources, &reply.meta);
    }

    /// Print the chat prompt without a newline.
    pub fn prompt() -> io::Result<()> {
        print!("{} ", style("You:").green().bold());
        io::stdout().flush()
    }

    /// Spinner shown while the index builds or a question is answered.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// `count(1, "document")` is "1 document", anything else takes an "s".
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}
