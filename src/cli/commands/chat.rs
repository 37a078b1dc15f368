//! Interactive terminal chat.

use crate::chat::{clamp_top_k, ChatSession, DEFAULT_CHAT_TOP_K, TOP_K_RANGE};
use crate::cli::{count, Output};
use crate::config::Settings;
use crate::rag::ChatTurn;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead};

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Exit,
    Clear,
    SetTopK(Option<usize>),
    Question(&'a str),
}

fn parse_input(line: &str) -> Option<Input<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Some(Input::Exit);
    }
    if line.eq_ignore_ascii_case("clear") {
        return Some(Input::Clear);
    }
    if let Some(arg) = line.strip_prefix("/k") {
        return Some(Input::SetTopK(arg.trim().parse().ok()));
    }

    Some(Input::Question(line))
}

/// Run the interactive chat command.
pub async fn run_chat(top_k: Option<usize>, settings: Settings) -> Result<()> {
    let orchestrator = super::bootstrap(settings).await?;
    let session = ChatSession::new(orchestrator.pipeline());

    let mut top_k = clamp_top_k(top_k.unwrap_or(DEFAULT_CHAT_TOP_K));
    let mut turns: Vec<ChatTurn> = Vec::new();

    println!("\n{}", style("DUPR Pickleball Assistant").bold().cyan());
    println!(
        "{}\n",
        style("Ask about players, ratings and the DUPR blog. Type 'clear' to reset, '/k N' to change the source count, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();

    loop {
        Output::prompt()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            None => continue,
            Some(Input::Exit) => {
                Output::info("Goodbye!");
                break;
            }
            Some(Input::Clear) => {
                let reply = session.clear();
                turns = reply.turns;
                Output::info(&reply.meta);
            }
            Some(Input::SetTopK(Some(k))) => {
                top_k = clamp_top_k(k);
                Output::info(&format!("Retrieving {} per question.", count(top_k, "source")));
            }
            Some(Input::SetTopK(None)) => {
                Output::warning(&format!(
                    "Usage: /k N with N between {} and {}",
                    TOP_K_RANGE.start(),
                    TOP_K_RANGE.end()
                ));
            }
            Some(Input::Question(question)) => {
                let spinner = Output::spinner("Thinking...");
                let reply = session.respond(question, std::mem::take(&mut turns), top_k).await;
                spinner.finish_and_clear();

                Output::reply(&reply);
                turns = reply.turns;
            }
        }
    }

    Ok(())
}
