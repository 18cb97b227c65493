//! `belex` — command-line search over the Bernese Law Collection.
//!
//! With arguments it runs one query and exits; without, it opens an
//! interactive prompt. Configuration comes from a JSON file with a nested
//! `gemini` section (`api_key`, `filestore_id`); a missing or incomplete
//! file is fatal before any request is made.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use belex_gemini::Model;
use belex_search::{Answer, BelexConfig, BelexSearchEngine, GeminiLawStore, extract_bsg_number, law_url};
use clap::Parser;
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing_subscriber::EnvFilter;

const RULE_WIDTH: usize = 80;

#[derive(Debug, Parser)]
#[command(name = "belex", version, about = "Search the Bernese Law Collection (BELEX)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Query text; opens the interactive prompt when omitted.
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = BelexConfig::from_file(&cli.config)
        .with_context(|| format!("cannot load {}", cli.config.display()))?;
    let store = GeminiLawStore::new(&config, Model::Gemini25Flash)?;
    let engine = BelexSearchEngine::new(Arc::new(store));

    if cli.query.is_empty() {
        interactive(&engine).await
    } else {
        run_query(&engine, &cli.query.join(" ")).await;
        Ok(())
    }
}

async fn interactive(engine: &BelexSearchEngine) -> anyhow::Result<()> {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("BELEX Search Engine - Interactive Mode");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("\nType your search queries (or 'quit' to exit)\n");

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("🔍 Search: ") {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if matches!(query.to_lowercase().as_str(), "quit" | "exit" | "q") {
                    println!("\n👋 Goodbye!");
                    break;
                }
                let _ = editor.add_history_entry(query);
                run_query(engine, query).await;
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(readline_error) => return Err(readline_error.into()),
        }
    }
    Ok(())
}

/// Runs one search and prints the outcome. A failed search is reported
/// inline; the caller carries on.
async fn run_query(engine: &BelexSearchEngine, query: &str) {
    println!("\n🔍 Searching for: '{query}'\n");
    println!("{}", "=".repeat(RULE_WIDTH));

    match engine.search(query).await {
        Ok(answer) => print!("{}", render_answer(&answer)),
        Err(search_error) => println!("\n❌ Search failed: {search_error}"),
    }
}

fn render_answer(answer: &Answer) -> String {
    let mut out = String::new();

    if answer.text.is_empty() {
        out.push_str("\n⚠️  No answer generated\n");
    } else {
        out.push_str("\n📄 Answer:\n");
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
        out.push_str(&answer.text);
        out.push_str("\n\n");
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
    }

    if answer.sources.is_empty() {
        return out;
    }

    out.push_str("\n📚 Sources:\n");
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    let mut entries: Vec<_> = answer.sources.iter().collect();
    entries.sort_by(|a, b| a.title.cmp(&b.title));
    for (position, entry) in entries.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", position + 1, entry.title));
        if let Some(bsg) = extract_bsg_number(&entry.title) {
            out.push_str(&format!("   URL: {}\n", law_url(bsg)));
        }
        if let Some(snippet) = entry.snippets.first() {
            out.push_str(&format!("   \"{snippet}\"\n"));
        }
    }

    out.push('\n');
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use belex_gemini::GenerationResponse;
    use belex_search::SourceMap;

    fn answer_with_sources() -> Answer {
        let response: GenerationResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Die Probezeit dauert drei Monate."}], "role": "model"},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"retrievedContext": {"title": "Unbekannt.pdf", "text": "Randnotiz"}},
                        {"retrievedContext": {"title": "BSG_153.01_Personalgesetz.pdf", "text": "Art. 5"}}
                    ]
                }
            }]
        }))
        .unwrap();
        Answer {
            text: response.text().to_string(),
            sources: SourceMap::from_response(&response),
        }
    }

    #[test]
    fn sources_are_numbered_alphabetically_with_portal_links() {
        let rendered = render_answer(&answer_with_sources());

        let bsg_position = rendered.find("1. BSG_153.01_Personalgesetz.pdf").unwrap();
        let plain_position = rendered.find("2. Unbekannt.pdf").unwrap();
        assert!(bsg_position < plain_position);

        assert!(rendered.contains("URL: https://www.belex.sites.be.ch/api/de/texts_of_law/153.01"));
        assert!(rendered.contains("   \"Art. 5\""));

        // No registry number, no link line.
        let plain_block = &rendered[plain_position..];
        assert!(!plain_block.contains("URL:"), "{plain_block}");
    }

    #[test]
    fn empty_answers_are_flagged() {
        let answer = Answer { text: String::new(), sources: SourceMap::default() };
        let rendered = render_answer(&answer);
        assert!(rendered.contains("No answer generated"));
        assert!(!rendered.contains("Sources"));
    }
}
