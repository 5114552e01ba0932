use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use finsearch_core::{IndexPaths, SearchEngine};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

const MAX_SHOWN: usize = 15;

#[derive(Parser)]
#[command(name = "finsearch")]
#[command(about = "Index and search a folder of news articles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from the articles in a directory and persist it
    Index {
        /// Corpus directory (searched recursively)
        directory: PathBuf,
        /// Directory the index files are written to
        #[arg(long, default_value = "./index")]
        index_dir: PathBuf,
    },
    /// Run a query, loading the persisted index or rebuilding it first
    Query {
        /// Query text, e.g. `profit -fell org:acme`
        text: String,
        /// Corpus directory, used when the index must be rebuilt
        #[arg(long, default_value = ".")]
        directory: PathBuf,
        /// Directory the index files live in
        #[arg(long, default_value = "./index")]
        index_dir: PathBuf,
    },
    /// Interactive create-index / load-index / search loop
    Ui,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Index { directory, index_dir } => cmd_index(&directory, &index_dir),
        Commands::Query { text, directory, index_dir } => cmd_query(&text, &directory, &index_dir),
        Commands::Ui => run_ui(),
    }
}

fn cmd_index(directory: &Path, index_dir: &Path) -> Result<()> {
    if !directory.is_dir() {
        bail!("directory {} does not exist", directory.display());
    }
    let paths = IndexPaths::new(index_dir);
    SearchEngine::rebuild(directory, &paths)?;
    println!("Index created successfully!");
    Ok(())
}

fn cmd_query(text: &str, directory: &Path, index_dir: &Path) -> Result<()> {
    let paths = IndexPaths::new(index_dir);
    let engine = SearchEngine::open(directory, &paths)?;
    let results = engine.search(text);
    tracing::info!(hits = results.len(), "query evaluated");
    print_results(&results);
    Ok(())
}

fn print_results(results: &[String]) {
    println!("\nFound {} results:\n", results.len());
    for (i, path) in results.iter().take(MAX_SHOWN).enumerate() {
        println!("{}. File: {}", i + 1, path);
        if let Some(title) = article_string_field(Path::new(path), "title") {
            println!("   Title: {title}");
        }
        println!();
    }
    if results.len() > MAX_SHOWN {
        println!("(Showing first {MAX_SHOWN} of {} results)", results.len());
    }
}

fn article_json(path: &Path) -> Option<serde_json::Value> {
    let raw = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

fn article_string_field(path: &Path, field: &str) -> Option<String> {
    article_json(path)?
        .get(field)?
        .as_str()
        .map(|s| s.to_string())
}

// --- interactive mode ---

fn run_ui() -> Result<()> {
    let data_dir = PathBuf::from(prompt("Enter data directory path: ")?.trim().to_string());
    if !data_dir.is_dir() {
        bail!("directory {} does not exist", data_dir.display());
    }
    let paths = IndexPaths::new(data_dir.join("index"));
    let mut engine: Option<SearchEngine> = None;

    loop {
        print_menu();
        let choice = prompt("Choice: ")?;
        match choice.trim() {
            "1" => {
                println!("Creating new index...");
                match SearchEngine::rebuild(&data_dir, &paths) {
                    Ok(e) => {
                        engine = Some(e);
                        println!("Index created successfully!");
                    }
                    Err(err) => println!("Error creating index: {err}"),
                }
            }
            "2" => {
                println!("Loading existing index...");
                match SearchEngine::open(&data_dir, &paths) {
                    Ok(e) => {
                        engine = Some(e);
                        println!("Index loaded successfully!");
                    }
                    Err(err) => println!("Error loading index: {err}"),
                }
            }
            "3" => handle_search(engine.as_ref())?,
            "4" => {
                println!("Goodbye!");
                return Ok(());
            }
            "" => continue,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn print_menu() {
    println!("\nFinancial News Search Engine");
    println!("============================");
    println!("1. Create new index");
    println!("2. Load existing index");
    println!("3. Search");
    println!("4. Exit");
    println!("============================");
}

fn handle_search(engine: Option<&SearchEngine>) -> Result<()> {
    let Some(engine) = engine else {
        println!("Please create or load an index first.");
        return Ok(());
    };

    let query = prompt("Enter search query: ")?;
    let query = query.trim();
    if query.is_empty() {
        println!("Empty search query. Please try again.");
        return Ok(());
    }

    let results = engine.search(query);
    print_results(&results);
    if results.is_empty() {
        return Ok(());
    }

    loop {
        let input = prompt("\nEnter result number to view full article (0 to return to menu): ")?;
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        let Ok(number) = input.parse::<usize>() else {
            println!("Invalid input. Please enter a number.");
            continue;
        };
        if number == 0 {
            return Ok(());
        }
        let shown = results.len().min(MAX_SHOWN);
        if (1..=shown).contains(&number) {
            display_article(Path::new(&results[number - 1]));
        } else {
            println!("Invalid result number. Please try again.");
        }
    }
}

fn display_article(path: &Path) {
    let Some(article) = article_json(path) else {
        println!("Error: could not open {}", path.display());
        return;
    };

    println!("\n===========================================\n");
    if let Some(title) = article.get("title").and_then(|v| v.as_str()) {
        println!("Title: {title}\n");
    }
    if let Some(date) = article.get("published").and_then(|v| v.as_str()) {
        println!("Date: {date}\n");
    }
    if let Some(text) = article.get("text").and_then(|v| v.as_str()) {
        println!("Content:\n{text}");
    }
    if let Some(entities) = article.get("entities") {
        print_entity_list(entities, "organizations", "Organizations mentioned:");
        print_entity_list(entities, "persons", "Persons mentioned:");
    }
    println!("\n===========================================");
}

fn print_entity_list(entities: &serde_json::Value, key: &str, heading: &str) {
    let Some(items) = entities.get(key).and_then(|v| v.as_array()) else {
        return;
    };
    if items.is_empty() {
        return;
    }
    println!("\n{heading}");
    for item in items {
        if let Some(name) = item.get("name").and_then(|v| v.as_str()) {
            println!("- {name}");
        }
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
