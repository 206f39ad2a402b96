//! kgqa CLI
//!
//! Ask questions in natural language against a SPARQL graph store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kgqa_agents::{ChatClient, OntologyLoader, QueryAgent, QueryResponse, QuerySynthesizer, SynthesizerConfig};
use kgqa_core::Ontology;
use kgqa_store::{GraphStoreClient, StoreConfig};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// kgqa - natural-language questions over a knowledge graph
#[derive(Parser)]
#[command(name = "kgqa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question
    Ask {
        /// The question, in any supported language
        question: String,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a SPARQL query directly
    Query {
        /// SPARQL query text
        sparql: String,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the ontology used to ground queries
    Ontology,

    /// Interactive mode
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store_config = StoreConfig::from_env();
    info!("Graph store: {}", store_config.endpoint_url());
    let store = GraphStoreClient::http(store_config);
    let loader = OntologyLoader::from_env();

    match cli.command {
        Commands::Ask { question, json } => {
            let agent = build_agent(store, &loader).await;
            let response = agent.handle(&question).await;
            print_response(&response, json)?;
        }
        Commands::Query { sparql, json } => {
            // Raw queries need no ontology.
            let agent = QueryAgent::new(synthesizer(), store, Arc::new(Ontology::new("")));
            let response = agent.execute_raw(&sparql).await;
            print_response(&response, json)?;
        }
        Commands::Ontology => {
            let ontology = loader.load(&store).await;
            if ontology.is_degraded() {
                eprintln!("Warning: ontology could not be loaded");
            }
            println!("{}", ontology);
        }
        Commands::Interactive => {
            let agent = build_agent(store, &loader).await;
            cmd_interactive(agent).await?;
        }
    }

    Ok(())
}

fn synthesizer() -> QuerySynthesizer {
    let llm = ChatClient::from_env();
    info!("Language model endpoint: {}", llm.base_url());
    QuerySynthesizer::new(Arc::new(llm), SynthesizerConfig::from_env())
}

async fn build_agent(store: GraphStoreClient, loader: &OntologyLoader) -> QueryAgent {
    let agent = QueryAgent::bootstrap(synthesizer(), store, loader).await;
    if agent.ontology().is_degraded() {
        warn!("Ontology unavailable; answers will likely fail");
    }
    agent
}

async fn cmd_interactive(agent: QueryAgent) -> Result<()> {
    println!("kgqa interactive mode. Type a question, or 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "quit" | "exit") {
            break;
        }

        let response = agent.handle(question).await;
        print_response(&response, false)?;
        println!();
    }

    Ok(())
}

fn print_response(response: &QueryResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    if let Some(query) = response.sparql_query() {
        println!("SPARQL:\n{}\n", query.trim());
    }

    if !response.columns.is_empty() {
        print!("{}", format_table(&response.columns, &response.rows));
    }

    if let Some(message) = &response.message {
        println!("{}", message);
    }

    Ok(())
}

fn format_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut out = String::new();
    out.push_str(&render(columns));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&render(row));
        out.push('\n');
    }
    out.push_str(&format!("\n{} row(s)\n", rows.len()));
    out
}
