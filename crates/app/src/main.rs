use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_chat_core::{
    discover_pdf_files, load_documents, ChatMessage, ChatRole, ChunkingConfig, LopdfExtractor,
    OpenAiChatModel, OpenAiEmbedder, PineconeStore, Session, UploadedDocument, UsageTotals,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-chat", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// API key for the embedding and chat-model endpoints.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long, default_value = "https://api.openai.com/v1")]
    openai_url: String,

    /// API key for the vector collection service.
    #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true)]
    pinecone_api_key: String,

    /// Index host URL of the vector collection service.
    #[arg(long, env = "PINECONE_INDEX_HOST")]
    pinecone_index_host: String,

    /// Vector collection that receives the chunk records.
    #[arg(long, default_value = "topic-modeling")]
    collection: String,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, chunk, and index PDFs without starting a chat.
    Ingest {
        /// PDF files to process.
        #[arg(long)]
        pdf: Vec<PathBuf>,

        /// Folder searched recursively for PDFs.
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// Index PDFs, then answer questions about them interactively.
    Chat {
        /// PDF files to process.
        #[arg(long)]
        pdf: Vec<PathBuf>,

        /// Folder searched recursively for PDFs.
        #[arg(long)]
        folder: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-chat boot"
    );

    let mut session = Session::new(
        LopdfExtractor,
        Arc::new(OpenAiEmbedder::new(&cli.openai_url, &cli.openai_api_key)),
        Arc::new(PineconeStore::new(
            &cli.pinecone_index_host,
            &cli.pinecone_api_key,
            &cli.collection,
        )?),
        Arc::new(OpenAiChatModel::new(&cli.openai_url, &cli.openai_api_key)),
        &cli.collection,
        ChunkingConfig::default(),
    );

    match cli.command {
        Command::Ingest { pdf, folder } => {
            let documents = collect_documents(pdf, folder)?;
            let report = session.process_documents(&documents).await?;

            println!(
                "{} document(s) -> {} chunk(s), {} record(s) upserted into '{}' at {}",
                report.documents,
                report.chunks,
                report.records_upserted,
                cli.collection,
                report.processed_at.to_rfc3339()
            );
        }
        Command::Chat { pdf, folder } => {
            let documents = collect_documents(pdf, folder)?;
            let report = session.process_documents(&documents).await?;
            info!(
                documents = report.documents,
                chunks = report.chunks,
                collection = %cli.collection,
                "documents processed"
            );

            println!(
                "{} document(s) processed; ask a question (empty line or 'exit' to quit)",
                report.documents
            );

            let stdin = io::stdin();
            let mut lines = stdin.lock().lines();
            loop {
                print!("question> ");
                io::stdout().flush()?;

                let Some(line) = lines.next() else { break };
                let question = line?.trim().to_string();
                if question.is_empty() || question == "exit" || question == "quit" {
                    break;
                }

                match session.ask(&question).await {
                    Ok(_) => {
                        render_transcript(session.render());
                        render_usage(session.usage());
                    }
                    Err(error) => {
                        warn!(%error, "question failed");
                        println!("error: {error} (you can retry)");
                    }
                }
            }
        }
    }

    Ok(())
}

fn collect_documents(
    pdf: Vec<PathBuf>,
    folder: Option<PathBuf>,
) -> anyhow::Result<Vec<UploadedDocument>> {
    let mut paths = pdf;
    if let Some(folder) = folder {
        paths.extend(discover_pdf_files(&folder));
    }

    if paths.is_empty() {
        anyhow::bail!("no PDF files given; pass --pdf and/or --folder");
    }

    Ok(load_documents(&paths)?)
}

fn render_transcript(transcript: &[ChatMessage]) {
    println!();
    for message in transcript {
        let speaker = match message.role {
            ChatRole::User => "you",
            _ => "assistant",
        };
        println!("{speaker}: {}", message.content);
    }
}

fn render_usage(totals: &UsageTotals) {
    println!();
    println!("token usage");
    println!("  tokens used: {}", totals.total_tokens);
    println!("  prompt tokens: {}", totals.prompt_tokens);
    println!("  completion tokens: {}", totals.completion_tokens);
    println!("  total cost: ${:.2}", totals.total_cost);
}
