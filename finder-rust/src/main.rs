use anyhow::Result;
use bbp_finder::{
    CascadeDeleteReport, Extraction, OpenAIConnector, Session, SessionConfig, UploadFile,
    UploadReport,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bbp-finder")]
#[command(
    about = "Find out whether a bug bounty program exists for a domain, email or organization",
    long_about = None
)]
struct Cli {
    /// OpenAI API key (defaults to OPENAI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model used for lookups (defaults to OPENAI_MODEL or gpt-4.1-mini)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Vector store used as the knowledge base (defaults to BBP_VECTOR_STORE_ID)
    #[arg(long, global = true)]
    store: Option<String>,

    /// Alternative API base URL (defaults to OPENAI_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a bug bounty program (domain, email, org name, URLs, ...)
    Find {
        #[arg(required = true, num_args = 1..)]
        input: Vec<String>,
    },
    /// Manage vector stores
    Stores {
        #[command(subcommand)]
        action: StoresAction,
    },
    /// Manage files of the active vector store
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },
}

#[derive(Subcommand)]
enum StoresAction {
    /// Create a vector store and use it as the knowledge base
    Create {
        #[arg(long, default_value = "knowledge_base")]
        name: String,
    },
    /// List vector stores
    List,
    /// Delete a vector store together with its files
    Delete { id: String },
}

#[derive(Subcommand)]
enum FilesAction {
    /// List files with their indexing status
    List,
    /// Upload files and wait for them to be indexed
    Upload {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
    /// Detach a file from the vector store
    Remove { file_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = SessionConfig::from_env();
    if let Some(api_key) = cli.api_key {
        config.set_api_key(api_key);
    }
    if let Some(model) = cli.model {
        config.set_model(model);
    }
    if let Some(store) = cli.store {
        config.set_active_store(store);
    }
    if let Some(base_url) = cli.base_url {
        config.set_base_url(base_url);
    }

    let mut session = Session::new(config, OpenAIConnector);

    match cli.command {
        Commands::Find { input } => {
            let extraction = session.find_program(&input.join(" ")).await?;
            print_extraction(&extraction);
        }
        Commands::Stores { action } => match action {
            StoresAction::Create { name } => {
                let store = session.create_store(&name).await?;
                println!("Created new vector store: {}", store.id);
            }
            StoresAction::List => {
                let active = session.config().active_store_id().map(ToString::to_string);
                for store in session.list_stores().await? {
                    let marker = if active.as_deref() == Some(store.id.as_str()) {
                        " (active)"
                    } else {
                        ""
                    };
                    let name = store.name.as_deref().unwrap_or("(unnamed)");
                    println!("{name} ({}){marker}", store.id);
                }
            }
            StoresAction::Delete { id } => {
                let report = session.delete_store(&id).await?;
                print_delete_report(&report);
            }
        },
        Commands::Files { action } => match action {
            FilesAction::List => {
                let files = session.list_files(None).await?;
                if files.is_empty() {
                    println!("No files.");
                }
                for file in files {
                    println!("{} [{}] status: {}", file.filename, file.file_id, file.status);
                }
            }
            FilesAction::Upload { paths } => {
                let mut uploads = Vec::with_capacity(paths.len());
                for path in paths {
                    uploads.push(UploadFile::from_path(&path).await?);
                }

                let cancel = CancellationToken::new();
                let on_interrupt = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        on_interrupt.cancel();
                    }
                });

                let report = session.upload_files(uploads, &cancel).await?;
                print_upload_report(&report);
            }
            FilesAction::Remove { file_id } => {
                session.remove_file(None, &file_id).await?;
                println!("Deleted: {file_id}");
            }
        },
    }

    Ok(())
}

fn print_extraction(extraction: &Extraction) {
    if extraction.text().is_empty() {
        println!("No output returned.");
        return;
    }
    println!("{}", extraction.text());

    let citations = extraction.citations();
    if !citations.is_empty() {
        println!();
        println!("Citations:");
        for citation in citations {
            let filename = non_empty_or(&citation.filename, "(unknown file)");
            let file_id = non_empty_or(&citation.file_id, "(no id)");
            println!("- {filename} [{file_id}]");
        }
    }
}

fn print_delete_report(report: &CascadeDeleteReport) {
    if let Some(error) = &report.listing_error {
        eprintln!("Could not list files of {}: {error}", report.collection_id);
    }
    for failure in &report.failed {
        eprintln!("Failed to delete file {}: {}", failure.item, failure.error);
    }
    println!(
        "Deleted vector store: {} (and {} related files)",
        report.collection_id,
        report.succeeded.len()
    );
}

fn print_upload_report(report: &UploadReport) {
    for failure in &report.failed {
        eprintln!("Failed to upload {}: {}", failure.item, failure.error);
    }
    println!("Upload finished:");
    for file in &report.succeeded {
        println!("- {} [{}] status: {}", file.filename, file.file_id, file.status);
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
