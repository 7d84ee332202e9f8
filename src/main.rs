//! Flashgen - Flashcards from selected text
//!
//! Command-line front end and IPC host for the flashcard generator.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flashgen::collection::CollectionStore;
use flashgen::config::{self, Config};
use flashgen::core::{context_for_word, parse_response, FlashcardRecord, Mode, TextSegments};
use flashgen::error::{FlashError, FlashResult};
use flashgen::export;
use flashgen::generator::{GenerationOutcome, GenerationRequest, Generator};
use flashgen::ipc::{IpcRequest, IpcResponse, IpcServer};
use flashgen::llm;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate records for a selection
    Generate {
        #[arg(short, long)]
        mode: Mode,
        /// Selected text
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,
        /// Read the selection from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Word to define (language mode)
        #[arg(short, long)]
        word: Option<String>,
        /// Page text used to find the word's sentence (language mode)
        #[arg(long)]
        context_file: Option<PathBuf>,
        /// Append the result to the saved collection
        #[arg(long)]
        save: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the sentence context for a word in a text file
    Context {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long)]
        word: String,
        #[arg(short, long)]
        budget: Option<usize>,
    },

    /// Parse a saved model reply without calling the API
    Parse {
        #[arg(short, long)]
        mode: Mode,
        #[arg(short, long, default_value = "")]
        word: String,
        /// Reply file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Manage saved collections
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run the IPC host for the page integration
    Serve,
}

#[derive(Subcommand, Debug)]
enum CollectionAction {
    List {
        #[arg(short, long)]
        mode: Mode,
    },
    Count {
        #[arg(short, long)]
        mode: Mode,
    },
    Clear {
        #[arg(short, long)]
        mode: Mode,
    },
    Export {
        #[arg(short, long)]
        mode: Mode,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set { key: String, value: String },
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging: --verbose wins, then RUST_LOG, then INFO
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Generate {
            mode,
            text,
            file,
            word,
            context_file,
            save,
            json,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_file(&path)?,
                (None, None) => read_stdin()?,
            };
            generate(mode, text, word, context_file, save, json).await?
        }
        Command::Context { file, word, budget } => {
            let budget = budget.unwrap_or(Config::load()?.context_budget);
            let page = read_page(&file)?;
            match context_for_word(&page, &word, budget) {
                Some(window) => println!("{}", window.phrase),
                None => bail!("'{}' not found in {:?}", word, file),
            }
        }
        Command::Parse { mode, word, file } => {
            let content = match file {
                Some(path) => read_file(&path)?,
                None => read_stdin()?,
            };
            print_records(&parse_response(&content, mode, &word));
        }
        Command::Collection { action } => collection(action)?,
        Command::Config { action } => settings(action)?,
        Command::Serve => serve().await?,
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

/// Whole file as one segment, line breaks kept
fn read_page(path: &Path) -> Result<TextSegments> {
    Ok(TextSegments::from_text(&read_file(path)?))
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

fn print_records(records: &[FlashcardRecord]) {
    if records.is_empty() {
        println!("No records.");
    }
    for (i, record) in records.iter().enumerate() {
        let fields = record.fields();
        if let Some(word) = fields.word {
            println!(
                "{}. {} ({})",
                i + 1,
                word,
                fields.translation.unwrap_or_default()
            );
            println!("   Example: {}", fields.question);
            println!("   Meaning: {}", fields.answer);
        } else {
            println!("{}. Q: {}", i + 1, fields.question);
            println!("   A: {}", fields.answer);
        }
    }
}

async fn generate(
    mode: Mode,
    text: String,
    word: Option<String>,
    context_file: Option<PathBuf>,
    save: bool,
    json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let mut request = GenerationRequest::new(mode, text);
    if let Some(word) = word {
        request = request.with_word(word);
    }
    if let Some(path) = context_file {
        let page = read_page(&path)?;
        request = request.with_page_text(&page, config.context_budget);
    }

    let backend = llm::create_backend(&config)?;
    let generator = Generator::new(backend, config);
    let outcome = generator.generate_outcome(&request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if let Some(ref error) = outcome.error {
        bail!("{}", error);
    } else {
        print_records(&outcome.flashcards);
    }

    if save && outcome.success {
        let store = CollectionStore::new(config::collection_db_path())?;
        let added = store.add(mode, &outcome.flashcards)?;
        info!("💾 Saved {} record(s) to the {} collection", added, mode.collection_key());
    }
    Ok(())
}

fn collection(action: CollectionAction) -> Result<()> {
    let store = CollectionStore::new(config::collection_db_path())?;
    match action {
        CollectionAction::List { mode } => print_records(&store.list(mode)?),
        CollectionAction::Count { mode } => println!("{}", store.count(mode)?),
        CollectionAction::Clear { mode } => {
            let removed = store.clear(mode)?;
            println!("Removed {} record(s).", removed);
        }
        CollectionAction::Export { mode, output } => {
            let records = store.list(mode)?;
            if records.is_empty() {
                warn!("⚠️ The {} collection is empty", mode.collection_key());
            }
            let path = export::write_csv(mode, &records, output.as_deref())?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn settings(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set_value(&key, &value)?;
            config.save()?;
            info!("⚙️ Updated {}", key);
        }
        ConfigAction::Reset => {
            Config::reset()?;
            println!("Settings restored to defaults.");
        }
    }
    Ok(())
}

/// Build a generator from the current settings
fn load_generator() -> FlashResult<Generator> {
    let config = Config::load().map_err(FlashError::Other)?;
    let backend = llm::create_backend(&config)?;
    Ok(Generator::new(backend, config))
}

async fn serve() -> Result<()> {
    info!("🃏 Flashgen v{} starting...", env!("CARGO_PKG_VERSION"));

    let store = CollectionStore::new(config::collection_db_path())?;
    let runtime = tokio::runtime::Handle::current();

    let mut server = IpcServer::new();
    server.start(move |request| match request {
        IpcRequest::GenerateFlashcards {
            seq_id,
            text,
            mode,
            word,
            context,
        } => {
            let request = GenerationRequest {
                mode,
                text,
                word,
                context,
            };
            // Settings are re-read per request so option changes apply at once
            let outcome = match load_generator() {
                Ok(generator) => runtime.block_on(generator.generate_outcome(&request)),
                Err(e) => GenerationOutcome::from(Err::<Vec<FlashcardRecord>, _>(e)),
            };
            IpcResponse::flashcards(seq_id, outcome)
        }
        IpcRequest::SaveFlashcards {
            seq_id,
            mode,
            flashcards,
        } => match store.add(mode, &flashcards) {
            Ok(added) => IpcResponse::Ack {
                seq_id,
                success: true,
                message: Some(format!("Saved {} record(s)", added)),
            },
            Err(e) => IpcResponse::Ack {
                seq_id,
                success: false,
                message: Some(e.to_string()),
            },
        },
        IpcRequest::StatusRequest { seq_id } => {
            let config = Config::load().unwrap_or_default();
            IpcResponse::StatusResponse {
                seq_id,
                ready: !config.api_key.is_empty(),
                model: config.model,
            }
        }
    })?;

    info!("✅ Flashgen ready on {:?}", server.path());

    tokio::signal::ctrl_c().await?;
    info!("👋 Shutting down");
    server.stop();
    Ok(())
}
