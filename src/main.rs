use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use transchat::config::{default_conversations_path, Config};
use transchat::conversation::{Action, ConversationStore, Message, ModelType, Sender};
use transchat::orchestrator::DEFAULT_TARGET_LANGUAGE;
use transchat::server;
use transchat::upload::{SupportedType, MAX_UPLOAD_BYTES};

#[derive(Parser)]
#[command(name = "transchat", version, about = "Chat and document translation over a hosted language model")]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Translate a .pdf or .txt file and print the JSON result
    Translate {
        file: PathBuf,
        /// Target language
        #[arg(long = "to")]
        to: Option<String>,
    },
    /// Interactive chat with locally saved history
    Chat {
        #[arg(long, default_value = DEFAULT_TARGET_LANGUAGE)]
        language: String,
        /// Resume an existing conversation
        #[arg(long)]
        conversation: Option<String>,
        /// History file (defaults to the platform data directory)
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Print the JSON Schema of config.toml
    ConfigSchema,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("transchat=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Command::ConfigSchema => {
            println!("{}", Config::json_schema()?);
            Ok(())
        }
        Command::Serve { host, port } => {
            let mut config = Config::load(config_path.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(config).await
        }
        Command::Translate { file, to } => {
            let config = Config::load(config_path.as_deref())?;
            translate_file(&config, &file, to.as_deref()).await
        }
        Command::Chat {
            language,
            conversation,
            history,
        } => {
            let config = Config::load(config_path.as_deref())?;
            let history = history.unwrap_or_else(default_conversations_path);
            chat_repl(&config, language, conversation, &history).await
        }
    }
}

async fn translate_file(config: &Config, file: &Path, to: Option<&str>) -> Result<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("File name is not valid UTF-8")?
        .to_string();
    let Some(declared_type) = SupportedType::from_file_name(&name) else {
        bail!(
            "Unsupported file type: '{}'. Supported types: {}",
            name,
            SupportedType::allowed_list()
        );
    };

    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    if data.len() > MAX_UPLOAD_BYTES {
        bail!("File '{}' is larger than {}MB", name, MAX_UPLOAD_BYTES / (1024 * 1024));
    }

    let state = server::build_state(config)?;
    let upload = state.storage.store(&name, declared_type, &data).await?;
    match state.orchestrator.translate(upload, to).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(failure) => bail!("Translation failed ({}): {}", failure.kind.as_str(), failure.message),
    }
}

const CHAT_HELP: &str = "Commands: /new, /list, /lang <Language>, /delete, /quit";

async fn chat_repl(
    config: &Config,
    language: String,
    resume: Option<String>,
    history: &Path,
) -> Result<()> {
    let orchestrator = server::build_state(config)?.orchestrator;
    let mut store = ConversationStore::load(history)
        .await
        .with_context(|| format!("Failed to load history from {}", history.display()))?;

    let mut current = match resume {
        Some(id) if store.get(&id).is_some() => id,
        Some(id) => bail!("No conversation with id {}", id),
        None => new_conversation(&mut store, &language)?,
    };

    println!("{}", CHAT_HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
            ("/quit", _) | ("/exit", _) => break,
            ("/new", _) => {
                let lang = conversation_language(&store, &current, &language);
                current = new_conversation(&mut store, &lang)?;
                println!("Started conversation {}", current);
            }
            ("/list", _) => {
                for record in store.list() {
                    let marker = if record.id == current { "*" } else { " " };
                    println!(
                        "{} {}  {}  [{}] {} messages",
                        marker,
                        record.id,
                        record.title,
                        record.language,
                        record.messages.len()
                    );
                }
            }
            ("/lang", lang) if !lang.is_empty() => {
                store.apply(Action::SetLanguage {
                    conversation_id: current.clone(),
                    language: lang.to_string(),
                })?;
                println!("Language set to {}", lang);
            }
            ("/delete", _) => {
                let lang = conversation_language(&store, &current, &language);
                store.apply(Action::Delete {
                    conversation_id: current.clone(),
                })?;
                current = new_conversation(&mut store, &lang)?;
                println!("Deleted. Started conversation {}", current);
            }
            (cmd, _) if cmd.starts_with('/') => println!("{}", CHAT_HELP),
            _ => {
                let lang = conversation_language(&store, &current, &language);
                store.apply(Action::AppendMessage {
                    conversation_id: current.clone(),
                    message: Message::new(Sender::User, line),
                })?;
                match orchestrator.chat(line, Some(&lang)).await {
                    Ok(outcome) => {
                        println!("{}", outcome.response);
                        store.apply(Action::AppendMessage {
                            conversation_id: current.clone(),
                            message: Message::new(Sender::Bot, outcome.response),
                        })?;
                    }
                    Err(failure) => eprintln!("Chat failed: {}", failure.message),
                }
            }
        }
        store.save(history).await?;
    }

    store.save(history).await?;
    Ok(())
}

fn new_conversation(store: &mut ConversationStore, language: &str) -> Result<String> {
    Ok(store.apply(Action::Create {
        language: language.to_string(),
        model_type: ModelType::Chat,
    })?)
}

fn conversation_language(store: &ConversationStore, id: &str, fallback: &str) -> String {
    store
        .get(id)
        .map(|c| c.language.clone())
        .unwrap_or_else(|| fallback.to_string())
}
