use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use bothub_bot::application::errors::BotError;
use bothub_bot::application::messaging::{Context, Dispatcher, HandlerRegistry, MessageParser};
use bothub_bot::domain::entities::{Event, IntentCatalog, RichMessage, User};
use bothub_bot::domain::traits::{MessageSender, StateStore};
use bothub_bot::infrastructure::adapters::ConsoleSender;
use bothub_bot::infrastructure::config::{load_catalog, Config, StorageBackend};
use bothub_bot::infrastructure::database::SqliteStore;
use bothub_bot::infrastructure::storage::MemoryStore;

const CONSOLE_CHANNEL: &str = "console";
const CONSOLE_USER: &str = "console-user";

#[derive(Parser)]
#[command(name = "bothub-bot")]
#[command(about = "Command and intent dispatcher for chat bots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Intent catalog path (overrides config)
    #[arg(short, long)]
    intents: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to the bot on the console
    Run,
    /// List the intents in the catalog
    Intents,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli.config, cli.intents.clone());

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .init();

    let outcome = match cli.command {
        Commands::Run => run_bot(&config),
        Commands::Intents => list_intents(&config),
        Commands::Version => {
            println!("bothub-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = outcome {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &str, intents_override: Option<PathBuf>) -> Config {
    let config = if std::path::Path::new(path).exists() {
        Config::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        Config::default()
    };

    let mut config = config.with_env();
    if let Some(intents) = intents_override {
        config.intents.path = intents;
    }
    config
}

fn run_bot(config: &Config) -> Result<(), BotError> {
    tracing::info!("Starting {}", config.bot.name);

    let catalog = Arc::new(load_catalog(&config.intents.path)?);
    tracing::info!("Loaded {} intents from {}", catalog.len(), config.intents.path.display());

    let store: Arc<dyn StateStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Sqlite => {
            tracing::info!("Storing user data in {}", config.storage.path.display());
            Arc::new(SqliteStore::new(&config.storage.path)?)
        }
    };
    let sender = Arc::new(ConsoleSender::new());

    let registry = Arc::new(build_registry(&catalog)?);
    for intent_id in registry.unbound_intents(&catalog) {
        tracing::warn!("Intent {} has no completion handler", intent_id);
    }

    let dispatcher = Dispatcher::new(registry, catalog, store, sender.clone())
        .with_parser(MessageParser::new(config.bot.prefix.clone()));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_console_bot(Arc::new(dispatcher), sender))
}

/// Handlers of the console bot
fn build_registry(catalog: &Arc<IntentCatalog>) -> Result<HandlerRegistry, BotError> {
    let help_catalog = Arc::clone(catalog);
    let mut builder = HandlerRegistry::builder()
        .strict()
        .command("help", move |inv, _args| {
            let mut help = "Available commands:\n  /help - Show this message\n  /cancel - Abandon the current question\n".to_string();
            for intent in help_catalog.all() {
                help.push_str(&format!("  /intent {}\n", intent.id));
            }
            inv.reply(help)?;
            Ok(())
        })
        .command("cancel", |inv, _args| {
            let intents = inv.intent_state();
            if intents.is_opened()? {
                intents.close()?;
                inv.reply("Cancelled.")?;
            } else {
                inv.reply("Nothing to cancel.")?;
            }
            Ok(())
        })
        .command("whoami", |inv, _args| {
            let message = RichMessage::new()
                .set_text(format!("You are {} on {}", inv.event.sender, inv.event.channel))
                .add_keyboard_button("/help");
            inv.reply(message)?;
            Ok(())
        })
        .on_default(|inv| {
            inv.reply(format!("Echo: {}", inv.event.content))?;
            Ok(())
        });

    for intent in catalog.all() {
        builder = builder.intent(intent.id.clone(), |inv, answers| {
            let mut summary = "Thanks! I got:".to_string();
            for (slot_id, answer) in answers.iter() {
                summary.push_str(&format!("\n  {}: {}", slot_id, answer));
            }
            inv.reply(summary)?;
            Ok(())
        });
    }

    Ok(builder.build()?)
}

async fn run_console_bot(dispatcher: Arc<Dispatcher>, sender: Arc<ConsoleSender>) -> Result<(), BotError> {
    tracing::info!("Console bot ready, type /help");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let event = Event::new(CONSOLE_CHANNEL, User::new(CONSOLE_USER), input);
        let recipient = event.recipient();
        let worker = Arc::clone(&dispatcher);
        // One event at a time, so a user's intent state is never raced
        let outcome = tokio::task::spawn_blocking(move || worker.dispatch(&event, &Context::new()))
            .await
            .map_err(|e| BotError::Internal(e.to_string()))?;

        if let Err(e) = outcome {
            tracing::warn!("Dispatch failed: {}", e);
            if let Err(e) = sender.send(&recipient, &format!("Error: {}", e).into()) {
                tracing::error!("Failed to report error: {}", e);
            }
        }
    }

    tracing::info!("stdin closed, stopping");
    Ok(())
}

fn list_intents(config: &Config) -> Result<(), BotError> {
    let catalog = load_catalog(&config.intents.path)?;
    if catalog.is_empty() {
        println!("No intents in {}", config.intents.path.display());
        return Ok(());
    }

    for intent in catalog.all() {
        println!(
            "{} -> {}",
            intent.id,
            intent.completion_handler_name.as_deref().unwrap_or("-")
        );
        for slot in &intent.slots {
            let options = if slot.options.is_empty() {
                String::new()
            } else {
                format!(" [{}]", slot.options.join(", "))
            };
            println!("  {} ({}): {}{}", slot.id, slot.datatype, slot.question, options);
        }
    }
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = serde_yaml::to_string(&Config::default())
        .map_err(|e| BotError::Internal(e.to_string()))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
