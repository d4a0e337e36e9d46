//! chatcache - cached chat store walkthrough

mod cli;

use anyhow::{Context, Result};
use chatcache_core::actions::{CallKind, FileKind, NotificationChannel};
use chatcache_core::{
    perform, Action, CacheProxy, ChatStore, ChatcacheConfig, ContactList, DataEvent,
    NotificationService, TracingSink, UserId,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chatcache",
    version,
    about = "In-memory chat store behind a read-through cache",
    long_about = "Walks through an in-memory chat store fronted by a read-through,\n\
                  write-invalidate cache proxy.\n\
                  \n\
                  Examples:\n\
                    chatcache                              # Run the demo (default)\n\
                    chatcache scenario -u 1 -u 2 hi there  # Send messages, print history\n\
                    chatcache scenario --json hi           # Same, as JSON\n\
                    chatcache contacts                     # Friend / block list demo\n\
                  \n\
                  Environment Variables:\n\
                    CHATCACHE_CONFIG                       # Config file path\n\
                    CHATCACHE_CACHE_ENABLED                # Override cache.enabled\n\
                    CHATCACHE_LOG_LEVEL                    # Override log.level\n\
                    CHATCACHE_NO_COLOR                     # Disable ANSI colors"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Config file (default: <config_dir>/chatcache/config.toml)
    #[arg(long, env = "CHATCACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, overrides config (RUST_LOG still wins)
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "CHATCACHE_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Create a chat, send, read twice (miss then hit), pin, notify, call, send a file
    Demo,
    /// Create one chat and send the given messages through the cache
    Scenario {
        /// Participant ids; the first one sends every message
        #[arg(long = "user", short = 'u', default_values_t = [1u64, 2])]
        users: Vec<u64>,
        /// Message contents
        #[arg(required = true)]
        messages: Vec<String>,
        /// Pin the first message
        #[arg(long)]
        pin_first: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build friend and block lists and print them
    Contacts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        ChatcacheConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }

    init_logging(&config.log.level, cli.no_color)?;
    debug!(?config, "Configuration resolved");

    match cli.mode.unwrap_or(Mode::Demo) {
        Mode::Demo => run_demo(config, cli.no_color).await?,
        Mode::Scenario {
            users,
            messages,
            pin_first,
            json,
        } => run_scenario(config, users, messages, pin_first, json, cli.no_color)?,
        Mode::Contacts => run_contacts(),
    }

    Ok(())
}

fn init_logging(level: &str, no_color: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level directive: {}", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

fn build(config: &ChatcacheConfig) -> (Arc<ChatStore>, CacheProxy) {
    let store = Arc::new(ChatStore::new(config.store.clone()));
    let proxy = CacheProxy::new(Arc::clone(&store), config.cache.clone());
    (store, proxy)
}

async fn run_demo(config: ChatcacheConfig, no_color: bool) -> Result<()> {
    let (store, proxy) = build(&config);

    // Log store events as they happen; the loop ends once the store is dropped
    let mut events = store.event_bus().subscribe();
    debug!(
        subscribers = store.event_bus().subscriber_count(),
        "Event listener attached"
    );
    let listener = tokio::spawn(async move {
        let mut seen = 0usize;
        loop {
            match events.recv().await {
                Ok(event) => {
                    seen += 1;
                    log_event(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event listener lagged");
                }
                Err(RecvError::Closed) => break seen,
            }
        }
    });

    let sink = TracingSink;
    let mut notifications = NotificationService::new();
    notifications.add_channel(NotificationChannel::Email);
    notifications.add_channel(NotificationChannel::Sms);

    let chat = proxy
        .create_chat([UserId::new(1), UserId::new(2)])
        .context("Failed to create chat")?;
    proxy
        .send_message(chat, UserId::new(1), "Hello!")
        .context("Failed to send message")?;

    // First read misses, second is served from the memo
    let messages = proxy.get_messages(chat)?;
    let _again = proxy.get_messages(chat)?;

    if let Some(first) = messages.first() {
        proxy.pin_message(chat, first.id());
    }

    println!("Messages in chat {}:", chat);
    println!("{}", cli::format_message_table(&messages, false, no_color));
    println!("\nPinned messages in chat {}:", chat);
    println!(
        "{}",
        cli::format_message_table(&proxy.list_pinned(chat)?, false, no_color)
    );
    println!("\nChats of user 2:");
    println!(
        "{}",
        cli::format_chat_table(&proxy.get_user_chats(UserId::new(2)), false, no_color)
    );

    notifications.notify_all(&sink, "New message sent.");
    perform(
        &sink,
        Action::StartCall {
            kind: CallKind::Video,
            caller: "Alice".to_string(),
            receiver: "Bob".to_string(),
        },
    );
    perform(
        &sink,
        Action::EndCall {
            caller: "Alice".to_string(),
            receiver: "Bob".to_string(),
        },
    );
    perform(
        &sink,
        Action::SendFile {
            kind: FileKind::from_path("doc.txt"),
            path: "doc.txt".to_string(),
        },
    );

    println!("\n{}", cli::format_cache_stats(&proxy.stats(), false));

    drop(proxy);
    drop(store);
    let seen = listener.await.context("Event listener task failed")?;
    info!(events = seen, "Demo complete");

    Ok(())
}

fn run_scenario(
    config: ChatcacheConfig,
    users: Vec<u64>,
    messages: Vec<String>,
    pin_first: bool,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let (_store, proxy) = build(&config);
    let users: Vec<UserId> = users.into_iter().map(UserId::new).collect();
    let sender = *users
        .first()
        .context("At least one participant is required")?;

    let chat = proxy.create_chat(users.iter().copied())?;
    let mut first = None;
    for content in messages {
        let id = proxy
            .send_message(chat, sender, content)
            .with_context(|| format!("Failed to send to chat {}", chat))?;
        first.get_or_insert(id);
    }

    if pin_first {
        if let Some(id) = first {
            proxy.pin_message(chat, id);
        }
    }

    let history = proxy.get_messages(chat)?;
    println!("{}", cli::format_message_table(&history, json, no_color));

    if !json {
        let pinned = proxy.list_pinned(chat)?;
        if !pinned.is_empty() {
            println!("\nPinned:");
            println!("{}", cli::format_message_table(&pinned, false, no_color));
        }
        println!("\n{}", cli::format_cache_stats(&proxy.stats(), false));
    }

    Ok(())
}

fn run_contacts() {
    let mut contacts = ContactList::new();
    contacts.add_friend("Alice");
    contacts.add_friend("Bob");
    contacts.add_friend("Carol");
    contacts.block("Mallory");
    contacts.block("Bob");

    print!("{}", contacts.render());
}

fn log_event(event: &DataEvent) {
    match event {
        DataEvent::ChatCreated {
            chat_id,
            participants,
        } => info!(%chat_id, participants = participants.len(), "event: chat created"),
        DataEvent::MessageSent {
            chat_id,
            message_id,
            sender_id,
        } => info!(%chat_id, %message_id, %sender_id, "event: message sent"),
        DataEvent::MessagePinned {
            chat_id,
            message_id,
        } => info!(%chat_id, %message_id, "event: message pinned"),
    }
}
