//! Runecast CLI
//!
//! Thin wrapper around runecast-core for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Browse the futhark
//! runecast catalog list
//! runecast catalog show ansuz
//!
//! # List spreads and their positions
//! runecast spread list
//!
//! # Cast a three rune spread
//! runecast --user astrid draw three_rune --question "What should I focus on?"
//!
//! # Ask a yes/no question
//! runecast --user astrid yes-no "Should I take the job?"
//!
//! # Today's rune, with a reflection
//! runecast --user astrid daily --reflect "Patience paid off"
//!
//! # Past readings
//! runecast --user astrid history list
//! runecast --user astrid history notes <id> "It came true"
//!
//! # Premium
//! runecast --user astrid --token <jwt> subscription checkout
//! ```

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use clap::{Parser, Subcommand};
use runecast_core::logging::JsonlLayer;
use runecast_core::{
    AuthState, Divination, DivinationId, DrawnRune, InterpretationState, NotificationLevel,
    ReadingScope, RevealStatus, RuneConfig, RuneEngine, SaveState, Session, SpreadType,
};
use tokio::sync::broadcast;
use tracing_subscriber::prelude::*;

/// Runecast - Elder Futhark rune readings
#[derive(Parser)]
#[command(name = "runecast")]
#[command(version = "0.1.0")]
#[command(about = "Runecast - Elder Futhark rune readings")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Data directory (default: ~/.runecast)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Signed-in user id
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Access token forwarded to the remote services
    #[arg(long, global = true)]
    token: Option<String>,

    /// Write a JSONL journal to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the rune catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Spread layouts
    Spread {
        #[command(subcommand)]
        action: SpreadAction,
    },

    /// Cast a spread and reveal it
    Draw {
        /// Spread type (e.g. three_rune, celtic-cross)
        spread: String,

        /// The question to put to the runes
        #[arg(short, long)]
        question: String,

        /// Notes to attach once the reading is saved
        #[arg(short, long)]
        notes: Option<String>,

        /// Request an interpretation after the reveal
        #[arg(short, long)]
        interpret: bool,
    },

    /// Ask a yes/no question with a single rune
    YesNo {
        question: String,
    },

    /// Draw (or show) the rune of the day
    Daily {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Attach a reflection to the day's rune
        #[arg(short, long)]
        reflect: Option<String>,
    },

    /// Saved readings
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Favorite runes
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },

    /// Premium subscription
    Subscription {
        #[command(subcommand)]
        action: SubscriptionAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List all runes
    List,
    /// Show one rune by id or name
    Show { rune: String },
}

#[derive(Subcommand)]
enum SpreadAction {
    /// List spreads with their positions
    List,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved readings, newest first
    List,
    /// Show one reading
    Show { id: String },
    /// Replace a reading's notes (empty text clears them)
    Notes { id: String, text: String },
    /// Delete a reading
    Delete { id: String },
}

#[derive(Subcommand)]
enum FavoriteAction {
    Add { rune: String },
    Remove { rune: String },
    List,
}

#[derive(Subcommand)]
enum SubscriptionAction {
    /// Show subscription status
    Status,
    /// Start a checkout and print the URL
    Checkout {
        /// Price id (default: configured premium price)
        price: Option<String>,
    },
    /// Print the billing portal URL
    Portal,
    /// Confirm a finished checkout
    Verify { session_id: String },
}

fn setup_logging(verbosity: u8, log_dir: Option<&PathBuf>) -> Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let journal = log_dir.map(JsonlLayer::new).transpose()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(journal)
        .init();
    Ok(())
}

/// Get the default data directory (~/.runecast)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".runecast")
}

fn parse_divination_id(s: &str) -> Result<DivinationId> {
    DivinationId::from_string(s).map_err(|e| anyhow::anyhow!("Invalid divination ID '{}': {}", s, e))
}

fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn print_drawn(drawn: &DrawnRune) {
    println!(
        "  {}: {} {} ({})",
        drawn.position.label, drawn.rune.glyph, drawn.rune.name, drawn.orientation
    );
    println!("      {}", drawn.interpretation());
}

/// Print whatever the engine published while the command ran
fn drain_notifications(rx: &mut broadcast::Receiver<runecast_core::Notification>) {
    while let Ok(note) = rx.try_recv() {
        match note.level {
            NotificationLevel::Error => eprintln!("! {}: {}", note.title, note.message),
            _ => println!("{}: {}", note.title, note.message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    let mut config = RuneConfig::load(&data_dir)?;
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    setup_logging(cli.verbose, config.log_dir.as_ref())?;
    tracing::debug!(data_dir = %data_dir.display(), "runecast starting");

    let auth = AuthState::from_user(cli.user.as_deref(), cli.token.clone());
    let engine = RuneEngine::open(&config)?;
    let mut notifications = engine.subscribe();

    let result = run(&engine, &auth, &config, cli.command).await;
    drain_notifications(&mut notifications);
    result
}

async fn run(
    engine: &RuneEngine,
    auth: &AuthState,
    config: &RuneConfig,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Catalog { action } => handle_catalog(engine, action).await,

        Commands::Spread { action } => match action {
            SpreadAction::List => {
                for spread in SpreadType::ALL {
                    let premium = if spread.requires_premium() { " [premium]" } else { "" };
                    println!("{} ({}){}", spread.display_name(), spread.tag(), premium);
                    for position in spread.positions() {
                        println!("  {} - {}", position.label, position.description);
                    }
                }
                Ok(())
            }
        },

        Commands::Draw {
            spread,
            question,
            notes,
            interpret,
        } => {
            let session = auth.require()?;
            let spread: SpreadType = spread.parse()?;
            handle_draw(engine, session, spread, &question, notes.as_deref(), interpret).await
        }

        Commands::YesNo { question } => {
            let session = auth.require()?;
            let scope = ReadingScope::new();
            let (reading, answer) = engine.yes_no(session, &question, &scope).await?;

            println!("Question: {}", reading.question().unwrap_or_default());
            for drawn in reading.runes() {
                print_drawn(drawn);
            }
            println!();
            println!("Answer: {}", answer.as_str().to_uppercase());
            Ok(())
        }

        Commands::Daily { date, reflect } => {
            let session = auth.require()?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());

            let daily = match reflect {
                Some(text) => {
                    engine.daily_rune(session, date).await?;
                    engine.reflect_daily(session, date, &text).await?
                }
                None => engine.daily_rune(session, date).await?,
            };

            let catalog = engine.catalog().await?;
            let rune = catalog.require(daily.rune_id.as_str())?;
            println!("Rune of the day ({}):", daily.date);
            println!("  {} {} ({})", rune.glyph, rune.name, daily.orientation);
            println!("      {}", rune.interpretation(daily.orientation));
            if let Some(reflection) = &daily.reflection {
                println!("  Reflection: {}", reflection);
            }
            Ok(())
        }

        Commands::History { action } => handle_history(engine, auth.require()?, action).await,

        Commands::Favorite { action } => handle_favorite(engine, auth.require()?, action).await,

        Commands::Subscription { action } => {
            handle_subscription(engine, auth.require()?, config, action).await
        }
    }
}

async fn handle_catalog(engine: &RuneEngine, action: CatalogAction) -> Result<()> {
    let catalog = engine.catalog().await?;
    match action {
        CatalogAction::List => {
            println!("Runes ({}):", catalog.len());
            println!();
            for rune in catalog.runes() {
                println!("  {:>2}. {} {:<9} {}", rune.position, rune.glyph, rune.name, rune.meaning);
            }
        }

        CatalogAction::Show { rune } => {
            let rune = catalog.require(&rune)?;
            println!("{} {}", rune.glyph, rune.name);
            println!("  ID: {}", rune.id);
            println!("  Position: {}", rune.position);
            println!("  Sound: {}", rune.phonetic);
            println!("  Meaning: {}", rune.meaning);
            if let Some(aett) = rune.aett {
                println!("  Aett: {}", aett);
            }
            if let Some(element) = &rune.element {
                println!("  Element: {}", element);
            }
            println!("  Keywords: {}", rune.keywords.join(", "));
            println!();
            println!("  Upright: {}", rune.upright);
            match &rune.reversed {
                Some(reversed) => println!("  Reversed: {}", reversed),
                None => println!("  Reversed: (reads the same either way)"),
            }
        }
    }
    Ok(())
}

async fn handle_draw(
    engine: &RuneEngine,
    session: &Session,
    spread: SpreadType,
    question: &str,
    notes: Option<&str>,
    interpret: bool,
) -> Result<()> {
    let scope = ReadingScope::new();
    let mut reading = engine.start_reading(session, spread, question).await?;

    println!("{}", spread.display_name());
    println!("Question: {}", reading.question().unwrap_or_default());
    println!();

    let mut saved = None;
    for index in 0..reading.runes().len() {
        if let RevealStatus::Completed { saved: id } =
            engine.reveal(session, &mut reading, index, &scope).await?
        {
            saved = id;
        }
        print_drawn(&reading.runes()[index]);
    }
    println!();

    // A failed save is reported, never retried behind the user's back
    let Some(id) = saved else {
        let reason = match reading.save_state() {
            SaveState::Failed(reason) => reason.as_str(),
            _ => "unknown error",
        };
        anyhow::bail!("Reading was not saved: {}", reason);
    };
    println!("Saved reading: {}", id);

    if let Some(notes) = notes {
        engine.attach_notes(session, &mut reading, notes, &scope).await?;
        println!("Notes saved.");
    }

    if interpret {
        engine.interpret(session, &mut reading, &scope).await?;
        if let InterpretationState::Ready(text) = reading.interpretation() {
            println!();
            println!("Interpretation:");
            println!("{}", text);
        }
    }
    Ok(())
}

async fn print_divination(engine: &RuneEngine, divination: &Divination) -> Result<()> {
    println!("{}", divination.divination_type.display_name());
    println!("  ID: {}", divination.id);
    println!("  Created: {}", format_timestamp(divination.created_at));
    if let Some(question) = &divination.question {
        println!("  Question: {}", question);
    }
    println!();
    for drawn in engine.describe(divination).await? {
        print_drawn(&drawn);
    }
    if let Some(notes) = &divination.notes {
        println!();
        println!("  Notes: {}", notes);
    }
    Ok(())
}

async fn handle_history(engine: &RuneEngine, session: &Session, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            let history = engine.history(session).await?;
            if history.is_empty() {
                println!("No saved readings.");
            } else {
                println!("Readings ({}):", history.len());
                println!();
                for div in history {
                    println!(
                        "  {} {} {:<16} {}",
                        div.id,
                        format_timestamp(div.created_at),
                        div.divination_type.tag(),
                        div.question.as_deref().unwrap_or("")
                    );
                }
            }
        }

        HistoryAction::Show { id } => {
            let divination = engine.divination(session, parse_divination_id(&id)?).await?;
            print_divination(engine, &divination).await?;
        }

        HistoryAction::Notes { id, text } => {
            let updated = engine
                .update_notes(session, parse_divination_id(&id)?, &text)
                .await?;
            match updated.notes {
                Some(_) => println!("Notes saved for {}", updated.id),
                None => println!("Notes cleared for {}", updated.id),
            }
        }

        HistoryAction::Delete { id } => {
            engine
                .delete_divination(session, parse_divination_id(&id)?)
                .await?;
        }
    }
    Ok(())
}

async fn handle_favorite(
    engine: &RuneEngine,
    session: &Session,
    action: FavoriteAction,
) -> Result<()> {
    match action {
        FavoriteAction::Add { rune } => {
            let fav = engine.add_favorite(session, &rune).await?;
            println!("Added favorite: {}", fav.rune_id);
        }

        FavoriteAction::Remove { rune } => {
            engine.remove_favorite(session, &rune).await?;
            println!("Removed favorite: {}", rune);
        }

        FavoriteAction::List => {
            let favorites = engine.list_favorites(session).await?;
            if favorites.is_empty() {
                println!("No favorite runes.");
            } else {
                let catalog = engine.catalog().await?;
                println!("Favorites ({}):", favorites.len());
                for fav in favorites {
                    match catalog.get(&fav.rune_id) {
                        Some(rune) => println!("  {} {}", rune.glyph, rune.name),
                        None => println!("  {}", fav.rune_id),
                    }
                }
            }
        }
    }
    Ok(())
}

async fn handle_subscription(
    engine: &RuneEngine,
    session: &Session,
    config: &RuneConfig,
    action: SubscriptionAction,
) -> Result<()> {
    match action {
        SubscriptionAction::Status => {
            let sub = engine.subscription(session).await?;
            println!("Subscription: {}", sub.status);
            if let Some(plan) = &sub.plan_type {
                println!("  Plan: {}", plan);
            }
            if let Some(end) = sub.current_period_end {
                let verb = if sub.cancel_at_period_end { "Ends" } else { "Renews" };
                println!("  {}: {}", verb, end.with_timezone(&Local).format("%Y-%m-%d"));
            }
            println!(
                "  Premium spreads: {}",
                if sub.is_premium(chrono::Utc::now()) { "unlocked" } else { "locked" }
            );
        }

        SubscriptionAction::Checkout { price } => {
            let price = price.or_else(|| config.premium_price_id.clone());
            let url = engine.start_checkout(session, price.as_deref()).await?;
            println!("Complete your purchase at:");
            println!("  {}", url);
        }

        SubscriptionAction::Portal => {
            let url = engine.open_portal(session).await?;
            println!("Manage your subscription at:");
            println!("  {}", url);
        }

        SubscriptionAction::Verify { session_id } => {
            let sub = engine.verify_checkout(session, &session_id).await?;
            println!("Subscription: {}", sub.status);
        }
    }
    Ok(())
}
