use clap::{Parser, Subcommand};
use lesson_booking::application::cancel::CancelToken;
use lesson_booking::application::catalog::LessonBrowser;
use lesson_booking::application::checkout::CheckoutWorkflow;
use lesson_booking::application::session::BookingSession;
use lesson_booking::config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use lesson_booking::domain::cart::AddOutcome;
use lesson_booking::domain::lesson::LessonId;
use lesson_booking::domain::ports::PreferenceStoreBox;
use lesson_booking::domain::preferences::{THEME_KEY, Theme};
use lesson_booking::domain::query::{LessonQuery, SortDirection, SortField};
use lesson_booking::error::{BookingError, PreconditionError};
use lesson_booking::infrastructure::http::HttpBookingApi;
use lesson_booking::infrastructure::in_memory::InMemoryPreferenceStore;
use lesson_booking::interfaces::csv::lesson_writer::LessonWriter;
use miette::{IntoDiagnostic, Result, miette};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the lesson and order services
    #[arg(long, global = true, env = "LESSON_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Deadline for each request, in seconds
    #[arg(long, global = true, env = "LESSON_API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Path to persistent preference database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List lessons as CSV on stdout
    Lessons {
        /// Free-text search over subject and location
        #[arg(long)]
        search: Option<String>,
        /// One of subject, location, price, spaces
        #[arg(long)]
        sort_by: Option<SortField>,
        /// asc or desc (defaults to asc when --sort-by is given)
        #[arg(long)]
        order: Option<SortDirection>,
    },
    /// Book lessons for a customer
    Book {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        /// Lesson to book as ID or ID:QUANTITY; repeatable
        #[arg(long = "item", required = true)]
        items: Vec<CartItemArg>,
    },
    /// Show the stored theme, optionally toggling it first
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[derive(Debug, Clone)]
struct CartItemArg {
    lesson_id: LessonId,
    quantity: u32,
}

impl FromStr for CartItemArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (id, quantity) = match s.split_once(':') {
            Some((id, qty)) => {
                let quantity = qty
                    .parse::<u32>()
                    .map_err(|e| format!("invalid quantity '{qty}': {e}"))?;
                (id, quantity)
            }
            None => (s, 1),
        };
        if id.is_empty() || quantity == 0 {
            return Err(format!("invalid item '{s}', expected ID or ID:QUANTITY"));
        }
        Ok(Self {
            lesson_id: LessonId::from(id),
            quantity,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,lesson_booking=info")),
        )
        .init();

    let cli = Cli::parse();
    let config =
        ApiConfig::new(cli.base_url, Duration::from_secs(cli.timeout_secs)).into_diagnostic()?;

    match cli.command {
        Command::Lessons {
            search,
            sort_by,
            order,
        } => {
            let query = LessonQuery::build(search.as_deref(), sort_by, order);
            list_lessons(&config, &query).await
        }
        Command::Book { name, phone, items } => book(&config, name, phone, items).await,
        Command::Theme { toggle } => theme(preference_store(cli.db_path)?, toggle).await,
    }
}

async fn list_lessons(config: &ApiConfig, query: &LessonQuery) -> Result<()> {
    let api = HttpBookingApi::new(config).into_diagnostic()?;
    let browser = LessonBrowser::new(Box::new(api));
    let mut session = BookingSession::new();
    browser.refresh(&mut session, query).await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = LessonWriter::new(stdout.lock());
    writer.write_lessons(session.lessons()).into_diagnostic()?;
    Ok(())
}

async fn book(config: &ApiConfig, name: String, phone: String, items: Vec<CartItemArg>) -> Result<()> {
    let mut session = BookingSession::new();
    session.set_name(name);
    session.set_phone(phone);
    if !session.validate() {
        let refusal = PreconditionError::InvalidForm(session.validation().clone());
        return Err(BookingError::from(refusal)).into_diagnostic();
    }

    let api = HttpBookingApi::new(config).into_diagnostic()?;
    let browser = LessonBrowser::new(Box::new(api.clone()));
    browser
        .refresh(&mut session, &LessonQuery::new())
        .await
        .into_diagnostic()?;

    for item in &items {
        for _ in 0..item.quantity {
            match session.add_listed(&item.lesson_id) {
                None => return Err(miette!("Lesson {} is not available for booking", item.lesson_id)),
                Some(AddOutcome::AtCapacity | AddOutcome::Unavailable) => {
                    warn!(lesson = %item.lesson_id, "no more spaces, quantity capped");
                    break;
                }
                Some(AddOutcome::Inserted | AddOutcome::Incremented) => {}
            }
        }
    }

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let checkout = CheckoutWorkflow::new(Box::new(api.clone()), Box::new(api), config.request_timeout);
    match checkout.submit(&mut session, &cancel).await {
        Ok(confirmation) => {
            println!(
                "Order {} confirmed: {} lesson(s), total {}",
                confirmation.order_id, confirmation.lessons_booked, confirmation.total
            );
            Ok(())
        }
        Err(err) => Err(miette!("{}", err.user_message())),
    }
}

async fn theme(store: PreferenceStoreBox, toggle: bool) -> Result<()> {
    let stored = store.load(THEME_KEY).await.into_diagnostic()?;
    let mut theme = Theme::from_stored(stored.as_deref());
    if toggle {
        theme = theme.toggle();
        store.save(THEME_KEY, theme.as_str()).await.into_diagnostic()?;
    }
    println!("{theme}");
    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn preference_store(db_path: Option<PathBuf>) -> Result<PreferenceStoreBox> {
    use lesson_booking::infrastructure::rocksdb::RocksDBPreferenceStore;

    match db_path {
        Some(path) => Ok(Box::new(RocksDBPreferenceStore::open(path).into_diagnostic()?)),
        None => Ok(Box::new(InMemoryPreferenceStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn preference_store(db_path: Option<PathBuf>) -> Result<PreferenceStoreBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryPreferenceStore::new()))
}
