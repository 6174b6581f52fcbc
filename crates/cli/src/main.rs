//! Dacsan CLI - local cart and admin back-office tools.
//!
//! # Usage
//!
//! ```bash
//! # Add two jars of guava jam to the local cart
//! dacsan cart add 42 "Mứt ổi" 15000 --quantity 2
//!
//! # Show the cart, or the dropdown markup the header renders
//! dacsan cart show
//! dacsan cart show --markup
//!
//! # Second page of pending orders
//! dacsan admin list orders --status PENDING --page 2
//!
//! # Dashboard for the last 7 days
//! dacsan admin dashboard --period 7days
//! ```
//!
//! # Commands
//!
//! - `cart` - Read and change the file-backed local cart
//! - `admin list` - Render one page of an admin list
//! - `admin order` - Render one order's detail panel
//! - `admin dashboard` - Render the dashboard
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Log filter (default `info` for the dacsan crates)
//! - `DACSAN_LOG_JSON` - Emit JSON log lines when set
//! - `SENTRY_DSN` - Report errors to Sentry when set

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::admin::{AdminAction, ResourceKind};
use commands::cart::CartAction;

#[derive(Parser)]
#[command(name = "dacsan")]
#[command(author, version, about = "Dacsan CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read and change the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Admin lists and dashboard
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty())?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Logs go to stderr; stdout carries command output.
fn init_tracing(with_sentry: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dacsan_cli=info,dacsan_admin=info,dacsan_storefront=info".into());

    let fmt_layer = if std::env::var_os("DACSAN_LOG_JSON").is_some() {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    let sentry_layer =
        with_sentry.then(|| sentry_tracing::layer().event_filter(sentry_event_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_layer)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env before reading SENTRY_DSN
    let _ = dotenvy::dotenv();

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry();
    init_tracing(sentry_guard.is_some());

    let cli = Cli::parse();

    let result: Result<(), commands::CommandError> = run(cli).await;

    if let Err(e) = result {
        e.report();
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Cart { action } => commands::cart::run(action, &mut out)?,
        Commands::Admin { action } => commands::admin::run(action, &mut out).await?,
    }
    Ok(())
}
