//! Mall CLI - Database migrations and admin account management.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! mall-cli migrate
//!
//! # Create an admin account
//! mall-cli admin create -u operator -n "Han Meimei" -p buzhidao
//!
//! # Disable admin 7 as admin 1
//! mall-cli --actor 1 admin status 7 2
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin verify|list|roles|create|update|status|delete` - Admin account operations
//!
//! Admin commands print a JSON result (`code`, `message`, `data`) and exit
//! with status 1 when `code` is not 0.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mall_admin::config::AdminConfig;
use mall_admin::models::{AdminAdd, AdminPageQuery, AdminUpdate};
use mall_core::AdminId;

mod commands;

use commands::CommandError;
use commands::admin::AdminCommand;

#[derive(Parser)]
#[command(name = "mall-cli")]
#[command(author, version, about = "Mall admin CLI tools")]
struct Cli {
    /// ID of the admin performing the operation (0 is the console operator)
    #[arg(long, global = true, default_value_t = 0)]
    actor: i32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Check a username and password
    Verify {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// List admins, optionally filtered by nickname
    List {
        /// Substring of the nickname
        #[arg(long)]
        nickname: Option<String>,

        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Page size
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// List the roles granted to an admin
    Roles { id: i32 },
    /// Create a new admin account
    Create {
        /// Login name (4-16 letters or digits)
        #[arg(short, long)]
        username: String,

        /// Display name
        #[arg(short, long)]
        nickname: String,

        /// Initial password (4-16 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Change an admin's username and nickname
    Update {
        id: i32,

        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        nickname: String,
    },
    /// Set an admin's status (1 = enabled, 2 = disabled)
    Status { id: i32, status: i32 },
    /// Delete a disabled admin
    Delete { id: i32 },
}

impl From<AdminAction> for AdminCommand {
    fn from(action: AdminAction) -> Self {
        match action {
            AdminAction::Verify { username, password } => Self::Verify {
                username,
                password: SecretString::from(password),
            },
            AdminAction::List {
                nickname,
                page,
                size,
            } => Self::List(AdminPageQuery {
                nickname,
                page_no: page,
                page_size: size,
            }),
            AdminAction::Roles { id } => Self::Roles(AdminId::new(id)),
            AdminAction::Create {
                username,
                nickname,
                password,
            } => Self::Create(AdminAdd {
                username,
                nickname,
                password: SecretString::from(password),
            }),
            AdminAction::Update {
                id,
                username,
                nickname,
            } => Self::Update(AdminUpdate {
                id: AdminId::new(id),
                username,
                nickname,
            }),
            AdminAction::Status { id, status } => Self::Status {
                target: AdminId::new(id),
                status,
            },
            AdminAction::Delete { id } => Self::Delete(AdminId::new(id)),
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
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

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mall_admin=info,mall_cli=info".into());

    // Logs go to stderr; stdout carries command results
    let json_output = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    let json_layer = json_output.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json_output).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AdminConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(cli, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &AdminConfig) -> Result<bool, CommandError> {
    match cli.command {
        Commands::Migrate => {
            commands::migrate::run(config).await?;
            Ok(true)
        }
        Commands::Admin { action } => {
            let service = commands::admin::connect(config).await?;
            commands::admin::run(&service, AdminId::new(cli.actor), action.into()).await
        }
    }
}
