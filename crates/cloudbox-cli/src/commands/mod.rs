//! CLI command definitions and dispatch.

pub mod auth;
pub mod browse;
pub mod entries;
pub mod versions;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use cloudbox_client::{AuthApi, HttpEntryRepository};
use cloudbox_controller::{EntryList, UploadOrchestrator, VersionController};
use cloudbox_core::config::ClientConfig;
use cloudbox_core::error::AppError;
use cloudbox_session::{JsonFileSession, SessionStore};

use crate::output::OutputFormat;
use crate::sink::FsDownloadSink;

/// CloudBox — personal cloud storage client
#[derive(Debug, Parser)]
#[command(name = "cloudbox", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cloudbox.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and persist the session
    Login(auth::LoginArgs),
    /// Create a new account
    Register(auth::RegisterArgs),
    /// Clear the persisted session
    Logout,
    /// Show the current user and storage quota
    Whoami,
    /// List a folder's entries
    Ls(entries::LsArgs),
    /// Browse the folder tree interactively
    Browse,
    /// Upload a file
    Upload(entries::UploadArgs),
    /// Create a folder
    Mkdir(entries::MkdirArgs),
    /// Delete a file or folder
    Rm(entries::RmArgs),
    /// Download a file's current version
    Download(entries::DownloadArgs),
    /// Manage a file's version history
    Versions(versions::VersionsArgs),
}

impl Cli {
    /// Dispatch the selected command.
    pub async fn execute(&self, config: ClientConfig) -> Result<(), AppError> {
        let ctx = Context::build(&config).await?;

        match &self.command {
            Commands::Login(args) => auth::login(&ctx, args).await,
            Commands::Register(args) => auth::register(&ctx, args).await,
            Commands::Logout => auth::logout(&ctx).await,
            Commands::Whoami => auth::whoami(&ctx).await,
            Commands::Ls(args) => entries::ls(&ctx, args, self.format).await,
            Commands::Browse => browse::run(&ctx).await,
            Commands::Upload(args) => entries::upload(&ctx, args).await,
            Commands::Mkdir(args) => entries::mkdir(&ctx, args).await,
            Commands::Rm(args) => entries::rm(&ctx, args).await,
            Commands::Download(args) => entries::download(&ctx, args).await,
            Commands::Versions(args) => versions::execute(&ctx, args, self.format).await,
        }
    }
}

/// Everything a command needs: configuration, session, API clients, and
/// the state controllers wired together.
pub struct Context {
    pub session: SessionStore,
    pub auth: AuthApi,
    pub entry_list: EntryList,
    pub orchestrator: UploadOrchestrator,
    pub versions: VersionController,
}

impl Context {
    /// Hydrate the session and wire the controllers.
    pub async fn build(config: &ClientConfig) -> Result<Self, AppError> {
        let session = SessionStore::new(Arc::new(JsonFileSession::new(&config.session.file)));
        session.hydrate().await?;

        let auth = AuthApi::new(&config.api, session.clone())?;
        let repo: Arc<HttpEntryRepository> = Arc::new(auth.entry_repository());
        let sink = Arc::new(FsDownloadSink::new(&config.downloads.directory));

        let entry_list = EntryList::new(repo.clone());
        let orchestrator =
            UploadOrchestrator::new(repo.clone(), sink.clone(), entry_list.clone());
        let versions = VersionController::new(repo, sink, entry_list.clone());

        Ok(Self {
            session,
            auth,
            entry_list,
            orchestrator,
            versions,
        })
    }

    /// Fail fast when no session is active.
    pub async fn require_auth(&self) -> Result<(), AppError> {
        if self.session.is_authenticated().await {
            Ok(())
        } else {
            Err(AppError::session(
                "not logged in; run 'cloudbox login' first",
            ))
        }
    }
}
