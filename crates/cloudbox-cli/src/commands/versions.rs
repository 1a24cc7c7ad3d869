//! Version history commands.

use clap::{Args, Subcommand};
use dialoguer::Confirm;
use serde::Serialize;
use tabled::Tabled;

use cloudbox_controller::TargetFile;
use cloudbox_core::error::AppError;
use cloudbox_core::types::EntryId;
use cloudbox_entity::version::Version;

use super::Context;
use crate::output::{self, format_bytes, OutputFormat};

/// Arguments for the versions command
#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// File ID whose history to manage
    pub file: EntryId,

    /// File name, used for downloaded version filenames
    #[arg(short, long)]
    pub name: Option<String>,

    #[command(subcommand)]
    pub action: Option<VersionAction>,
}

/// Version history actions (default: list)
#[derive(Debug, Subcommand)]
pub enum VersionAction {
    /// List all versions
    List,
    /// Download one version
    Download {
        /// Version number
        number: i32,
    },
    /// Make an older version current again
    Restore {
        /// Version number
        number: i32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete one version
    Delete {
        /// Version number
        number: i32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Version display row
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    /// Version
    version: i32,
    /// Current
    current: &'static str,
    /// Size
    size: String,
    /// Type
    mime_type: String,
    /// Uploaded at
    uploaded_at: String,
    /// Comment
    comment: String,
}

impl From<&Version> for VersionRow {
    fn from(v: &Version) -> Self {
        Self {
            version: v.version_number,
            current: if v.is_current { "*" } else { "" },
            size: format_bytes(v.size),
            mime_type: v.mime_type.clone().unwrap_or_else(|| "-".to_string()),
            uploaded_at: v.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
            comment: v.comment.clone().unwrap_or_default(),
        }
    }
}

/// Dispatch a versions subcommand.
pub async fn execute(
    ctx: &Context,
    args: &VersionsArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    ctx.require_auth().await?;

    let target = TargetFile {
        id: args.file,
        name: args.name.clone().unwrap_or_else(|| args.file.to_string()),
    };
    ctx.versions.load(target).await?;

    match &args.action {
        None | Some(VersionAction::List) => list(ctx, format).await,
        Some(VersionAction::Download { number }) => download(ctx, *number).await,
        Some(VersionAction::Restore { number, yes }) => restore(ctx, *number, *yes).await,
        Some(VersionAction::Delete { number, yes }) => delete(ctx, *number, *yes).await,
    }
}

async fn list(ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    let versions = ctx.versions.versions().await;
    let rows: Vec<VersionRow> = versions.iter().map(VersionRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

async fn download(ctx: &Context, number: i32) -> Result<(), AppError> {
    ctx.versions.download(number).await?;
    output::print_success(&format!("Version {number} downloaded"));
    Ok(())
}

async fn restore(ctx: &Context, number: i32, yes: bool) -> Result<(), AppError> {
    ctx.versions.request_restore(number).await?;
    if !confirmed(yes, &format!("Make version {number} current again?"))? {
        ctx.versions.cancel().await;
        output::print_error("Aborted");
        return Ok(());
    }
    ctx.versions.confirm().await?;
    output::print_success(&format!("Version {number} is now current"));
    Ok(())
}

async fn delete(ctx: &Context, number: i32, yes: bool) -> Result<(), AppError> {
    ctx.versions.request_delete(number).await?;
    if !confirmed(yes, &format!("Permanently delete version {number}?"))? {
        ctx.versions.cancel().await;
        output::print_error("Aborted");
        return Ok(());
    }
    ctx.versions.confirm().await?;
    output::print_success(&format!("Version {number} deleted"));
    Ok(())
}

fn confirmed(skip_prompt: bool, prompt: &str) -> Result<bool, AppError> {
    if skip_prompt {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Failed to read confirmation: {e}")))
}
