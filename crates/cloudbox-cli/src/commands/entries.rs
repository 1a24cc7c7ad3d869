//! Entry commands: ls, upload, mkdir, rm, download.

use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;
use dialoguer::Confirm;
use serde::Serialize;
use tabled::Tabled;

use cloudbox_core::error::AppError;
use cloudbox_core::types::EntryId;
use cloudbox_entity::entry::Entry;

use super::Context;
use crate::output::{self, format_bytes, OutputFormat};

/// Arguments for the ls command
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Folder ID to list (omit for root)
    #[arg(short, long)]
    pub folder: Option<EntryId>,
}

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    /// Target folder ID (omit for root)
    #[arg(short, long)]
    pub parent: Option<EntryId>,

    /// Override file name
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the mkdir command
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Folder name
    pub name: String,

    /// Parent folder ID (omit for root)
    #[arg(short, long)]
    pub parent: Option<EntryId>,
}

/// Arguments for the rm command
#[derive(Debug, Args)]
pub struct RmArgs {
    /// Entry ID to delete
    pub entry: EntryId,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// File ID to download
    pub file: EntryId,

    /// Parent folder ID (omit for root)
    #[arg(short, long)]
    pub parent: Option<EntryId>,
}

/// Entry display row
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Kind
    kind: &'static str,
    /// Name
    name: String,
    /// ID
    id: String,
    /// Size
    size: String,
    /// Versions
    versions: String,
    /// Updated at
    updated_at: String,
}

impl From<&Entry> for EntryRow {
    fn from(entry: &Entry) -> Self {
        match entry {
            Entry::Folder(folder) => Self {
                kind: "dir",
                name: folder.name.clone(),
                id: folder.id.to_string(),
                size: "-".to_string(),
                versions: "-".to_string(),
                updated_at: folder.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            },
            Entry::File(file) => Self {
                kind: "file",
                name: file.name.clone(),
                id: file.id.to_string(),
                size: format_bytes(file.size),
                versions: file.version_count.to_string(),
                updated_at: file.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            },
        }
    }
}

/// List a folder's entries in server order.
pub async fn ls(ctx: &Context, args: &LsArgs, format: OutputFormat) -> Result<(), AppError> {
    ctx.require_auth().await?;
    ctx.entry_list.reload(args.folder).await?;

    let entries = ctx.entry_list.entries().await;
    let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Stage and upload a local file.
pub async fn upload(ctx: &Context, args: &UploadArgs) -> Result<(), AppError> {
    ctx.require_auth().await?;

    if !args.file.exists() {
        return Err(AppError::not_found(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let file_name = args.name.clone().unwrap_or_else(|| {
        args.file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string()
    });

    let content = tokio::fs::read(&args.file).await?;
    ctx.entry_list.reload(args.parent).await?;
    ctx.orchestrator
        .stage(file_name.clone(), Bytes::from(content))
        .await?;
    let entry = ctx.orchestrator.commit_upload(args.parent).await?;

    output::print_success(&format!(
        "File '{}' uploaded (id: {})",
        file_name,
        entry.id()
    ));
    Ok(())
}

/// Create a folder.
pub async fn mkdir(ctx: &Context, args: &MkdirArgs) -> Result<(), AppError> {
    ctx.require_auth().await?;
    ctx.entry_list.reload(args.parent).await?;
    let entry = ctx.orchestrator.create_folder(&args.name, args.parent).await?;
    output::print_success(&format!(
        "Folder '{}' created (id: {})",
        entry.name(),
        entry.id()
    ));
    Ok(())
}

/// Delete an entry after confirmation.
pub async fn rm(ctx: &Context, args: &RmArgs) -> Result<(), AppError> {
    ctx.require_auth().await?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Permanently delete entry {}?", args.entry))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Failed to read confirmation: {e}")))?;
        if !confirmed {
            output::print_error("Aborted");
            return Ok(());
        }
    }

    ctx.orchestrator.delete_entry(args.entry).await?;
    output::print_success(&format!("Entry {} deleted", args.entry));
    Ok(())
}

/// Download a file's current version into the downloads directory.
pub async fn download(ctx: &Context, args: &DownloadArgs) -> Result<(), AppError> {
    ctx.require_auth().await?;

    // Resolve the display name from the containing folder's listing.
    ctx.entry_list.reload(args.parent).await?;
    let entries = ctx.entry_list.entries().await;
    let file = entries
        .iter()
        .find_map(|e| e.as_file().filter(|f| f.id == args.file))
        .ok_or_else(|| {
            AppError::not_found(format!(
                "no file {} in the given folder (check --parent)",
                args.file
            ))
        })?;

    ctx.orchestrator.download_entry(file).await?;
    output::print_success(&format!("Downloaded '{}'", file.name));
    Ok(())
}
