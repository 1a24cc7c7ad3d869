//! Interactive folder browser.

use dialoguer::Select;

use cloudbox_controller::FolderNavigator;
use cloudbox_core::error::AppError;
use cloudbox_entity::entry::Entry;

use super::Context;
use crate::output::format_bytes;

/// Walk the folder tree with an arrow-key menu. Folders descend, `..`
/// ascends one level, and files are shown with size and version count.
pub async fn run(ctx: &Context) -> Result<(), AppError> {
    ctx.require_auth().await?;

    let navigator = FolderNavigator::new(ctx.entry_list.clone());
    navigator.jump_to(0).await?;

    loop {
        let path = navigator.path().await;
        let breadcrumb: Vec<&str> = path.iter().map(|c| c.name.as_str()).collect();
        println!("\n{}", breadcrumb.join(" / "));

        let entries = ctx.entry_list.entries().await;
        let mut items: Vec<String> = Vec::with_capacity(entries.len() + 2);
        if path.len() > 1 {
            items.push("..".to_string());
        }
        for entry in &entries {
            items.push(label(entry));
        }
        items.push("quit".to_string());

        let choice = Select::new()
            .with_prompt("Select")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|e| AppError::internal(format!("Failed to read selection: {e}")))?;

        let has_up = path.len() > 1;
        if has_up && choice == 0 {
            navigator.jump_to(path.len() - 2).await?;
            continue;
        }
        let entry_index = if has_up { choice - 1 } else { choice };
        if entry_index >= entries.len() {
            return Ok(());
        }

        match &entries[entry_index] {
            entry @ Entry::Folder(_) => navigator.open(entry).await?,
            Entry::File(file) => {
                println!(
                    "  {}  {}  {} version(s)  id: {}",
                    file.name,
                    format_bytes(file.size),
                    file.version_count,
                    file.id
                );
            }
        }
    }
}

fn label(entry: &Entry) -> String {
    match entry {
        Entry::Folder(folder) => format!("{}/", folder.name),
        Entry::File(file) => format!("{} ({})", file.name, format_bytes(file.size)),
    }
}
