//! Session commands: login, register, logout, whoami.

use clap::Args;
use dialoguer::Password;

use cloudbox_client::RegisterRequest;
use cloudbox_core::error::AppError;

use super::Context;
use crate::output::{self, format_bytes};

/// Arguments for the login command
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account e-mail address
    #[arg(short, long)]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Arguments for the register command
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Account e-mail address
    #[arg(long)]
    pub email: String,
    /// Display name
    #[arg(long)]
    pub username: String,
    /// Given name
    #[arg(long)]
    pub first_name: String,
    /// Family name
    #[arg(long)]
    pub last_name: String,
}

fn prompt_password(prompt: &str) -> Result<String, AppError> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| AppError::internal(format!("Failed to read password: {e}")))
}

/// Log in and persist the session.
pub async fn login(ctx: &Context, args: &LoginArgs) -> Result<(), AppError> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => prompt_password("Password")?,
    };

    let (token, profile) = ctx.auth.login(&args.email, &password).await?;
    let username = profile.username.clone();
    ctx.session.set_auth(token, profile).await?;
    output::print_success(&format!("Logged in as {username}"));
    Ok(())
}

/// Create a new account.
pub async fn register(ctx: &Context, args: &RegisterArgs) -> Result<(), AppError> {
    let password = prompt_password("Choose a password")?;
    let confirmation = prompt_password("Repeat password")?;
    if password != confirmation {
        return Err(AppError::validation("passwords do not match"));
    }

    let profile = ctx
        .auth
        .register(&RegisterRequest {
            email: args.email.clone(),
            username: args.username.clone(),
            password,
            first_name: args.first_name.clone(),
            last_name: args.last_name.clone(),
        })
        .await?;
    output::print_success(&format!(
        "Account '{}' created; log in with 'cloudbox login'",
        profile.username
    ));
    Ok(())
}

/// Clear the persisted session.
pub async fn logout(ctx: &Context) -> Result<(), AppError> {
    ctx.session.logout().await?;
    output::print_success("Logged out");
    Ok(())
}

/// Show the current user and storage quota.
pub async fn whoami(ctx: &Context) -> Result<(), AppError> {
    ctx.require_auth().await?;

    // Refresh the quota figures before displaying them.
    let profile = match ctx.auth.me().await {
        Ok(fresh) => {
            ctx.session.update_profile(fresh.clone()).await?;
            fresh
        }
        Err(_) => ctx
            .session
            .current_profile()
            .await
            .ok_or_else(|| AppError::session("session is empty"))?,
    };

    output::print_kv("User", &profile.username);
    output::print_kv("E-mail", &profile.email);
    output::print_kv(
        "Storage",
        &format!(
            "{} of {} used ({} free)",
            format_bytes(profile.storage_used),
            format_bytes(profile.storage_limit),
            format_bytes(profile.storage_remaining()),
        ),
    );
    Ok(())
}
