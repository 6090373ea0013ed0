use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::context::CliContext;

async fn connect(ctx: &CliContext, cancel: &CancellationToken) -> Result<()> {
    ctx.app
        .initialize_bot(ctx.bot_token()?, cancel)
        .await
        .context("Failed to log the bot in")
}

pub async fn whoami(ctx: &CliContext, cancel: &CancellationToken) -> Result<()> {
    connect(ctx, cancel).await?;
    let info = ctx.app.bot_info().await;
    ctx.app.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&info?)?);
    Ok(())
}

pub async fn guilds(ctx: &CliContext, cancel: &CancellationToken) -> Result<()> {
    connect(ctx, cancel).await?;
    let guilds = ctx.app.guilds(cancel).await;
    ctx.app.shutdown().await;

    for guild in guilds.context("Failed to list guilds")? {
        println!("{}  {}", guild.id, guild.name);
    }
    Ok(())
}

pub async fn members(ctx: &CliContext, guild_id: &str, cancel: &CancellationToken) -> Result<()> {
    connect(ctx, cancel).await?;
    let members = ctx.app.guild_members(guild_id, cancel).await;
    ctx.app.shutdown().await;

    for member in members.with_context(|| format!("Failed to list members of {}", guild_id))? {
        let display = member
            .nick
            .as_deref()
            .or(member.user.global_name.as_deref())
            .unwrap_or(member.user.username.as_str());
        println!("{}  {}", member.user.id, display);
    }
    Ok(())
}

/// Lists guilds with a one-off REST call; no gateway login happens.
pub async fn user_guilds(
    ctx: &CliContext,
    token: Option<&str>,
    cancel: &CancellationToken,
) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => ctx.bot_token()?,
    };
    let guilds = ctx
        .app
        .user_guilds(token, cancel)
        .await
        .context("Failed to list guilds")?;
    println!("{}", serde_json::to_string_pretty(&guilds)?);
    Ok(())
}
