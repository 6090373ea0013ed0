use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::context::CliContext;

pub async fn run(ctx: &CliContext, prompt: &str, cancel: &CancellationToken) -> Result<()> {
    let reply = ctx
        .app
        .chat(prompt, cancel)
        .await
        .context("Chat request failed")?;
    println!("{}", reply);
    Ok(())
}
