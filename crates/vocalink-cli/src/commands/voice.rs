use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::context::CliContext;

pub async fn speakers(ctx: &CliContext, cancel: &CancellationToken) -> Result<()> {
    let speakers = ctx
        .app
        .fetch_speakers(cancel)
        .await
        .context("Failed to list speakers")?;

    for speaker in speakers {
        println!("{}", speaker.name);
        for style in speaker.styles {
            println!("  {:>4}  {} ({})", style.id, style.name, style.kind);
        }
    }
    Ok(())
}

pub async fn say(
    ctx: &CliContext,
    text: &str,
    speaker: &str,
    output: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    let audio = ctx
        .app
        .synthesize_audio(text, speaker, cancel)
        .await
        .context("Synthesis failed")?;

    std::fs::write(output, &audio)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} bytes to {}", audio.len(), output.display());
    Ok(())
}
