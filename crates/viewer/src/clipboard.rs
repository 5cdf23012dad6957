use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Returns whether the text reached the clipboard.
    async fn write_text(&self, text: &str) -> bool;
}

/// Platform clipboard through the usual helper commands.
pub struct SystemClipboard {
    primary: Option<(&'static str, &'static [&'static str])>,
    fallbacks: Vec<(&'static str, &'static [&'static str])>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let primary = if cfg!(target_os = "macos") {
            Some(("pbcopy", &[][..]))
        } else if cfg!(windows) {
            Some(("clip", &[][..]))
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Some(("wl-copy", &[][..]))
        } else {
            None
        };
        Self {
            primary,
            fallbacks: vec![
                ("xclip", &["-selection", "clipboard"][..]),
                ("xsel", &["-b"][..]),
            ],
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> bool {
        if let Some((program, args)) = self.primary {
            match copy_async(program, args, text).await {
                Ok(()) => return true,
                Err(err) => debug!(program, error = %err, "clipboard helper failed"),
            }
        }
        for (program, args) in &self.fallbacks {
            match copy_blocking(program, args, text) {
                Ok(()) => return true,
                Err(err) => debug!(program, error = %err, "clipboard fallback failed"),
            }
        }
        warn!("no clipboard helper accepted the text");
        false
    }
}

async fn copy_async(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("spawning {program}"))?;
    let mut stdin = child.stdin.take().context("stdin not captured")?;
    stdin.write_all(text.as_bytes()).await?;
    drop(stdin);
    let status = child.wait().await?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }
    Ok(())
}

fn copy_blocking(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("spawning {program}"))?;
    let mut stdin = child.stdin.take().context("stdin not captured")?;
    stdin.write_all(text.as_bytes())?;
    drop(stdin);
    let status = child.wait()?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }
    Ok(())
}
