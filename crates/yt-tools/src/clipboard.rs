//! Clipboard writing with a fallback path.

use std::io::{IsTerminal, Write};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine as _;

use crate::types::{ToolsError, ToolsResult};

/// Something that can place text on a clipboard.
pub trait ClipboardWriter: Send + Sync {
    fn name(&self) -> &'static str;
    fn write_text(&self, text: &str) -> Result<()>;
}

/// How long a copy stays served on X11/Wayland when nothing else takes it.
pub const CLIPBOARD_HOLD: Duration = Duration::from_secs(30);

/// The desktop clipboard, via arboard.
///
/// On Linux the selection lives only as long as its owner, so `write_text`
/// keeps serving it until a clipboard manager or another copy takes over,
/// or until `hold` runs out.
pub struct SystemClipboard {
    hold: Duration,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::holding_for(CLIPBOARD_HOLD)
    }

    pub fn holding_for(hold: Duration) -> Self {
        Self { hold }
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardWriter for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;

        #[cfg(target_os = "linux")]
        if !self.hold.is_zero() {
            use arboard::SetExtLinux;
            let deadline = std::time::Instant::now() + self.hold;
            clipboard
                .set()
                .wait_until(deadline)
                .text(text.to_string())
                .context("clipboard rejected text")?;
            return Ok(());
        }

        clipboard
            .set_text(text.to_string())
            .context("clipboard rejected text")?;
        Ok(())
    }
}

/// Terminal clipboard using the OSC 52 escape sequence.
///
/// Works over SSH and in terminals that honour OSC 52, where no desktop
/// clipboard is reachable from the process.
pub struct Osc52Clipboard {
    out: Mutex<Box<dyn Write + Send>>,
    require_tty: bool,
}

impl Osc52Clipboard {
    /// Emit the sequence on stderr, refusing when stderr is not a terminal.
    pub fn stderr() -> Self {
        Self {
            out: Mutex::new(Box::new(std::io::stderr())),
            require_tty: true,
        }
    }

    /// Emit the sequence on an arbitrary writer.
    pub fn to_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            require_tty: false,
        }
    }
}

/// Build the OSC 52 "set clipboard" sequence for `text`.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

impl ClipboardWriter for Osc52Clipboard {
    fn name(&self) -> &'static str {
        "osc52"
    }

    fn write_text(&self, text: &str) -> Result<()> {
        if self.require_tty && !std::io::stderr().is_terminal() {
            anyhow::bail!("stderr is not a terminal");
        }
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow::anyhow!("clipboard writer poisoned"))?;
        out.write_all(osc52_sequence(text).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Copy `text`, trying `primary` then `fallback`.
pub fn copy_with_fallback(
    primary: &dyn ClipboardWriter,
    fallback: &dyn ClipboardWriter,
    text: &str,
) -> ToolsResult<()> {
    let first = match primary.write_text(text) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    tracing::debug!("{} clipboard failed: {first:#}", primary.name());

    fallback.write_text(text).map_err(|e| {
        tracing::error!("Clipboard error: {e:#}");
        ToolsError::Clipboard(format!("{}: {first:#}; {}: {e:#}", primary.name(), fallback.name()))
    })
}
