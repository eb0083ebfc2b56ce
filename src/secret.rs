//! Masked operator secret prompt.
//!
//! The master password is read in raw terminal mode so that every accepted
//! character is echoed as a single mask glyph. When raw mode is unavailable
//! the prompt falls back to `rpassword`, which suppresses echo entirely.
//! The secret is never logged; [`Secret`] redacts itself in `Debug` and wipes
//! its buffer on drop.
//!
//! Wiping is best-effort. Whatever [`Secret::expose`] hands out is copied
//! into the `unlock` params and the outgoing websocket frame, and those
//! copies are freed without being zeroed.

use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::debug;

/// Glyph echoed for every typed character.
pub const MASK_GLYPH: char = '*';

/// Prompt label used for the unlock step.
pub const MASTER_PASSWORD_LABEL: &str = "Master Password:";

/// Operator-supplied secret.
pub struct Secret(String);

impl Secret {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Borrow the plain text. Copies made from it are not wiped.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        let mut bytes = std::mem::take(&mut self.0).into_bytes();
        bytes.fill(0);
        // Keep the wipe from being optimized out.
        std::hint::black_box(&bytes);
    }
}

/// Source of a single secret; the pipeline suspends on `ask`.
#[async_trait]
pub trait SecretSource: Send {
    async fn ask(&mut self, label: &str) -> io::Result<Secret>;
}

/// Interactive terminal prompt.
#[derive(Debug, Clone, Copy)]
pub struct TerminalSecretPrompt {
    mask: char,
}

impl TerminalSecretPrompt {
    pub fn new() -> Self {
        Self { mask: MASK_GLYPH }
    }
}

impl Default for TerminalSecretPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretSource for TerminalSecretPrompt {
    async fn ask(&mut self, label: &str) -> io::Result<Secret> {
        let label = label.to_string();
        let mask = self.mask;
        tokio::task::spawn_blocking(move || read_secret(&label, mask))
            .await
            .map_err(io::Error::other)?
    }
}

fn read_secret(label: &str, mask: char) -> io::Result<Secret> {
    if !io::stdin().is_terminal() {
        return read_piped(label);
    }
    match RawModeGuard::acquire() {
        Ok(guard) => {
            let secret = read_masked(label, mask);
            drop(guard);
            eprint!("\r\n");
            secret
        }
        Err(err) => {
            debug!(error = %err, "raw mode unavailable; reading secret without echo");
            rpassword::prompt_password(label).map(Secret::new)
        }
    }
}

fn read_masked(label: &str, mask: char) -> io::Result<Secret> {
    let mut stderr = io::stderr();
    write!(stderr, "{label}")?;
    stderr.flush()?;

    let mut buffer = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        let edit = apply_key(&mut buffer, key);
        match edit {
            MaskEdit::Submit => return Ok(Secret::new(buffer)),
            MaskEdit::Cancel => {
                buffer.clear();
                return Err(io::Error::new(io::ErrorKind::Interrupted, "prompt cancelled"));
            }
            _ => {
                if let Some(echo) = mask_echo(edit, mask) {
                    write!(stderr, "{echo}")?;
                    stderr.flush()?;
                }
            }
        }
    }
}

/// Stdin is not a terminal: nothing is echoed, read one line as-is.
fn read_piped(label: &str) -> io::Result<Secret> {
    eprint!("{label}");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
    line.clear();
    eprintln!();
    Ok(Secret::new(trimmed))
}

/// Effect of one key press on the secret buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaskEdit {
    Pushed,
    Popped,
    Submit,
    Cancel,
    Ignored,
}

fn apply_key(buffer: &mut String, key: KeyEvent) -> MaskEdit {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => MaskEdit::Submit,
        KeyCode::Char('c') if ctrl => MaskEdit::Cancel,
        KeyCode::Char('d') if ctrl && buffer.is_empty() => MaskEdit::Cancel,
        KeyCode::Char(_) if ctrl => MaskEdit::Ignored,
        KeyCode::Char(ch) => {
            buffer.push(ch);
            MaskEdit::Pushed
        }
        KeyCode::Backspace => {
            if buffer.pop().is_some() {
                MaskEdit::Popped
            } else {
                MaskEdit::Ignored
            }
        }
        _ => MaskEdit::Ignored,
    }
}

/// What to write to the terminal for an edit. Never the typed character.
fn mask_echo(edit: MaskEdit, mask: char) -> Option<String> {
    match edit {
        MaskEdit::Pushed => Some(mask.to_string()),
        MaskEdit::Popped => Some("\u{8} \u{8}".to_string()),
        MaskEdit::Submit | MaskEdit::Cancel | MaskEdit::Ignored => None,
    }
}

/// Raw mode lifetime guard so terminal state is restored on any return path.
struct RawModeGuard;

impl RawModeGuard {
    fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
