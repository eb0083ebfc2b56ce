//! Interactive session bound to the ready application.
//!
//! The session reads one line at a time, evaluates it against an explicit
//! [`ShellContext`], and prints the result. Pending results are awaited
//! before the next prompt, while Ctrl-C stays live. Every way out of the loop
//! is reported as an [`ExitTrigger`] so the caller can run [`Teardown`].

mod command;
mod teardown;

use std::future::Future;
use std::io::{self, Write};

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::apps::AppBinding;
use crate::pipeline::Ready;

pub use command::{eval, parse, Command, Evaluation, HELP_TEXT};
pub use teardown::{ExitTrigger, Teardown, TeardownReport};

/// Everything a command can see.
pub struct ShellContext {
    pub binding: AppBinding,
    pub merged_config: Value,
    pub ready: Ready,
}

impl ShellContext {
    pub fn prompt(&self) -> String {
        format!("[-= {} =-]$ ", self.ready.slogan)
    }
}

/// Run the read-evaluate loop until an exit trigger.
pub async fn run_session<R, W, I>(
    ctx: &ShellContext,
    input: R,
    output: &mut W,
    interrupt: I,
) -> io::Result<ExitTrigger>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Future,
{
    tokio::pin!(interrupt);
    let mut lines = input.lines();
    loop {
        write!(output, "{}", ctx.prompt())?;
        output.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut interrupt => {
                writeln!(output)?;
                return Ok(ExitTrigger::Interrupt);
            }
        };
        let Some(line) = line else {
            writeln!(output)?;
            return Ok(ExitTrigger::EndOfInput);
        };

        match eval(ctx, &line) {
            Evaluation::Empty => {}
            Evaluation::Text(text) => writeln!(output, "{text}")?,
            Evaluation::Value(value) => print_value(output, &value)?,
            Evaluation::Error(msg) => writeln!(output, "error: {msg}")?,
            Evaluation::Pending(pending) => {
                let settled = tokio::select! {
                    settled = pending => settled,
                    _ = &mut interrupt => {
                        writeln!(output)?;
                        return Ok(ExitTrigger::Interrupt);
                    }
                };
                match settled {
                    Ok(value) => print_value(output, &value)?,
                    Err(err) => {
                        debug!(error = %err, "shell call failed");
                        writeln!(output, "error: {err}")?;
                    }
                }
            }
            Evaluation::Exit => return Ok(ExitTrigger::Command),
        }
    }
}

fn print_value<W: Write>(output: &mut W, value: &Value) -> io::Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(output, "{text}")
}
