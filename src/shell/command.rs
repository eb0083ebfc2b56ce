//! Shell command language.

use futures_util::future::BoxFuture;
use serde_json::{json, Value};

use super::ShellContext;
use crate::error::RpcError;

pub const HELP_TEXT: &str = "\
commands:
  help                         show this help
  app                          show the application descriptor
  config                       show the merged configuration
  state                        show pipeline state
  call <method> [json-params]  call a worker rpc method and print the result
  .exit | exit                 stop the console (also Ctrl-D / Ctrl-C)";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Empty,
    Help,
    App,
    Config,
    State,
    Call { method: String, params: Value },
    Exit,
}

/// Parse one line. Errors are operator-facing messages.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head {
        "" => Ok(Command::Empty),
        "help" => Ok(Command::Help),
        "app" => Ok(Command::App),
        "config" => Ok(Command::Config),
        "state" => Ok(Command::State),
        ".exit" | "exit" => Ok(Command::Exit),
        "call" => parse_call(rest),
        other => Err(format!("unknown command `{other}`; type `help`")),
    }
}

fn parse_call(rest: &str) -> Result<Command, String> {
    let (method, params) = match rest.split_once(char::is_whitespace) {
        Some((method, params)) => (method, params.trim()),
        None => (rest, ""),
    };
    if method.is_empty() {
        return Err("usage: call <method> [json-params]".to_string());
    }
    let params = if params.is_empty() {
        json!([])
    } else {
        serde_json::from_str(params).map_err(|e| format!("params are not valid json: {e}"))?
    };
    Ok(Command::Call {
        method: method.to_string(),
        params,
    })
}

/// Result of evaluating a line.
pub enum Evaluation {
    /// Nothing to print.
    Empty,
    /// Plain text.
    Text(String),
    /// A JSON value, printed pretty.
    Value(Value),
    /// An operator mistake; the session continues.
    Error(String),
    /// A result that is not available yet.
    Pending(BoxFuture<'static, Result<Value, RpcError>>),
    Exit,
}

impl std::fmt::Debug for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Error(msg) => f.debug_tuple("Error").field(msg).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

/// Evaluate one line against the session context.
pub fn eval(ctx: &ShellContext, line: &str) -> Evaluation {
    let command = match parse(line) {
        Ok(command) => command,
        Err(msg) => return Evaluation::Error(msg),
    };
    match command {
        Command::Empty => Evaluation::Empty,
        Command::Help => Evaluation::Text(HELP_TEXT.to_string()),
        Command::App => Evaluation::Value(ctx.binding.descriptor.to_value()),
        Command::Config => Evaluation::Value(ctx.merged_config.clone()),
        Command::State => Evaluation::Value(json!({
            "app": ctx.binding.descriptor.app_name,
            "state": ctx.ready.history.last().map(|s| s.as_str()),
            "readOnly": ctx.ready.read_only,
            "connected": ctx.binding.plugin.client().is_connected(),
        })),
        Command::Call { method, params } => {
            let client = ctx.binding.plugin.client();
            Evaluation::Pending(Box::pin(async move { client.call(&method, params).await }))
        }
        Command::Exit => Evaluation::Exit,
    }
}
