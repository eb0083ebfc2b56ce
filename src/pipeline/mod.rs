//! Staged initialization.
//!
//! One strictly sequential pass: connect, bulk-configure, optionally unlock,
//! then application init. Every step suspends until its predecessor settles,
//! and the first failure ends the run. Nothing is retried here.

mod state;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::apps::{AppPlugin, RESERVED_APP_NAME};
use crate::error::{ConsoleError, PipelineError};
use crate::rpc::{METHOD_FULLY_INITIALIZE, METHOD_UNLOCK};
use crate::secret::{SecretSource, MASTER_PASSWORD_LABEL};
use crate::ui::RenderSink;

pub use state::{planned_path, PipelineState};

/// Slogan used by the built-in application.
pub const CONSOLE_SLOGAN: &str = "11BE Dev Console";

pub const READ_ONLY_WARNING: &str =
    "Read-only mode, need to unlock master password to change state.";
pub const WRONG_CREDENTIAL_WARNING: &str = "wrong password";

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ready {
    /// Banner and prompt text.
    pub slogan: String,
    /// No credential was unlocked.
    pub read_only: bool,
    /// States entered, in order, ending in `Ready`.
    pub history: Vec<PipelineState>,
}

/// A run that stopped early.
#[derive(Debug)]
pub struct PipelineFailure {
    /// State whose step failed.
    pub at: PipelineState,
    pub error: PipelineError,
    /// States entered, in order, ending in `Failed`.
    pub history: Vec<PipelineState>,
}

impl PipelineFailure {
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

impl From<PipelineFailure> for ConsoleError {
    fn from(failure: PipelineFailure) -> Self {
        ConsoleError::Pipeline(failure.error)
    }
}

/// Slogan for an application: the console name for the built-in app,
/// otherwise the application's own name.
pub fn slogan_for(app_name: &str) -> String {
    if app_name == RESERVED_APP_NAME {
        CONSOLE_SLOGAN.to_string()
    } else {
        app_name.to_string()
    }
}

struct Progress {
    state: PipelineState,
    unlock_required: bool,
    history: Vec<PipelineState>,
}

impl Progress {
    fn new(unlock_required: bool) -> Self {
        let state = PipelineState::Connecting;
        debug!(state = %state, "pipeline started");
        Self {
            state,
            unlock_required,
            history: vec![state],
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next(self.unlock_required) {
            debug!(from = %self.state, to = %next, "pipeline step");
            self.state = next;
            self.history.push(next);
        }
    }

    fn fail(&mut self, error: PipelineError) -> PipelineFailure {
        let at = self.state;
        debug!(at = %at, error = %error, "pipeline failed");
        self.state = PipelineState::Failed;
        self.history.push(PipelineState::Failed);
        PipelineFailure {
            at,
            error,
            history: std::mem::take(&mut self.history),
        }
    }
}

/// Drive `plugin` from a fresh connection to `Ready`.
///
/// `merged_config` is sent verbatim as the single `fully_initialize`
/// payload. `secrets` is consulted only when the descriptor carries a
/// credential reference.
pub async fn run(
    plugin: &dyn AppPlugin,
    merged_config: &Value,
    secrets: &mut dyn SecretSource,
    sink: &dyn RenderSink,
) -> Result<Ready, PipelineFailure> {
    let descriptor = plugin.descriptor();
    let client = plugin.client();
    let mut progress = Progress::new(descriptor.requires_unlock());

    if let Err(err) = plugin.connect_rpc().await {
        return Err(progress.fail(PipelineError::Connect(err)));
    }
    progress.advance();

    if let Err(err) = client
        .call(METHOD_FULLY_INITIALIZE, merged_config.clone())
        .await
    {
        return Err(progress.fail(PipelineError::Configure(err)));
    }
    progress.advance();

    let read_only = progress.state != PipelineState::AwaitingUnlock;
    if read_only {
        sink.warn(READ_ONLY_WARNING);
    } else {
        let secret = match secrets.ask(MASTER_PASSWORD_LABEL).await {
            Ok(secret) => secret,
            Err(err) => return Err(progress.fail(PipelineError::Prompt(err))),
        };
        progress.advance();

        // The params copy is consumed by the call and dropped unwiped.
        let answer = client.call(METHOD_UNLOCK, json!([secret.expose()])).await;
        drop(secret);
        match answer {
            Ok(Value::Bool(true)) => {}
            Ok(other) => {
                debug!(result = %other, "unlock refused");
                sink.warn(WRONG_CREDENTIAL_WARNING);
                return Err(progress.fail(PipelineError::WrongCredential));
            }
            Err(err) => return Err(progress.fail(PipelineError::Unlock(err))),
        }
        progress.advance();
    }

    if let Err(err) = plugin.init().await {
        return Err(progress.fail(PipelineError::Init(err)));
    }
    progress.advance();

    info!(app = %descriptor.app_name, read_only, "console ready");
    Ok(Ready {
        slogan: slogan_for(&descriptor.app_name),
        read_only,
        history: progress.history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{
        app_descriptor, event_log, events, FakeApp, RecordingClient, RecordingSink,
        ScriptedSecrets,
    };
    use std::sync::Arc;

    fn merged() -> Value {
        json!({"geth": {"networkID": 4}, "ipfs": {}, "appOpts": {"appName": "Pizza"}})
    }

    #[tokio::test]
    async fn configure_always_follows_connect_and_precedes_init() {
        for account in [None, Some("0xabc")] {
            let log = event_log();
            let client = Arc::new(RecordingClient::new(log.clone()));
            let app = FakeApp::new(app_descriptor("Pizza", account), client.clone(), log.clone());
            let mut secrets = ScriptedSecrets::new(log.clone(), &["right"]);
            let sink = RecordingSink::default();

            run(&app, &merged(), &mut secrets, &sink).await.unwrap();

            let seen = events(&log);
            assert_eq!(seen[0], "connect");
            assert_eq!(seen[1], "call:fully_initialize");
            assert_eq!(seen.last().map(String::as_str), Some("init"));
        }
    }

    #[tokio::test]
    async fn whole_merged_config_is_sent_in_one_call() {
        let log = event_log();
        let client = Arc::new(RecordingClient::new(log.clone()));
        let app = FakeApp::new(app_descriptor("Pizza", None), client.clone(), log.clone());
        let mut secrets = ScriptedSecrets::new(log.clone(), &[]);

        run(&app, &merged(), &mut secrets, &RecordingSink::default())
            .await
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("fully_initialize".to_string(), merged()));
    }

    #[tokio::test]
    async fn no_credential_means_no_prompt_and_no_unlock() {
        let log = event_log();
        let client = Arc::new(RecordingClient::new(log.clone()));
        let app = FakeApp::new(app_descriptor("Viewer", None), client.clone(), log.clone());
        let mut secrets = ScriptedSecrets::new(log.clone(), &["unused"]);
        let sink = RecordingSink::default();

        let ready = run(&app, &merged(), &mut secrets, &sink).await.unwrap();

        assert_eq!(
            events(&log),
            vec!["connect", "call:fully_initialize", "init"]
        );
        assert!(ready.read_only);
        assert_eq!(ready.slogan, "Viewer");
        assert_eq!(ready.history, planned_path(false));
        assert_eq!(sink.lines(), vec![format!("warn: {READ_ONLY_WARNING}")]);
    }

    #[tokio::test]
    async fn right_credential_unlocks_then_inits_once() {
        let log = event_log();
        let client = Arc::new(RecordingClient::new(log.clone()));
        let app = FakeApp::new(app_descriptor("Pizza", Some("0xabc")), client.clone(), log.clone());
        let mut secrets = ScriptedSecrets::new(log.clone(), &["right"]);
        let sink = RecordingSink::default();

        let ready = run(&app, &merged(), &mut secrets, &sink).await.unwrap();

        assert_eq!(
            events(&log),
            vec![
                "connect",
                "call:fully_initialize",
                "prompt:Master Password:",
                "call:unlock",
                "init"
            ]
        );
        assert_eq!(client.calls()[1], ("unlock".to_string(), json!(["right"])));
        assert!(!ready.read_only);
        assert_eq!(ready.slogan, "Pizza");
        assert_eq!(ready.history, planned_path(true));
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn secret_is_sent_once_and_never_rendered() {
        let log = event_log();
        let client = Arc::new(
            RecordingClient::new(log.clone()).with_result("unlock", json!(false)),
        );
        let app = FakeApp::new(app_descriptor("Pizza", Some("0xabc")), client.clone(), log.clone());
        let mut secrets = ScriptedSecrets::new(log.clone(), &["hunter2"]);
        let sink = RecordingSink::default();

        let failure = run(&app, &merged(), &mut secrets, &sink).await.unwrap_err();

        let carrying: Vec<_> = client
            .calls()
            .into_iter()
            .filter(|(_, params)| params.to_string().contains("hunter2"))
            .collect();
        assert_eq!(carrying, vec![("unlock".to_string(), json!(["hunter2"]))]);
        assert!(sink.lines().iter().all(|line| !line.contains("hunter2")));
        assert!(!events(&log).iter().any(|event| event.contains("hunter2")));
        assert!(!format!("{failure:?}").contains("hunter2"));
        assert!(!ConsoleError::from(failure).to_string().contains("hunter2"));
    }

    #[tokio::test]
    async fn wrong_credential_is_fatal_and_skips_init() {
        let log = event_log();
        let client = Arc::new(
            RecordingClient::new(log.clone()).with_result("unlock", json!(false)),
        );
        let app = FakeApp::new(app_descriptor("Pizza", Some("0xabc")), client.clone(), log.clone());
        let mut secrets = ScriptedSecrets::new(log.clone(), &["wrong"]);
        let sink = RecordingSink::default();

        let failure = run(&app, &merged(), &mut secrets, &sink).await.unwrap_err();

        assert!(matches!(failure.error, PipelineError::WrongCredential));
        assert_eq!(failure.at, PipelineState::Unlocking);
        assert_eq!(failure.exit_code(), 1);
        assert!(!events(&log).contains(&"init".to_string()));
        assert_eq!(sink.lines(), vec!["warn: wrong password".to_string()]);
        assert_eq!(failure.history.last(), Some(&PipelineState::Failed));
    }

    #[tokio::test]
    async fn non_boolean_unlock_result_is_a_wrong_credential() {
        for answer in [json!(null), json!(0), json!("true"), json!(1)] {
            let log = event_log();
            let client =
                Arc::new(RecordingClient::new(log.clone()).with_result("unlock", answer));
            let app =
                FakeApp::new(app_descriptor("Pizza", Some("0xabc")), client, log.clone());
            let mut secrets = ScriptedSecrets::new(log.clone(), &["pw"]);

            let failure = run(&app, &merged(), &mut secrets, &RecordingSink::default())
                .await
                .unwrap_err();
            assert!(matches!(failure.error, PipelineError::WrongCredential));
        }
    }

    #[tokio::test]
    async fn rejected_unlock_call_is_a_transport_failure() {
        let log = event_log();
        let client = Arc::new(RecordingClient::new(log.clone()).with_rejection("unlock", "boom"));
        let app = FakeApp::new(app_descriptor("Pizza", Some("0xabc")), client, log.clone());
        let mut secrets = ScriptedSecrets::new(log.clone(), &["pw"]);
        let sink = RecordingSink::default();

        let failure = run(&app, &merged(), &mut secrets, &sink).await.unwrap_err();

        assert!(matches!(failure.error, PipelineError::Unlock(_)));
        assert!(sink.lines().is_empty());
        assert!(!events(&log).contains(&"init".to_string()));
    }

    #[tokio::test]
    async fn connect_failure_stops_before_any_call() {
        let log = event_log();
        let client = Arc::new(RecordingClient::new(log.clone()).with_connect_failure("refused"));
        let app = FakeApp::new(app_descriptor("Pizza", None), client.clone(), log.clone());
        let mut secrets = ScriptedSecrets::new(log.clone(), &[]);

        let failure = run(&app, &merged(), &mut secrets, &RecordingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(failure.error, PipelineError::Connect(_)));
        assert_eq!(failure.at, PipelineState::Connecting);
        assert_eq!(events(&log), vec!["connect"]);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn configure_failure_stops_before_prompt() {
        let log = event_log();
        let client = Arc::new(
            RecordingClient::new(log.clone()).with_rejection("fully_initialize", "bad config"),
        );
        let app = FakeApp::new(app_descriptor("Pizza", Some("0xabc")), client, log.clone());
        let mut secrets = ScriptedSecrets::new(log.clone(), &["right"]);

        let failure = run(&app, &merged(), &mut secrets, &RecordingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(failure.error, PipelineError::Configure(_)));
        assert_eq!(events(&log), vec!["connect", "call:fully_initialize"]);
    }

    #[tokio::test]
    async fn prompt_failure_is_fatal() {
        let log = event_log();
        let client = Arc::new(RecordingClient::new(log.clone()));
        let app = FakeApp::new(app_descriptor("Pizza", Some("0xabc")), client, log.clone());
        let mut secrets = ScriptedSecrets::new(log.clone(), &[]);

        let failure = run(&app, &merged(), &mut secrets, &RecordingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(failure.error, PipelineError::Prompt(_)));
        assert_eq!(failure.at, PipelineState::AwaitingUnlock);
        assert!(!events(&log).contains(&"call:unlock".to_string()));
    }

    #[tokio::test]
    async fn init_failure_is_surfaced() {
        let log = event_log();
        let client = Arc::new(RecordingClient::new(log.clone()));
        let app = FakeApp::new(app_descriptor("Pizza", None), client, log.clone())
            .with_failing_init("artifacts missing");
        let mut secrets = ScriptedSecrets::new(log.clone(), &[]);

        let failure = run(&app, &merged(), &mut secrets, &RecordingSink::default())
            .await
            .unwrap_err();

        assert_eq!(failure.at, PipelineState::Initializing);
        assert!(failure.error.to_string().contains("artifacts missing"));
    }

    #[test]
    fn builtin_app_uses_console_slogan() {
        assert_eq!(slogan_for("be"), CONSOLE_SLOGAN);
        assert_eq!(slogan_for("Pizza"), "Pizza");
    }
}
