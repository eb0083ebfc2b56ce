//! Application entry orchestration for the bladecon CLI.

use std::path::PathBuf;
use std::sync::Arc;

use bladecon::apps::{AppRegistry, AppResolver, ClientFactory};
use bladecon::config::{
    load_bootstrap, load_settings, resolve_config, ConnectionParams, ConsoleSettings, RpcSettings,
};
use bladecon::error::{ConsoleError, PipelineError};
use bladecon::pipeline;
use bladecon::rpc::{RpcClient, WsRpcClient};
use bladecon::secret::TerminalSecretPrompt;
use bladecon::shell::{run_session, ExitTrigger, ShellContext, Teardown};
use bladecon::ui::{RenderSink, Renderer};
use bladecon::worker::{WorkerSpec, WorkerSupervisor};
use tokio::io::BufReader;
use tracing::{debug, error};

use crate::app::startup::{init_tracing, render_startup_banner, STOPPING_MESSAGE};
use crate::cli::Args;

/// Run the console and return the process exit status.
pub(crate) async fn run(args: Args) -> i32 {
    let settings = match load_settings(args.settings.as_deref()) {
        Ok(settings) => apply_cli_overrides(settings, &args),
        Err(err) => {
            init_tracing(!args.no_color);
            Renderer::new(!args.no_color).error(&format!("settings: {err}"));
            return 1;
        }
    };
    let color = settings.display.color;
    init_tracing(color);
    let renderer = Renderer::new(color);

    match start(&args, &settings, &renderer).await {
        Ok(code) => code,
        Err(err) => {
            report(&renderer, &err);
            err.exit_code()
        }
    }
}

/// CLI flags win over settings files and environment.
fn apply_cli_overrides(mut settings: ConsoleSettings, args: &Args) -> ConsoleSettings {
    if let Some(program) = &args.worker {
        settings.worker.program = program.clone();
    }
    if let Some(dir) = &args.apps_dir {
        settings.apps.dir = dir.clone();
    }
    if args.no_color {
        settings.display.color = false;
    }
    settings
}

fn ws_client_factory(rpc: RpcSettings) -> ClientFactory {
    Box::new(move |params: &ConnectionParams| {
        Arc::new(WsRpcClient::for_endpoint(params, &rpc)) as Arc<dyn RpcClient>
    })
}

fn report(renderer: &dyn RenderSink, err: &ConsoleError) {
    error!(error = %err, "console aborted");
    // Already announced by the pipeline as a warning.
    if matches!(err, ConsoleError::Pipeline(PipelineError::WrongCredential)) {
        return;
    }
    renderer.error(&err.to_string());
}

async fn start(
    args: &Args,
    settings: &ConsoleSettings,
    renderer: &Renderer,
) -> Result<i32, ConsoleError> {
    // Configuration and app resolution both fail before any process exists.
    let bootstrap = load_bootstrap(&args.bootstrap)?;
    let config = resolve_config(&bootstrap)?;

    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let resolver = AppResolver::new(
        AppRegistry::new(),
        settings.apps.dir.clone(),
        base_dir,
        ws_client_factory(settings.rpc.clone()),
    );
    let binding = resolver.resolve(&args.app, &config)?;

    let supervisor = WorkerSupervisor::new(WorkerSpec::from(&settings.worker));
    let worker = supervisor.spawn(&config.connection())?;
    let teardown = Teardown::new(Box::new(worker)).with_client(binding.plugin.client());

    let merged_config = config.merged_payload(&binding.descriptor.to_value());
    let mut secrets = TerminalSecretPrompt::new();
    let ready = match pipeline::run(
        binding.plugin.as_ref(),
        &merged_config,
        &mut secrets,
        renderer,
    )
    .await
    {
        Ok(ready) => ready,
        Err(failure) => {
            debug!(at = %failure.at, "startup aborted; stopping worker");
            teardown.run(ExitTrigger::Abort).await;
            return Err(failure.into());
        }
    };

    render_startup_banner(settings.display.color, &ready.slogan);
    let ctx = ShellContext {
        binding,
        merged_config,
        ready,
    };
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let mut stdout = std::io::stdout();
    let outcome = run_session(
        &ctx,
        BufReader::new(tokio::io::stdin()),
        &mut stdout,
        interrupt,
    )
    .await;

    renderer.activity(STOPPING_MESSAGE);
    let (trigger, code) = match outcome {
        Ok(trigger) => (trigger, 0),
        Err(err) => {
            renderer.error(&format!("shell: {err}"));
            (ExitTrigger::EndOfInput, 1)
        }
    };
    teardown.run(trigger).await;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bladecon::error::ConfigError;
    use clap::Parser;
    use std::ffi::OsString;
    use std::path::Path;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bladecon-entry-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn cli_flags_override_settings() {
        let args = Args::parse_from([
            "bladecon",
            "--worker",
            "node",
            "--apps-dir",
            "apps",
            "--no-color",
        ]);
        let settings = apply_cli_overrides(ConsoleSettings::default(), &args);
        assert_eq!(settings.worker.program, "node");
        assert_eq!(settings.apps.dir, Path::new("apps"));
        assert!(!settings.display.color);
    }

    #[test]
    fn absent_flags_keep_settings() {
        let args = Args::parse_from(["bladecon"]);
        let settings = apply_cli_overrides(ConsoleSettings::default(), &args);
        assert_eq!(settings.worker.program, "bladeiron");
        assert!(settings.display.color);
    }

    #[tokio::test]
    async fn empty_config_dir_aborts_before_spawning() {
        let bootstrap = temp_file("empty_bootstrap.json", r#"{"configDir": ""}"#);
        let args = Args::parse_from([
            OsString::from("bladecon"),
            OsString::from("--bootstrap"),
            bootstrap.into_os_string(),
            OsString::from("--worker"),
            OsString::from("/nonexistent/bladecon-worker"),
        ]);
        let settings = apply_cli_overrides(ConsoleSettings::default(), &args);
        let err = start(&args, &settings, &Renderer::new(false))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ConsoleError::Config(ConfigError::MissingConfigDir)),
            "got: {err}"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn unknown_app_aborts_before_spawning() {
        let dir = std::env::temp_dir().join(format!("bladecon-entry-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.json"), r#"{"networkID": 4}"#).unwrap();
        std::fs::write(dir.join("ipfsserv.json"), "{}").unwrap();
        let bootstrap = temp_file(
            "bootstrap.json",
            &serde_json::json!({"configDir": dir}).to_string(),
        );
        let args = Args::parse_from([
            OsString::from("bladecon"),
            OsString::from("ghost"),
            OsString::from("--bootstrap"),
            bootstrap.into_os_string(),
            OsString::from("--apps-dir"),
            dir.join("dapps").into_os_string(),
            OsString::from("--worker"),
            OsString::from("/nonexistent/bladecon-worker"),
        ]);
        let settings = apply_cli_overrides(ConsoleSettings::default(), &args);
        let err = start(&args, &settings, &Renderer::new(false))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::App(_)), "got: {err}");
    }
}
