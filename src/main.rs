mod app;
mod cli;

use clap::Parser;
use cli::{Cli, Command, ProbeArgs, RunArgs};
use quill_core::config::Settings;
use quill_core::lifecycle::logging::init_logging;
use quill_core::readiness::ReadinessProber;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let command = cli.command.unwrap_or(Command::Run(RunArgs::default()));

    match command {
        Command::Run(args) => cmd_run(settings, args),
        Command::Probe(args) => cmd_probe(settings, args),
    }
}

fn cmd_run(mut settings: Settings, args: RunArgs) -> anyhow::Result<ExitCode> {
    // CLI overrides
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }

    let _guard = init_logging(
        &settings.log_level,
        &settings.app_env,
        settings.log_dir.as_deref(),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let application = app::Application::build(settings);
        application.serve().await
    })?;

    Ok(ExitCode::SUCCESS)
}

/// One-shot readiness check for container health checks: prints the
/// readiness body and exits non-zero when not ready.
fn cmd_probe(settings: Settings, args: ProbeArgs) -> anyhow::Result<ExitCode> {
    let _guard = init_logging("warn", &settings.app_env, None);

    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.readiness_timeout());
    let target = settings.database_url.as_ref().map(|url| url.expose());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(ReadinessProber::with_default_drivers().probe(target, timeout));

    println!("{}", serde_json::to_string(&result.body())?);

    Ok(if result.ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
