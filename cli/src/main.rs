//! CLI entrypoint for Round Table
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod app;
mod commands;
mod output;
mod progress;

use anyhow::{Result, bail};
use app::App;
use clap::Parser;
use commands::{Cli, Command, OutputFormat};
use output::ConsoleFormatter;
use progress::ProgressReporter;
use roundtable_application::ProgressNotifier;
use roundtable_domain::{
    Artifact, ChatRequest, IdentityContext, RemoteRegistration, TaskId, TaskRequest,
};
use roundtable_infrastructure::{ConfigIssue, ConfigLoader, FileConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let (config, issues) = if cli.no_config {
        (ConfigLoader::load_defaults(), Vec::new())
    } else {
        ConfigLoader::load_validated(cli.config.as_deref())?
    };

    let identity = IdentityContext::new(
        cli.identity.tenant.as_str(),
        cli.identity.user.as_str(),
        cli.identity.role,
    );
    info!(identity = %identity, "Starting Round Table");

    if let Command::Config = cli.command {
        return show_config(&cli, &config, &issues);
    }

    // === Dependency Injection ===
    let app = App::build(config).await?;
    execute(&app, &identity, cli.command).await
}

async fn execute(app: &App, identity: &IdentityContext, command: Command) -> Result<()> {
    match command {
        Command::Agents { probe } => {
            if probe {
                app.registry.probe_health().await?;
            }
            let agents: Vec<_> = app
                .registry
                .list_for_tenant(identity)?
                .into_iter()
                .map(|d| {
                    let score = app.trust.score(&identity.tenant_id, &d.name);
                    (d, score)
                })
                .collect();
            print!("{}", ConsoleFormatter::format_agents(&agents));
        }

        Command::Register {
            name,
            domain,
            url,
            visibility,
            mode,
            capabilities,
        } => {
            let registration = RemoteRegistration::new(name, domain, url)
                .with_visibility(visibility)
                .with_mode(mode)
                .with_capabilities(capabilities);
            let key_env = registration.api_key_env();
            let descriptor = app.registry.register_remote(identity, registration).await?;
            app.save_registrations().await?;
            println!(
                "Registered {} ({}, {}). API key is read from {}.",
                descriptor.name,
                descriptor.target.as_str(),
                descriptor.visibility,
                key_env
            );
        }

        Command::Unregister { name } => {
            let removed = app.registry.unregister(identity, &name)?;
            app.save_registrations().await?;
            println!("Removed {}", removed.name);
        }

        Command::Run {
            query,
            tags,
            simple,
            output,
        } => {
            let mut request = TaskRequest::new(query).with_tags(tags);
            if simple {
                request = request.simple();
            }

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let engine = app.engine();
            let reporter = ProgressReporter::new();
            let progress: &dyn ProgressNotifier = match output {
                OutputFormat::Json => &roundtable_application::NoProgress,
                _ => &reporter,
            };
            let artifact = match engine.run(identity, request, cancel, progress).await {
                Ok(artifact) => artifact,
                Err(e) => bail!("{}", e.to_user_facing()),
            };
            print_artifact(&artifact, output);
        }

        Command::Ask { query, tags } => {
            let mut request = ChatRequest::new(query);
            request.tags = tags;
            let cancel = CancellationToken::new();
            let response = app.chat().respond(identity, request, &cancel).await?;
            print!("{}", ConsoleFormatter::format_chat(&response));
        }

        Command::Search { query, limit } => {
            let hits = app.search(&identity.tenant_id, &query, limit).await?;
            print!("{}", ConsoleFormatter::format_search(&hits));
        }

        Command::Show { task_id, output } => {
            match app
                .artifact(&identity.tenant_id, &TaskId::new(task_id.clone()))
                .await?
            {
                Some(artifact) => print_artifact(&artifact, output),
                None => bail!("No artifact {} in tenant {}", task_id, identity.tenant_id),
            }
        }

        Command::Feedback { agent, signal } => {
            let score = app.feedback().execute(identity, &agent, signal)?;
            app.save_trust().await?;
            println!("{} trust for {} is now {:.3}", agent, identity.tenant_id, score);
        }

        // Printed before wiring
        Command::Config => {}
    }

    Ok(())
}

fn print_artifact(artifact: &Artifact, format: OutputFormat) {
    let text = match format {
        OutputFormat::Full => ConsoleFormatter::format_full(artifact),
        OutputFormat::Summary => ConsoleFormatter::format_summary(artifact),
        OutputFormat::Json => ConsoleFormatter::format_json(artifact),
    };
    println!("{}", text);
}

fn show_config(cli: &Cli, config: &FileConfig, issues: &[ConfigIssue]) -> Result<()> {
    if cli.no_config {
        println!("Configuration files disabled (--no-config)");
    } else {
        ConfigLoader::print_config_sources(cli.config.as_deref());
    }
    println!("  Data:    {}", ConfigLoader::data_dir().display());
    println!();
    println!("{}", toml::to_string_pretty(config)?);
    for issue in issues {
        println!("{}", issue);
    }
    Ok(())
}
