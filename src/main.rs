use anyhow::{Context, Result};
use minici::cli::commands::{RunCommand, ValidateCommand};
use minici::cli::output::*;
use minici::cli::{Cli, Command};
use minici::core::config::PipelineConfig;
use minici::core::{Event, PipelineOutcome};
use minici::execution::{cancel_channel, JobRunner, Orchestrator, SystemRunner};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd, &cli).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand, cli: &Cli) -> Result<()> {
    let config = PipelineConfig::from_file(&cmd.file)
        .with_context(|| format!("Failed to load pipeline config from {}", cmd.file))?;
    let event = build_event(cmd)?;

    if !cmd.json {
        println!("{} Loaded pipeline: {}", INFO, style(&config.name).bold());
    }

    let mut definition = config.to_definition();
    if let Some(root) = &cmd.workspace_root {
        definition.workspace_root = root.clone();
    }

    let runner = JobRunner::new(SystemRunner::new(), definition.workspace_root.clone())
        .keep_workspaces(cmd.keep_workspaces);
    let orchestrator = Orchestrator::new(definition, runner);

    // Per-step console progress, unless emitting JSON
    if !cmd.json && !cli.quiet {
        orchestrator.add_event_handler(|event| {
            println!("{}", format_pipeline_event(&event));
        });
    }

    // Ctrl-C cancels every in-flight job
    let (handle, signal) = cancel_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            error!("Interrupted, cancelling in-flight jobs");
            handle.cancel();
        }
    });

    if !cmd.json {
        println!();
    }
    let outcome = orchestrator.run(&event, signal).await;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }

    let code = outcome.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Build the triggering event from flags or a JSON payload file
fn build_event(cmd: &RunCommand) -> Result<Event> {
    if let Some(path) = &cmd.event_file {
        return Event::from_file(path)
            .with_context(|| format!("Failed to read event from {}", path));
    }

    let kind = cmd
        .event
        .ok_or_else(|| anyhow::anyhow!("either --event or --event-file is required"))?;
    let mut event = Event::new(kind.into(), &cmd.branch);
    for (key, value) in &cmd.metadata {
        event = event.with_metadata(key, value);
    }
    Ok(event)
}

fn print_summary(outcome: &PipelineOutcome) {
    println!();
    if outcome.results.is_empty() {
        println!("{} No jobs matched the event", INFO);
    }
    for result in &outcome.results {
        println!("  {}", format_run_result(result));
    }

    if outcome.is_success() {
        println!(
            "\n{} {} completed {}",
            CHECK,
            style(&outcome.pipeline_name).bold(),
            style("successfully").green()
        );
    } else {
        println!(
            "\n{} {} {}",
            CROSS,
            style(&outcome.pipeline_name).bold(),
            style("failed").red()
        );
    }
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    match PipelineConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Jobs: {}", style(config.jobs.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}
