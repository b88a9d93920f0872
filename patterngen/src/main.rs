//! patterngen - design pattern code generator
//!
//! CLI entry point. Generated source goes to stdout or the output directory;
//! logs always go to stderr.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use patterngen::cli::{Cli, Command, GenerateArgs};
use patterngen::config::Config;
use patterngen::{Category, GenerateOptions, Generator, OutputTarget, PatternSelector, RenderOutcome};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    // Priority: CLI --log-level > config file > RUST_LOG > WARN
    let filter = match cli_log_level.or(config_log_level) {
        Some(s) => {
            let level = match s.to_uppercase().as_str() {
                "TRACE" => tracing::Level::TRACE,
                "DEBUG" => tracing::Level::DEBUG,
                "INFO" => tracing::Level::INFO,
                "WARN" | "WARNING" => tracing::Level::WARN,
                "ERROR" => tracing::Level::ERROR,
                _ => {
                    eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                    tracing::Level::WARN
                }
            };
            EnvFilter::from_default_env().add_directive(level.into())
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| eyre::eyre!("{}", e))?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    info!(
        "patterngen loaded config: pattern={}/{}, language={}",
        config.general_group, config.pattern, config.target_language
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Generate(args)) => cmd_generate(&mut config, &args),
        Some(Command::List { patterns_dir }) => cmd_list(&config, patterns_dir),
        Some(Command::Show {
            category,
            pattern,
            patterns_dir,
        }) => {
            let args = GenerateArgs {
                category,
                pattern,
                patterns_dir,
                ..Default::default()
            };
            cmd_show(&mut config, &args)
        }
        // No subcommand: generate with whatever the config selects
        None => cmd_generate(&mut config, &GenerateArgs::default()),
    }
}

/// Render a pattern and emit it
fn cmd_generate(config: &mut Config, args: &GenerateArgs) -> Result<()> {
    args.apply(config);

    let mut options = GenerateOptions::from_config(config)?;
    if let Some(path) = &args.config_file {
        options = options.with_configuration_file(path);
    }
    let generator = Generator::new(options);

    if args.dry_run {
        let rendered = generator
            .render_to_string()
            .context(format!("Failed to generate {}", generator.options().selector))?;
        let destination = match &generator.options().output {
            OutputTarget::Stdout => "stdout".to_string(),
            OutputTarget::Directory(dir) => dir.join(generator.template().output_name()).display().to_string(),
        };
        eprintln!(
            "{} Dry run: {} bytes would be written to {}",
            "✓".green(),
            rendered.len(),
            destination.cyan()
        );
        return Ok(());
    }

    let outcome = generator
        .run()
        .context(format!("Failed to generate {}", generator.options().selector))?;

    if let RenderOutcome::File { path, bytes } = outcome {
        println!("{} Generated {} ({} bytes)", "✓".green(), path.display().to_string().cyan(), bytes);
    }
    Ok(())
}

/// List the patterns under the patterns root
fn cmd_list(config: &Config, patterns_dir: Option<PathBuf>) -> Result<()> {
    let root = patterns_dir.unwrap_or_else(|| config.patterns_dir.clone());
    let entries = patterngen::list_patterns(&root).context(format!("Failed to list patterns in {}", root.display()))?;

    if entries.is_empty() {
        println!("No patterns found in {}", root.display());
        return Ok(());
    }

    let mut current_category = None;
    for entry in entries {
        let category = entry.selector.category().to_string();
        if current_category.as_ref() != Some(&category) {
            if Category::parse(&category).is_some() {
                println!("{}", category.bold());
            } else {
                println!("{} {}", category.bold(), "(non-standard category)".dimmed());
            }
            current_category = Some(category);
        }
        let languages = if entry.languages.is_empty() {
            "no templates".dimmed().to_string()
        } else {
            entry.languages.join(", ")
        };
        println!("  {} ({})", entry.selector.name().cyan(), languages);
    }
    Ok(())
}

/// Print the configuration a pattern renders with
fn cmd_show(config: &mut Config, args: &GenerateArgs) -> Result<()> {
    args.apply(config);

    let selector = PatternSelector::new(config.general_group.clone(), config.pattern.clone())?;
    let configuration = patterngen::load_configuration(&config.patterns_dir, &selector)
        .context(format!("Failed to load configuration for {}", selector))?;

    println!("{}", serde_json::to_string_pretty(&configuration)?);
    Ok(())
}
