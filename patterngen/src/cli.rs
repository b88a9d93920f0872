//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::render::UndefinedPolicy;

/// patterngen - design pattern code generator
#[derive(Parser, Debug)]
#[command(
    name = "patterngen",
    author,
    version,
    about = "Render design pattern variants from JSON feature configurations",
    long_about = None
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `generate` with config values)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a pattern's template with its feature configuration
    Generate(GenerateArgs),

    /// List available patterns and their template languages
    List {
        /// Root of the pattern tree
        #[arg(short, long)]
        patterns_dir: Option<PathBuf>,
    },

    /// Print the feature configuration a pattern is rendered with
    Show {
        /// Pattern category (creational, structural, behavioral)
        category: Option<String>,

        /// Pattern name
        pattern: Option<String>,

        /// Root of the pattern tree
        #[arg(short, long)]
        patterns_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Args)]
pub struct GenerateArgs {
    /// Pattern category (creational, structural, behavioral)
    pub category: Option<String>,

    /// Pattern name
    pub pattern: Option<String>,

    /// Target language of the template (`<pattern>.<language>.j2`)
    #[arg(short = 't', long)]
    pub language: Option<String>,

    /// Write the generated file here instead of stdout
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Root of the pattern tree
    #[arg(short, long)]
    pub patterns_dir: Option<PathBuf>,

    /// Render from this JSON file instead of the pattern's configuration
    #[arg(short = 'f', long)]
    pub config_file: Option<PathBuf>,

    /// Render undefined template variables as empty
    #[arg(long, conflicts_with = "strict")]
    pub lenient: bool,

    /// Fail on undefined template variables
    #[arg(long)]
    pub strict: bool,

    /// Render but do not write anything
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    /// Fold command line overrides into the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(category) = &self.category {
            config.general_group = category.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.pattern = pattern.clone();
        }
        if let Some(language) = &self.language {
            config.target_language = language.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(patterns_dir) = &self.patterns_dir {
            config.patterns_dir = patterns_dir.clone();
        }
        if self.lenient {
            config.undefined = UndefinedPolicy::Lenient;
        } else if self.strict {
            config.undefined = UndefinedPolicy::Strict;
        }
    }
}
