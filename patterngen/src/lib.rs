//! patterngen - design pattern code generator
//!
//! Renders a design pattern variant (singleton, strategy, adapter, ...) into
//! target-language source code. Each pattern carries a JSON configuration of
//! feature selections and one template per target language; the
//! configuration is exposed to the template as `features`.
//!
//! # Architecture
//!
//! ```text
//! patterns/{category}/{pattern}/configurations/{pattern}.json
//!                  │
//!                  ▼
//!     load_configuration ──► RenderContext { features }
//!                                   │
//! patterns/{category}/{pattern}/templates/{pattern}.{lang}.j2
//!                                   │
//!                                   ▼
//!                     Renderer ──► {output_dir}/{pattern}.{lang} or stdout
//! ```
//!
//! # Modules
//!
//! - [`configuration`] - Feature configuration loading
//! - [`pattern`] - Pattern selectors, path conventions and the on-disk catalog
//! - [`render`] - Template engines and output emission
//! - [`generator`] - The end-to-end pipeline
//! - [`config`] - Application configuration types and loading
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use patterngen::{GenerateOptions, Generator, PatternSelector};
//!
//! let selector = PatternSelector::new("creational", "singleton")?;
//! let source = Generator::new(GenerateOptions::new(selector, "swift")).render_to_string()?;
//! ```

pub mod cli;
pub mod config;
pub mod configuration;
pub mod error;
pub mod generator;
pub mod pattern;
pub mod render;

// Re-export commonly used types
pub use config::Config;
pub use configuration::{Configuration, FEATURES_KEY, RenderContext, load_configuration, load_configuration_file};
pub use error::{GenError, Result};
pub use generator::{GenerateOptions, Generator};
pub use pattern::{Category, PatternEntry, PatternSelector, TemplateReference, list_patterns};
pub use render::{OutputTarget, RenderOutcome, Renderer, TemplateEngine, TemplateRenderer, UndefinedPolicy};
