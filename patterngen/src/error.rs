//! Generation error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a configuration or rendering a template
#[derive(Debug, Error)]
pub enum GenError {
    #[error("Not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to parse {} at line {line}, column {column}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Template '{name}' not found in {}", .dir.display())]
    TemplateNotFound { name: String, dir: PathBuf },

    #[error("Failed to render template '{template}'{}: {message}", line_suffix(.line))]
    Render {
        template: String,
        line: Option<usize>,
        message: String,
    },

    #[error("Invalid pattern selector '{value}': {reason}")]
    InvalidSelector { value: String, reason: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// Wrap an IO error, mapping `NotFound` to [`GenError::NotFound`]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            GenError::NotFound { path }
        } else {
            GenError::Io { path, source }
        }
    }

    /// Check if this error means a file was missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, GenError::NotFound { .. } | GenError::TemplateNotFound { .. })
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" (line {})", line),
        None => String::new(),
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GenError>;
