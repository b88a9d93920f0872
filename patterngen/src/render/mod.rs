//! Template rendering
//!
//! Templates are located by [`TemplateReference`], rendered against a
//! [`RenderContext`] and emitted to a directory or stdout. Two engines are
//! supported, picked by the template file extension:
//!
//! - `.j2` / `.jinja` - Jinja syntax via minijinja
//! - `.hbs` / `.handlebars` - Handlebars syntax
//!
//! Output is rendered fully in memory before anything is written.

mod hbs;
mod jinja;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::configuration::RenderContext;
use crate::error::{GenError, Result};
use crate::pattern::TemplateReference;

pub use hbs::HandlebarsRenderer;
pub use jinja::JinjaRenderer;

/// Template engine, selected from the template file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateEngine {
    Jinja,
    Handlebars,
}

impl TemplateEngine {
    const JINJA_EXTENSIONS: [&'static str; 3] = ["j2", "jinja", "jinja2"];
    const HANDLEBARS_EXTENSIONS: [&'static str; 2] = ["hbs", "handlebars"];

    /// Anything without a known extension is treated as Jinja
    pub fn from_template_name(name: &str) -> Self {
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) if Self::HANDLEBARS_EXTENSIONS.contains(&ext) => Self::Handlebars,
            _ => Self::Jinja,
        }
    }

    /// Canonical extension used when building template names
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jinja => "j2",
            Self::Handlebars => "hbs",
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Jinja => &Self::JINJA_EXTENSIONS,
            Self::Handlebars => &Self::HANDLEBARS_EXTENSIONS,
        }
    }

    /// Strip this engine's extension from `name`, if present
    pub fn strip_extension<'a>(&self, name: &'a str) -> &'a str {
        for ext in self.extensions() {
            if let Some(stem) = name.strip_suffix(ext).and_then(|s| s.strip_suffix('.')) {
                return stem;
            }
        }
        name
    }
}

/// What happens when a template touches a key the context does not have
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedPolicy {
    /// Undefined access is a render error
    #[default]
    Strict,
    /// Undefined values render empty and are false in conditionals
    Lenient,
}

/// Where rendered output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    Directory(PathBuf),
}

impl OutputTarget {
    /// An empty directory means stdout
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            Self::Stdout
        } else {
            Self::Directory(dir.to_path_buf())
        }
    }
}

/// Where output was emitted and how much was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Stdout { bytes: usize },
    File { path: PathBuf, bytes: usize },
}

impl RenderOutcome {
    pub fn bytes(&self) -> usize {
        match self {
            Self::Stdout { bytes } | Self::File { bytes, .. } => *bytes,
        }
    }
}

/// An engine able to render template source against a context
pub trait TemplateRenderer {
    fn engine(&self) -> TemplateEngine;

    /// Render `source`; `name` identifies the template in errors
    fn render_str(&self, name: &str, source: &str, context: &RenderContext) -> Result<String>;
}

/// Loads templates from disk and renders them with the matching engine
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    policy: UndefinedPolicy,
}

impl Renderer {
    pub fn new(policy: UndefinedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UndefinedPolicy {
        self.policy
    }

    fn backend(&self, engine: TemplateEngine) -> Box<dyn TemplateRenderer> {
        match engine {
            TemplateEngine::Jinja => Box::new(JinjaRenderer::new(self.policy)),
            TemplateEngine::Handlebars => Box::new(HandlebarsRenderer::new(self.policy)),
        }
    }

    /// Read the template source, failing with `TemplateNotFound` if it is absent
    pub fn load_template(&self, template: &TemplateReference) -> Result<String> {
        let path = template.path();
        let not_found = || GenError::TemplateNotFound {
            name: template.name.clone(),
            dir: template.dir.clone(),
        };

        if !path.is_file() {
            return Err(not_found());
        }
        debug!(path = %path.display(), "load_template: reading");
        fs::read_to_string(&path).map_err(|e| match GenError::io(&path, e) {
            GenError::NotFound { .. } => not_found(),
            other => other,
        })
    }

    /// Render a template to a string without emitting it
    pub fn render(&self, context: &RenderContext, template: &TemplateReference) -> Result<String> {
        let source = self.load_template(template)?;
        let backend = self.backend(template.engine());
        debug!(template = %template.name, engine = ?backend.engine(), policy = ?self.policy, "render: called");
        let rendered = backend.render_str(&template.name, &source, context)?;
        debug!(template = %template.name, bytes = rendered.len(), "render: complete");
        Ok(rendered)
    }

    /// Render and emit to `target`, using the process stdout for [`OutputTarget::Stdout`]
    pub fn render_to(
        &self,
        context: &RenderContext,
        template: &TemplateReference,
        target: &OutputTarget,
    ) -> Result<RenderOutcome> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_into(context, template, target, &mut handle)
    }

    /// Render and emit to `target`, writing stdout output to `out`
    pub fn render_into<W: Write>(
        &self,
        context: &RenderContext,
        template: &TemplateReference,
        target: &OutputTarget,
        out: &mut W,
    ) -> Result<RenderOutcome> {
        let rendered = self.render(context, template)?;
        emit(&rendered, template, target, out)
    }
}

/// Write rendered text to its destination
pub fn emit<W: Write>(
    rendered: &str,
    template: &TemplateReference,
    target: &OutputTarget,
    out: &mut W,
) -> Result<RenderOutcome> {
    match target {
        OutputTarget::Stdout => {
            out.write_all(rendered.as_bytes())
                .and_then(|_| out.flush())
                .map_err(|e| GenError::Io {
                    path: PathBuf::from("<stdout>"),
                    source: e,
                })?;
            debug!(bytes = rendered.len(), "emit: wrote to stdout");
            Ok(RenderOutcome::Stdout { bytes: rendered.len() })
        }
        OutputTarget::Directory(dir) => {
            fs::create_dir_all(dir).map_err(|e| GenError::io(dir, e))?;
            let path = dir.join(template.output_name());
            fs::write(&path, rendered).map_err(|e| GenError::io(&path, e))?;
            info!(path = %path.display(), bytes = rendered.len(), "Generated file");
            Ok(RenderOutcome::File {
                path,
                bytes: rendered.len(),
            })
        }
    }
}
