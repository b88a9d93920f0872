//! Jinja templates via minijinja

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use tracing::debug;

use super::{TemplateEngine, TemplateRenderer, UndefinedPolicy};
use crate::configuration::{FEATURES_KEY, RenderContext};
use crate::error::{GenError, Result};

/// Renders `.j2` templates
#[derive(Debug, Clone, Copy, Default)]
pub struct JinjaRenderer {
    policy: UndefinedPolicy,
}

impl JinjaRenderer {
    pub fn new(policy: UndefinedPolicy) -> Self {
        Self { policy }
    }

    fn environment<'source>(&self) -> Environment<'source> {
        let mut env = Environment::new();
        env.set_undefined_behavior(match self.policy {
            UndefinedPolicy::Strict => UndefinedBehavior::Strict,
            UndefinedPolicy::Lenient => UndefinedBehavior::Lenient,
        });
        // generated source code, never HTML
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env
    }
}

impl TemplateRenderer for JinjaRenderer {
    fn engine(&self) -> TemplateEngine {
        TemplateEngine::Jinja
    }

    fn render_str(&self, name: &str, source: &str, context: &RenderContext) -> Result<String> {
        let env = self.environment();
        let template = env
            .template_from_named_str(name, source)
            .map_err(|e| render_error(name, &e, Vec::new()))?;

        template.render(context).map_err(|e| {
            let undefined = if e.kind() == ErrorKind::UndefinedError {
                undefined_references(template.undeclared_variables(true), context)
            } else {
                Vec::new()
            };
            debug!(template = name, ?undefined, "JinjaRenderer::render_str: render failed");
            render_error(name, &e, undefined)
        })
    }
}

/// Referenced variables the context cannot satisfy, sorted
fn undefined_references(referenced: impl IntoIterator<Item = String>, context: &RenderContext) -> Vec<String> {
    let mut missing: Vec<String> = referenced
        .into_iter()
        .filter(|path| {
            if path == FEATURES_KEY {
                return false;
            }
            match path.strip_prefix(FEATURES_KEY).and_then(|rest| rest.strip_prefix('.')) {
                Some(_) => context.lookup(path).is_none(),
                None => true,
            }
        })
        .collect();
    missing.sort();
    missing
}

/// Location goes in `GenError::Render::line`, so the message carries only kind and detail
fn render_error(name: &str, err: &minijinja::Error, undefined: Vec<String>) -> GenError {
    let mut message = match err.detail() {
        Some(detail) => format!("{}: {}", err.kind(), detail),
        None => err.kind().to_string(),
    };
    if !undefined.is_empty() {
        message.push_str(&format!(" (undefined: {})", undefined.join(", ")));
    }
    GenError::Render {
        template: name.to_string(),
        line: err.line(),
        message,
    }
}
