//! Handlebars templates

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, JsonTruthy, Output, RenderContext as HbsRenderContext,
    RenderErrorReason, Renderable,
};

use super::{TemplateEngine, TemplateRenderer, UndefinedPolicy};
use crate::configuration::RenderContext;
use crate::error::{GenError, Result};

/// Renders `.hbs` templates
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlebarsRenderer {
    policy: UndefinedPolicy,
}

impl HandlebarsRenderer {
    pub fn new(policy: UndefinedPolicy) -> Self {
        Self { policy }
    }

    fn registry(&self) -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        if self.policy == UndefinedPolicy::Strict {
            hbs.set_strict_mode(true);
            // built-in if/unless skip strict checks on their parameter
            hbs.register_helper("if", Box::new(StrictConditional { positive: true }));
            hbs.register_helper("unless", Box::new(StrictConditional { positive: false }));
        }
        hbs
    }
}

/// `if`/`unless` that fail on a missing parameter instead of treating it as false
#[derive(Clone, Copy)]
struct StrictConditional {
    positive: bool,
}

impl HelperDef for StrictConditional {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut HbsRenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let helper = if self.positive { "if" } else { "unless" };
        let param = h.param(0).ok_or(RenderErrorReason::ParamNotFoundForIndex(helper, 0))?;
        if param.is_value_missing() {
            return Err(RenderErrorReason::MissingVariable(param.relative_path().cloned()).into());
        }

        let include_zero = h
            .hash_get("includeZero")
            .and_then(|v| v.value().as_bool())
            .unwrap_or(false);
        let truthy = param.value().is_truthy(include_zero) == self.positive;

        match if truthy { h.template() } else { h.inverse() } {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn engine(&self) -> TemplateEngine {
        TemplateEngine::Handlebars
    }

    fn render_str(&self, name: &str, source: &str, context: &RenderContext) -> Result<String> {
        let mut hbs = self.registry();
        hbs.register_template_string(name, source)
            .map_err(|e| render_error(name, e.pos().map(|(line, _)| line), e.reason().to_string()))?;
        hbs.render(name, context)
            .map_err(|e| render_error(name, e.line_no, e.reason().to_string()))
    }
}

fn render_error(name: &str, line: Option<usize>, message: String) -> GenError {
    GenError::Render {
        template: name.to_string(),
        line,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Configuration;
    use std::path::Path;

    fn context(json: &str) -> RenderContext {
        RenderContext::new(Configuration::parse(json, Path::new("test.json")).unwrap())
    }

    #[test]
    fn test_conditional_and_each() {
        let template = "{{#if features.thread_safe}}locked{{else}}unlocked{{/if}}:{{#each features.names}}{{this}},{{/each}}";
        let out = HandlebarsRenderer::default()
            .render_str(
                "t.hbs",
                template,
                &context(r#"{"thread_safe": false, "names": ["a", "b"]}"#),
            )
            .unwrap();
        assert_eq!(out, "unlocked:a,b,");
    }

    #[test]
    fn test_strict_missing_field() {
        let err = HandlebarsRenderer::new(UndefinedPolicy::Strict)
            .render_str("adapter.swift.hbs", "{{features.target}}", &context("{}"))
            .unwrap_err();
        match err {
            GenError::Render { template, message, .. } => {
                assert_eq!(template, "adapter.swift.hbs");
                assert!(message.contains("features.target"), "message: {}", message);
            }
            other => panic!("expected Render, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_missing_if_param() {
        let renderer = HandlebarsRenderer::new(UndefinedPolicy::Strict);
        for template in [
            "{{#if features.missing}}A{{else}}B{{/if}}",
            "{{#unless features.missing}}A{{/unless}}",
        ] {
            let err = renderer.render_str("t.hbs", template, &context("{}")).unwrap_err();
            match err {
                GenError::Render { message, .. } => {
                    assert!(message.contains("features.missing"), "message: {}", message)
                }
                other => panic!("expected Render, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_strict_conditionals_on_present_keys() {
        let out = HandlebarsRenderer::new(UndefinedPolicy::Strict)
            .render_str(
                "t.hbs",
                "{{#if features.on}}A{{else}}B{{/if}}{{#unless features.off}}C{{/unless}}{{#if features.zero includeZero=true}}D{{/if}}",
                &context(r#"{"on": true, "off": false, "zero": 0}"#),
            )
            .unwrap();
        assert_eq!(out, "ACD");
    }

    #[test]
    fn test_lenient_missing_if_param() {
        let out = HandlebarsRenderer::new(UndefinedPolicy::Lenient)
            .render_str("t.hbs", "{{#if features.missing}}A{{else}}B{{/if}}", &context("{}"))
            .unwrap();
        assert_eq!(out, "B");
    }

    #[test]
    fn test_render_error_reports_line() {
        let err = HandlebarsRenderer::new(UndefinedPolicy::Strict)
            .render_str("t.hbs", "a\nb\n{{features.x}}", &context("{}"))
            .unwrap_err();
        assert!(matches!(err, GenError::Render { line: Some(3), .. }), "got {:?}", err);
    }

    #[test]
    fn test_lenient_missing_field() {
        let out = HandlebarsRenderer::new(UndefinedPolicy::Lenient)
            .render_str("adapter.swift.hbs", "[{{features.target}}]", &context("{}"))
            .unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_invalid_syntax() {
        let err = HandlebarsRenderer::default()
            .render_str("bad.hbs", "{{#if features.x}}never closed", &context(r#"{"x": true}"#))
            .unwrap_err();
        assert!(matches!(err, GenError::Render { .. }));
    }
}
