//! Generation pipeline
//!
//! load configuration -> wrap as `{"features": ...}` -> resolve template -> render -> emit

use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Config;
use crate::configuration::{RenderContext, load_configuration, load_configuration_file};
use crate::error::Result;
use crate::pattern::{PatternSelector, TemplateReference};
use crate::render::{OutputTarget, RenderOutcome, Renderer, UndefinedPolicy};

/// Everything a single generation run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub patterns_dir: PathBuf,
    pub selector: PatternSelector,
    pub language: String,
    pub output: OutputTarget,
    pub undefined: UndefinedPolicy,
    /// Use this file instead of the pattern's own configuration
    pub configuration_file: Option<PathBuf>,
}

impl GenerateOptions {
    pub fn new(selector: PatternSelector, language: impl Into<String>) -> Self {
        Self {
            patterns_dir: PathBuf::from("patterns"),
            selector,
            language: language.into(),
            output: OutputTarget::Stdout,
            undefined: UndefinedPolicy::default(),
            configuration_file: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let selector = PatternSelector::new(config.general_group.clone(), config.pattern.clone())?;
        Ok(Self {
            patterns_dir: config.patterns_dir.clone(),
            selector,
            language: config.target_language.clone(),
            output: OutputTarget::from_dir(&config.output_dir),
            undefined: config.undefined,
            configuration_file: None,
        })
    }

    pub fn with_patterns_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.patterns_dir = dir.into();
        self
    }

    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    pub fn with_undefined(mut self, undefined: UndefinedPolicy) -> Self {
        self.undefined = undefined;
        self
    }

    pub fn with_configuration_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.configuration_file = Some(path.into());
        self
    }
}

/// Runs the load/render pipeline for one pattern
#[derive(Debug, Clone)]
pub struct Generator {
    options: GenerateOptions,
    renderer: Renderer,
}

impl Generator {
    pub fn new(options: GenerateOptions) -> Self {
        let renderer = Renderer::new(options.undefined);
        Self { options, renderer }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Load the configuration and wrap it in a render context
    pub fn context(&self) -> Result<RenderContext> {
        let configuration = match &self.options.configuration_file {
            Some(path) => load_configuration_file(path)?,
            None => load_configuration(&self.options.patterns_dir, &self.options.selector)?,
        };
        Ok(RenderContext::new(configuration))
    }

    pub fn template(&self) -> TemplateReference {
        TemplateReference::resolve(
            &self.options.patterns_dir,
            &self.options.selector,
            &self.options.language,
        )
    }

    /// Render without emitting anything
    pub fn render_to_string(&self) -> Result<String> {
        debug!(pattern = %self.options.selector, language = %self.options.language, "render_to_string: called");
        let context = self.context()?;
        self.renderer.render(&context, &self.template())
    }

    /// Run the pipeline, emitting to the configured output
    pub fn run(&self) -> Result<RenderOutcome> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.run_into(&mut handle)
    }

    /// Run the pipeline; stdout output goes to `out`
    pub fn run_into<W: Write>(&self, out: &mut W) -> Result<RenderOutcome> {
        debug!(
            pattern = %self.options.selector,
            language = %self.options.language,
            output = ?self.options.output,
            "run: called"
        );
        let context = self.context()?;
        let template = self.template();
        let outcome = self.renderer.render_into(&context, &template, &self.options.output, out)?;
        info!(pattern = %self.options.selector, bytes = outcome.bytes(), "Generation complete");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const TEMPLATE: &str = "{% if features.thread_safe %}THREAD_SAFE\n{% endif %}{% if features.lazy_init %}LAZY\n{% endif %}";

    fn seed(root: &Path, configuration: &str) -> GenerateOptions {
        let selector = PatternSelector::new("creational", "singleton").unwrap();
        let config_path = selector.configuration_path(root);
        fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        fs::write(&config_path, configuration).unwrap();
        let template_dir = selector.template_dir(root);
        fs::create_dir_all(&template_dir).unwrap();
        fs::write(template_dir.join("singleton.swift.j2"), TEMPLATE).unwrap();

        GenerateOptions::new(selector, "swift").with_patterns_dir(root)
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            general_group: "structural".to_string(),
            pattern: "adapter".to_string(),
            output_dir: PathBuf::from("out"),
            ..Default::default()
        };
        let options = GenerateOptions::from_config(&config).unwrap();
        assert_eq!(options.selector.to_string(), "structural/adapter");
        assert_eq!(options.language, "swift");
        assert_eq!(options.output, OutputTarget::Directory(PathBuf::from("out")));
        assert_eq!(options.undefined, UndefinedPolicy::Strict);
    }

    #[test]
    fn test_from_config_rejects_bad_pattern() {
        let config = Config {
            pattern: "../escape".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            GenerateOptions::from_config(&config),
            Err(GenError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_run_to_stdout() {
        let temp = tempdir().unwrap();
        let options = seed(temp.path(), r#"{"thread_safe": true, "lazy_init": false}"#);
        let mut out = Vec::new();

        let outcome = Generator::new(options).run_into(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "THREAD_SAFE\n");
        assert_eq!(outcome, RenderOutcome::Stdout { bytes: 12 });
    }

    #[test]
    fn test_run_to_directory() {
        let temp = tempdir().unwrap();
        let out_dir = temp.path().join("generated");
        let options = seed(temp.path(), r#"{"thread_safe": false, "lazy_init": true}"#)
            .with_output(OutputTarget::Directory(out_dir.clone()));

        let outcome = Generator::new(options).run_into(&mut Vec::new()).unwrap();
        let path = out_dir.join("singleton.swift");
        assert_eq!(outcome, RenderOutcome::File { path: path.clone(), bytes: 5 });
        assert_eq!(fs::read_to_string(path).unwrap(), "LAZY\n");
    }

    #[test]
    fn test_configuration_file_override() {
        let temp = tempdir().unwrap();
        let override_path = temp.path().join("custom.json");
        fs::write(&override_path, r#"{"thread_safe": false, "lazy_init": true}"#).unwrap();
        let options = seed(temp.path(), r#"{"thread_safe": true, "lazy_init": false}"#)
            .with_configuration_file(&override_path);

        assert_eq!(Generator::new(options).render_to_string().unwrap(), "LAZY\n");
    }

    #[test]
    fn test_missing_key_strict_then_lenient() {
        let temp = tempdir().unwrap();
        let options = seed(temp.path(), r#"{"thread_safe": true}"#);

        let err = Generator::new(options.clone()).render_to_string().unwrap_err();
        assert!(matches!(err, GenError::Render { .. }));

        let lenient = options.with_undefined(UndefinedPolicy::Lenient);
        assert_eq!(Generator::new(lenient).render_to_string().unwrap(), "THREAD_SAFE\n");
    }

    #[test]
    fn test_invalid_json_produces_no_output() {
        let temp = tempdir().unwrap();
        let out_dir = temp.path().join("generated");
        let options =
            seed(temp.path(), "{ thread_safe: true }").with_output(OutputTarget::Directory(out_dir.clone()));
        let mut out = Vec::new();

        let err = Generator::new(options).run_into(&mut out).unwrap_err();
        assert!(matches!(err, GenError::Parse { .. }));
        assert!(!out_dir.exists());
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_template() {
        let temp = tempdir().unwrap();
        let mut options = seed(temp.path(), "{}");
        options.language = "kotlin".to_string();

        let err = Generator::new(options).render_to_string().unwrap_err();
        match err {
            GenError::TemplateNotFound { name, .. } => assert_eq!(name, "singleton.kotlin.j2"),
            other => panic!("expected TemplateNotFound, got {:?}", other),
        }
    }
}
