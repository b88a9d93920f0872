//! Feature configuration loading
//!
//! A configuration is the JSON object of feature selections a template is
//! rendered against. It is loaded verbatim; no schema is applied.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{GenError, Result};
use crate::pattern::PatternSelector;

/// Key the configuration is bound to inside the render context
pub const FEATURES_KEY: &str = "features";

/// Feature name to feature value mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    pub fn new(features: Map<String, Value>) -> Self {
        Self(features)
    }

    /// Parse JSON text; `path` is only used for error reporting
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| GenError::Parse {
            path: path.to_path_buf(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?;

        match value {
            Value::Object(features) => Ok(Self(features)),
            other => Err(GenError::Parse {
                path: path.to_path_buf(),
                line: 1,
                column: 1,
                message: format!("expected a JSON object of features, found {}", json_type(&other)),
            }),
        }
    }

    pub fn get(&self, feature: &str) -> Option<&Value> {
        self.0.get(feature)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.0.contains_key(feature)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn features(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Load `<root>/<category>/<pattern>/configurations/<pattern>.json`
pub fn load_configuration(root: &Path, selector: &PatternSelector) -> Result<Configuration> {
    let path = selector.configuration_path(root);
    debug!(pattern = %selector, path = %path.display(), "load_configuration: resolved path");
    load_configuration_file(&path)
}

/// Load a configuration from an explicit file
pub fn load_configuration_file(path: &Path) -> Result<Configuration> {
    if !path.is_file() {
        return Err(GenError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
    let configuration = Configuration::parse(&text, path)?;
    debug!(
        path = %path.display(),
        features = configuration.len(),
        "load_configuration_file: parsed"
    );
    Ok(configuration)
}

/// Context handed to the template engine: `{"features": <configuration>}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderContext {
    pub features: Configuration,
}

impl RenderContext {
    pub fn new(features: Configuration) -> Self {
        Self { features }
    }

    /// Look up a dotted path such as `features.logging.level`
    ///
    /// Array elements are addressed by index (`features.targets.0`).
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        if parts.next()? != FEATURES_KEY {
            return None;
        }

        let first = parts.next()?;
        let mut current = self.features.get(first)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(FEATURES_KEY.to_string(), Value::Object(self.features.0.clone()));
        Value::Object(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_configuration(root: &Path, selector: &PatternSelector, text: &str) {
        let path = selector.configuration_path(root);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_load_configuration() {
        let temp = tempdir().unwrap();
        let selector = PatternSelector::new("creational", "singleton").unwrap();
        write_configuration(
            temp.path(),
            &selector,
            r#"{"thread_safe": true, "lazy_init": false, "class_name": "Logger"}"#,
        );

        let configuration = load_configuration(temp.path(), &selector).unwrap();
        assert_eq!(configuration.len(), 3);
        assert_eq!(configuration.get("thread_safe"), Some(&json!(true)));
        assert_eq!(configuration.get("class_name"), Some(&json!("Logger")));
        assert!(!configuration.contains("double_checked"));
    }

    #[test]
    fn test_load_configuration_missing() {
        let temp = tempdir().unwrap();
        let selector = PatternSelector::new("creational", "singleton").unwrap();

        let err = load_configuration(temp.path(), &selector).unwrap_err();
        match err {
            GenError::NotFound { path } => {
                assert!(path.ends_with("creational/singleton/configurations/singleton.json"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_configuration_invalid_json() {
        let temp = tempdir().unwrap();
        let selector = PatternSelector::new("behavioral", "observer").unwrap();
        write_configuration(temp.path(), &selector, "{\n  \"push_model\": true,\n}");

        let err = load_configuration(temp.path(), &selector).unwrap_err();
        match err {
            GenError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = Configuration::parse("[true, false]", Path::new("list.json")).unwrap_err();
        assert!(err.to_string().contains("found an array"));
    }

    #[test]
    fn test_parse_nested_values() {
        let configuration = Configuration::parse(
            r#"{"observers": {"weak_refs": true, "max": 8}, "events": ["start", "stop"]}"#,
            Path::new("observer.json"),
        )
        .unwrap();
        let context = RenderContext::new(configuration);

        assert_eq!(context.lookup("features.observers.weak_refs"), Some(&json!(true)));
        assert_eq!(context.lookup("features.events.1"), Some(&json!("stop")));
        assert_eq!(context.lookup("features.events.7"), None);
        assert_eq!(context.lookup("features.missing"), None);
        assert_eq!(context.lookup("observers.max"), None);
    }

    #[test]
    fn test_render_context_serializes_under_features() {
        let configuration = Configuration::parse(r#"{"lazy_init": true}"#, Path::new("s.json")).unwrap();
        let context = RenderContext::new(configuration);

        let expected = json!({"features": {"lazy_init": true}});
        assert_eq!(serde_json::to_value(&context).unwrap(), expected);
        assert_eq!(context.to_value(), expected);
    }
}
