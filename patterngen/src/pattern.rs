//! Pattern tree layout
//!
//! Every pattern lives in its own directory under the patterns root:
//!
//! ```text
//! patterns/
//! └── {category}/
//!     └── {pattern}/
//!         ├── configurations/
//!         │   └── {pattern}.json
//!         └── templates/
//!             ├── {pattern}.swift.j2
//!             └── {pattern}.{language}.hbs
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GenError, Result};
use crate::render::TemplateEngine;

/// Directory holding a pattern's JSON configurations
pub const CONFIGURATIONS_DIR: &str = "configurations";

/// Directory holding a pattern's templates
pub const TEMPLATES_DIR: &str = "templates";

/// Well-known pattern categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Creational,
    Structural,
    Behavioral,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Creational, Category::Structural, Category::Behavioral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creational => "creational",
            Self::Structural => "structural",
            Self::Behavioral => "behavioral",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies a design pattern by category and name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternSelector {
    category: String,
    name: String,
}

impl PatternSelector {
    /// Create a selector, rejecting values that are not a single path component
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let category = category.into();
        let name = name.into();
        validate_component(&category)?;
        validate_component(&name)?;
        Ok(Self { category, name })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<root>/<category>/<pattern>`
    pub fn pattern_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.category).join(&self.name)
    }

    /// `<root>/<category>/<pattern>/configurations/<pattern>.json`
    pub fn configuration_path(&self, root: &Path) -> PathBuf {
        self.pattern_dir(root)
            .join(CONFIGURATIONS_DIR)
            .join(format!("{}.json", self.name))
    }

    /// `<root>/<category>/<pattern>/templates`
    pub fn template_dir(&self, root: &Path) -> PathBuf {
        self.pattern_dir(root).join(TEMPLATES_DIR)
    }

    /// `<pattern>.<language>.<ext>`
    pub fn template_name(&self, language: &str, engine: TemplateEngine) -> String {
        format!("{}.{}.{}", self.name, language, engine.extension())
    }
}

impl fmt::Display for PatternSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

fn validate_component(value: &str) -> Result<()> {
    let reason = if value.is_empty() {
        "must not be empty"
    } else if value == "." || value == ".." {
        "must not be a relative directory"
    } else if value.contains(['/', '\\']) {
        "must not contain path separators"
    } else {
        return Ok(());
    };

    Err(GenError::InvalidSelector {
        value: value.to_string(),
        reason: reason.to_string(),
    })
}

/// A template file name and the directory it is looked up in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateReference {
    pub name: String,
    pub dir: PathBuf,
}

impl TemplateReference {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    /// Resolve the template for a pattern and target language
    ///
    /// Prefers `<pattern>.<language>.j2`, falling back to a Handlebars
    /// template when only that exists. When neither exists the Jinja name is
    /// returned and the renderer reports it as missing.
    pub fn resolve(root: &Path, selector: &PatternSelector, language: &str) -> Self {
        let dir = selector.template_dir(root);
        let jinja = selector.template_name(language, TemplateEngine::Jinja);
        if !dir.join(&jinja).is_file() {
            let hbs = selector.template_name(language, TemplateEngine::Handlebars);
            if dir.join(&hbs).is_file() {
                debug!(template = %hbs, "TemplateReference::resolve: using handlebars template");
                return Self::new(hbs, dir);
            }
        }
        Self::new(jinja, dir)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn engine(&self) -> TemplateEngine {
        TemplateEngine::from_template_name(&self.name)
    }

    /// Name of the generated file: the template name without its engine extension
    pub fn output_name(&self) -> &str {
        self.engine().strip_extension(&self.name)
    }
}

/// A pattern found on disk along with the languages it has templates for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub selector: PatternSelector,
    pub languages: Vec<String>,
}

/// Enumerate the patterns available under `root`
///
/// A directory counts as a pattern when it has a `configurations/<pattern>.json`.
pub fn list_patterns(root: &Path) -> Result<Vec<PatternEntry>> {
    debug!(root = %root.display(), "list_patterns: called");
    if !root.is_dir() {
        return Err(GenError::NotFound {
            path: root.to_path_buf(),
        });
    }

    let mut entries = Vec::new();
    for category in sorted_subdirs(root)? {
        for name in sorted_subdirs(&root.join(&category))? {
            let Ok(selector) = PatternSelector::new(category.clone(), name) else {
                continue;
            };
            if !selector.configuration_path(root).is_file() {
                debug!(pattern = %selector, "list_patterns: no configuration, skipping");
                continue;
            }
            let languages = template_languages(&selector, root)?;
            entries.push(PatternEntry { selector, languages });
        }
    }

    debug!(count = entries.len(), "list_patterns: complete");
    Ok(entries)
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| GenError::io(dir, e))? {
        let entry = entry.map_err(|e| GenError::io(dir, e))?;
        if entry.path().is_dir()
            && let Some(name) = entry.file_name().to_str()
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

fn template_languages(selector: &PatternSelector, root: &Path) -> Result<Vec<String>> {
    let dir = selector.template_dir(root);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let prefix = format!("{}.", selector.name());
    let mut languages = Vec::new();
    for entry in fs::read_dir(&dir).map_err(|e| GenError::io(&dir, e))? {
        let entry = entry.map_err(|e| GenError::io(&dir, e))?;
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let Some(rest) = file_name.strip_prefix(&prefix) else {
            continue;
        };
        let engine = TemplateEngine::from_template_name(rest);
        let language = engine.strip_extension(rest);
        if language != rest && !language.is_empty() && !language.contains('.') {
            languages.push(language.to_string());
        }
    }
    languages.sort();
    languages.dedup();
    Ok(languages)
}
