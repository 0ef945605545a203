//! TOML lesson content parser.
//!
//! Loads modules from TOML files and directories, and lints them for
//! authoring mistakes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::Catalog;
use crate::model::{Lesson, Module};
use crate::validation::validate;

/// Intermediate TOML structure for one module file.
#[derive(Debug, Deserialize)]
struct TomlModuleFile {
    module: TomlModuleHeader,
    #[serde(default)]
    lessons: Vec<Lesson>,
}

#[derive(Debug, Deserialize)]
struct TomlModuleHeader {
    slug: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    order: u32,
    #[serde(default)]
    coming_soon: bool,
}

/// Parse a single TOML file into a `Module`.
pub fn parse_module(path: &Path) -> Result<Module> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read content file: {}", path.display()))?;

    parse_module_str(&content, path)
}

/// Parse a TOML string into a `Module` (useful for testing).
pub fn parse_module_str(content: &str, source_path: &Path) -> Result<Module> {
    let parsed: TomlModuleFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.module;
    anyhow::ensure!(
        !header.slug.trim().is_empty(),
        "module slug is empty in {}",
        source_path.display()
    );

    Ok(Module {
        slug: header.slug,
        title: header.title,
        description: header.description,
        icon: header.icon,
        order: header.order,
        coming_soon: header.coming_soon,
        lessons: parsed.lessons,
    })
}

/// Modules loaded from a content location, plus the files that failed.
#[derive(Debug, Default)]
pub struct LoadedContent {
    pub modules: Vec<Module>,
    pub skipped: Vec<SkippedFile>,
}

/// A content file that could not be read or parsed.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Load a single module file or a content directory, collecting files that
/// fail to parse instead of stopping at the first one.
///
/// A single file that fails is an error; in a directory, failures are
/// recorded in [`LoadedContent::skipped`].
pub fn load_content(path: &Path) -> Result<LoadedContent> {
    if path.is_dir() {
        let mut loaded = LoadedContent::default();
        collect_directory(path, &mut loaded)?;
        Ok(loaded)
    } else {
        Ok(LoadedContent {
            modules: vec![parse_module(path)?],
            skipped: Vec::new(),
        })
    }
}

fn collect_directory(dir: &Path, loaded: &mut LoadedContent) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_directory(&path, loaded)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_module(&path) {
                Ok(module) => loaded.modules.push(module),
                Err(e) => loaded.skipped.push(SkippedFile {
                    path,
                    error: format!("{e:#}"),
                }),
            }
        }
    }
    Ok(())
}

/// Recursively load all `.toml` module files from a directory.
///
/// Files that fail to parse are logged and skipped.
pub fn load_content_directory(dir: &Path) -> Result<Vec<Module>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let loaded = load_content(dir)?;
    for skipped in &loaded.skipped {
        tracing::warn!("skipping {}: {}", skipped.path.display(), skipped.error);
    }
    Ok(loaded.modules)
}

/// Load a catalog from a single module file or a content directory.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let modules = if path.is_dir() {
        load_content_directory(path)?
    } else {
        vec![parse_module(path)?]
    };
    Ok(Catalog::new(modules))
}

/// A warning from content linting.
#[derive(Debug, Clone)]
pub struct ContentWarning {
    /// The lesson slug (if applicable).
    pub lesson: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ContentWarning {
    fn lesson(lesson: &Lesson, message: impl Into<String>) -> Self {
        Self {
            lesson: Some(lesson.slug.clone()),
            message: message.into(),
        }
    }
}

/// Lint a module for common authoring issues.
pub fn validate_module(module: &Module) -> Vec<ContentWarning> {
    let mut warnings = Vec::new();

    if !module.coming_soon && module.lessons.is_empty() {
        warnings.push(ContentWarning {
            lesson: None,
            message: "module is published but has no lessons".into(),
        });
    }

    let mut seen_slugs = std::collections::HashSet::new();
    let mut seen_orders = std::collections::HashSet::new();
    for lesson in &module.lessons {
        if !seen_slugs.insert(&lesson.slug) {
            warnings.push(ContentWarning::lesson(
                lesson,
                format!("duplicate lesson slug: {}", lesson.slug),
            ));
        }
        if !seen_orders.insert(lesson.order) {
            warnings.push(ContentWarning::lesson(
                lesson,
                format!("duplicate lesson order: {}", lesson.order),
            ));
        }
    }

    for lesson in &module.lessons {
        let exercise = &lesson.exercise;

        if exercise.rules.is_empty() {
            warnings.push(ContentWarning::lesson(
                lesson,
                "exercise has no rules and passes any submission",
            ));
        }

        for (i, rule) in exercise.rules.iter().enumerate() {
            if let Err(e) = rule.check() {
                warnings.push(ContentWarning::lesson(lesson, format!("rule {}: {e}", i + 1)));
            }
        }

        if exercise.hints.is_empty() {
            warnings.push(ContentWarning::lesson(lesson, "exercise has no hints"));
        }

        if exercise.rules.is_empty() {
            continue;
        }

        if exercise.sample_solution.trim().is_empty() {
            warnings.push(ContentWarning::lesson(lesson, "sample solution is empty"));
        } else {
            let outcome = validate(&exercise.sample_solution, &exercise.rules);
            for result in outcome.unmet() {
                warnings.push(ContentWarning::lesson(
                    lesson,
                    format!(
                        "sample solution fails its own {} rule: {}",
                        result.rule.kind, result.rule.message
                    ),
                ));
            }
        }

        if validate(&exercise.starter_text, &exercise.rules).overall_passed {
            warnings.push(ContentWarning::lesson(
                lesson,
                "starter text already passes every rule",
            ));
        }
    }

    warnings
}
