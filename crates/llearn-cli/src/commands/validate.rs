//! The `llearn validate` command.

use anyhow::{Context, Result};

use llearn_core::catalog::Catalog;
use llearn_core::parser::{load_content, validate_module};

use crate::config::load_config_from;
use crate::SourceArgs;

pub fn execute(source: SourceArgs) -> Result<()> {
    let config = load_config_from(source.config.as_deref())?;
    let content_path = config.content_path(source.content);
    let loaded = load_content(&content_path)
        .with_context(|| format!("failed to load content from {}", content_path.display()))?;

    let catalog = Catalog::new(loaded.modules);
    let mut total_warnings = 0;

    for module in catalog.modules() {
        println!("Module: {} ({} lessons)", module.title, module.lessons.len());

        let warnings = validate_module(module);
        for w in &warnings {
            let prefix = w
                .lesson
                .as_ref()
                .map(|slug| format!("  [{slug}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    for skipped in &loaded.skipped {
        println!("{} ERROR: {}", skipped.path.display(), skipped.error);
    }

    if !loaded.skipped.is_empty() {
        anyhow::bail!(
            "{} content file(s) failed to load, {} warning(s) found",
            loaded.skipped.len(),
            total_warnings
        );
    }

    if total_warnings == 0 {
        println!("All content valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
