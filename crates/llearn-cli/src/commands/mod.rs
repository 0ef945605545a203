//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod list;
pub mod practice;
pub mod progress;
pub mod validate;

use anyhow::{Context, Result};

use llearn_core::catalog::Catalog;
use llearn_core::parser::load_catalog;

use crate::config::{load_config_from, LlearnConfig};
use crate::SourceArgs;

/// Load config, then the content catalog it points at.
fn load_sources(source: SourceArgs) -> Result<(LlearnConfig, Catalog)> {
    let config = load_config_from(source.config.as_deref())?;
    let content_path = config.content_path(source.content);
    let catalog = load_catalog(&content_path)
        .with_context(|| format!("failed to load content from {}", content_path.display()))?;
    if catalog.is_empty() {
        tracing::warn!("no modules found in {}", content_path.display());
    }
    Ok((config, catalog))
}
