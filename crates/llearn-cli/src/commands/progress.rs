//! The `llearn progress` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use llearn_core::error::ContentError;
use llearn_core::progress::ProgressStore;

use crate::SourceArgs;

pub fn execute(module_filter: Option<String>, source: SourceArgs) -> Result<()> {
    let (config, catalog) = super::load_sources(source)?;
    let store = config.progress_store();

    if let Some(slug) = module_filter {
        let module = catalog
            .module(&slug)
            .ok_or_else(|| ContentError::ModuleNotFound(slug.clone()))?;

        let mut table = Table::new();
        table.set_header(vec!["#", "Lesson", "Status", "Completed at"]);
        for lesson in &module.lessons {
            let progress = store.lesson_progress(&module.slug, &lesson.slug);
            table.add_row(vec![
                Cell::new(lesson.order),
                Cell::new(&lesson.title),
                Cell::new(if progress.completed { "✓ done" } else { "" }),
                Cell::new(
                    progress
                        .last_attempt
                        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_default(),
                ),
            ]);
        }

        println!("{}", module.title);
        println!("{table}");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Module", "Completed", "Total", "%"]);

    for module in catalog.modules().iter().filter(|m| !m.coming_soon) {
        let Some(completion) = catalog.module_completion(&module.slug, &store) else {
            continue;
        };
        let pct = if completion.total == 0 {
            0.0
        } else {
            completion.completed as f64 / completion.total as f64 * 100.0
        };
        table.add_row(vec![
            Cell::new(&module.title),
            Cell::new(completion.completed),
            Cell::new(completion.total),
            Cell::new(format!("{pct:.0}%")),
        ]);
    }

    println!("{table}");
    Ok(())
}
