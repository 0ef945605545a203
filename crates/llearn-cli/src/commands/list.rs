//! The `llearn list` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use llearn_core::progress::ProgressStore;

use crate::SourceArgs;

pub fn execute(source: SourceArgs) -> Result<()> {
    let (config, catalog) = super::load_sources(source)?;
    let store = config.progress_store();

    if catalog.is_empty() {
        println!("No modules found. Run `llearn init` to create example content.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Module", "#", "Lesson", "Title", "Status"]);

    for module in catalog.modules() {
        if module.coming_soon {
            table.add_row(vec![
                Cell::new(format!("{} {}", module.icon, module.title).trim()),
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
                Cell::new("coming soon"),
            ]);
            continue;
        }

        for lesson in &module.lessons {
            let status = if store.is_lesson_complete(&module.slug, &lesson.slug) {
                "✓ done"
            } else {
                ""
            };
            table.add_row(vec![
                Cell::new(&module.slug),
                Cell::new(lesson.order),
                Cell::new(&lesson.slug),
                Cell::new(&lesson.title),
                Cell::new(status),
            ]);
        }
    }

    println!("{table}");
    Ok(())
}
