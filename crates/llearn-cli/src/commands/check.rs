//! The `llearn check` command.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use llearn_core::catalog::Catalog;
use llearn_core::model::LessonKey;
use llearn_core::session::{ExerciseSession, NoopObserver};
use llearn_core::validation::ValidationOutcome;

use crate::{OutputFormat, SourceArgs};

/// JSON shape of a check result.
#[derive(Serialize)]
struct CheckReport<'a> {
    lesson: &'a LessonKey,
    #[serde(flatten)]
    outcome: &'a ValidationOutcome,
    next_lesson: Option<LessonKey>,
}

pub fn execute(
    lesson: String,
    input: PathBuf,
    format: OutputFormat,
    fail_on_unmet: bool,
    source: SourceArgs,
) -> Result<()> {
    let (config, catalog) = super::load_sources(source)?;
    let key: LessonKey = lesson.parse()?;
    let (module, lesson) = catalog.resolve(&key.module, &key.lesson)?;

    let text = read_input(&input)?;
    let mut store = config.progress_store();
    let mut session = ExerciseSession::with_config(&module.slug, lesson, config.session_config());
    session.edit(text);

    let outcome = session
        .check(&mut store, &NoopObserver)
        .context("session was already passed")?
        .clone();

    let next = next_lesson(&catalog, &key);

    match format {
        OutputFormat::Json => {
            let report = CheckReport {
                lesson: &key,
                outcome: &outcome,
                next_lesson: next,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "Checking {} ({} rule{})\n",
                key,
                outcome.len(),
                if outcome.len() == 1 { "" } else { "s" }
            );
            print_outcome(&outcome);
            if outcome.overall_passed {
                println!("\nLesson complete!");
                print_next_lesson(next.as_ref());
            }
        }
    }

    if fail_on_unmet && !outcome.overall_passed {
        std::process::exit(1);
    }

    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read submission from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read submission: {}", input.display()))
    }
}

/// Print one line per rule in authoring order, then a tally.
pub fn print_outcome(outcome: &ValidationOutcome) {
    for result in &outcome.results {
        let mark = if result.passed { "✓" } else { "✗" };
        println!("  {mark} {}", result.rule.message);
    }
    println!("\n{}/{} rules met.", outcome.passed_count(), outcome.len());
}

pub fn next_lesson(catalog: &Catalog, key: &LessonKey) -> Option<LessonKey> {
    catalog
        .adjacent_lessons(&key.module, &key.lesson)
        .next
        .map(|l| LessonKey::new(key.module.as_str(), l.slug.as_str()))
}

pub fn print_next_lesson(next: Option<&LessonKey>) {
    match next {
        Some(next) => println!("Next lesson: llearn practice --lesson {next}"),
        None => println!("That was the last lesson in this module."),
    }
}
