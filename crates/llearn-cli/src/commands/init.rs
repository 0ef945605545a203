//! The `llearn init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create llearn.toml
    if Path::new("llearn.toml").exists() {
        println!("llearn.toml already exists, skipping.");
    } else {
        std::fs::write("llearn.toml", SAMPLE_CONFIG)?;
        println!("Created llearn.toml");
    }

    // Create example module
    std::fs::create_dir_all("content")?;
    let example_path = Path::new("content/example.toml");
    if example_path.exists() {
        println!("content/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_MODULE)?;
        println!("Created content/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: llearn validate");
    println!("  2. Run: llearn list");
    println!("  3. Run: llearn practice --lesson getting-started/be-specific");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# llearn configuration

content_dir = "./content"
data_dir = "./.llearn"

# Checks required before the sample solution can be revealed.
solution_after_attempts = 2
"#;

const EXAMPLE_MODULE: &str = r#"[module]
slug = "getting-started"
title = "Getting Started"
description = "A first exercise to try the practice loop."
icon = "👋"
order = 1

[[lessons]]
slug = "be-specific"
title = "Be Specific"
description = "Turn a vague request into one with an audience and a format."
order = 1

[lessons.content]
explanation = """
Vague prompts get vague answers. Say who the output is for and what shape it should take.
"""
key_principles = [
    "Name the audience",
    "Give a concrete format and length",
]

[lessons.exercise]
instructions = "Rewrite the prompt so it names an audience and asks for a countable format."
starter_text = "Summarize this article."
hints = [
    "Who will read the summary?",
    "Ask for a number of bullet points, sentences, or words.",
]
sample_solution = """
Summarize this article for a non-technical audience in 3 bullet points, each under 20 words, focusing on the business impact.
"""

[[lessons.exercise.rules]]
kind = "min-length"
parameter = 60
message = "Add more detail to your prompt."

[[lessons.exercise.rules]]
kind = "contains"
parameter = "audience"
message = "Say who the audience is."

[[lessons.exercise.rules]]
kind = "regex"
parameter = '''\d+ (bullet|sentence|word)'''
message = "Ask for a countable format, like 3 bullet points."
"#;
