//! The `llearn practice` command: an exercise session over stdin.
//!
//! Plain lines are appended to the submission buffer. Lines starting with
//! `:` are commands.

use std::io::BufRead;

use anyhow::Result;

use llearn_core::model::LessonKey;
use llearn_core::session::{ExerciseSession, SessionObserver, SessionState};
use llearn_core::validation::ValidationOutcome;

use super::check::{next_lesson, print_next_lesson, print_outcome};
use crate::SourceArgs;

/// One line of learner input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Check,
    Hint,
    Solution,
    Show,
    Clear,
    Status,
    Help,
    Quit,
    Unknown(String),
    Text(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Input::Text(line.to_string());
    };
    match command.trim() {
        "check" | "c" => Input::Check,
        "hint" | "h" => Input::Hint,
        "solution" | "s" => Input::Solution,
        "show" => Input::Show,
        "clear" => Input::Clear,
        "status" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

/// Prints session events as they happen.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_checked(&self, outcome: &ValidationOutcome, attempt: u32) {
        println!("Attempt {attempt}:");
        print_outcome(outcome);
    }

    fn on_completed(&self, lesson: &LessonKey) {
        println!("\nExercise complete! {lesson} is marked as done.");
        println!("You can move on or keep refining your prompt.");
    }
}

const HELP: &str = "\
Type your prompt; each line is appended to the buffer.
Commands:
  :check     check the buffer against the exercise rules
  :hint      reveal the next hint
  :solution  reveal the sample solution (after enough attempts)
  :show      print the current buffer
  :clear     empty the buffer
  :status    show attempts, hints, and state
  :quit      end the session";

pub fn execute(lesson: String, source: SourceArgs) -> Result<()> {
    let (config, catalog) = super::load_sources(source)?;
    let key: LessonKey = lesson.parse()?;
    let (module, lesson) = catalog.resolve(&key.module, &key.lesson)?;

    let mut store = config.progress_store();
    let mut session = ExerciseSession::with_config(&module.slug, lesson, config.session_config());

    println!("{} :: {}", module.title, lesson.title);
    if !lesson.description.is_empty() {
        println!("{}", lesson.description);
    }
    println!("\n{}\n", lesson.exercise.instructions.trim());
    if !session.text().is_empty() {
        println!("Starting from:\n{}\n", session.text());
    }
    println!("{HELP}\n");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_input(&line) {
            Input::Text(text) => {
                let mut buffer = session.text().to_string();
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&text);
                session.edit(buffer);
            }
            Input::Check => {
                if session.check(&mut store, &ConsoleObserver).is_none() {
                    println!("Already passed. Keep refining or :quit.");
                } else if session.is_passed() {
                    print_next_lesson(next_lesson(&catalog, &key).as_ref());
                }
            }
            Input::Hint => {
                let total = session.exercise().hints.len();
                match session.reveal_hint() {
                    Some(hint) => {
                        let hint = hint.to_string();
                        println!("Hint {}/{}: {hint}", session.hints_revealed(), total);
                    }
                    None if total == 0 => println!("This exercise has no hints."),
                    None => println!("No more hints."),
                }
            }
            Input::Solution => {
                let attempts = session.attempts();
                let needed = config.session_config().solution_threshold();
                match session.reveal_solution() {
                    Some(solution) => println!("Sample solution:\n{}", solution.trim()),
                    None => println!(
                        "The sample solution unlocks after {needed} attempts ({attempts} so far)."
                    ),
                }
            }
            Input::Show => println!("{}", session.text()),
            Input::Clear => {
                session.edit(String::new());
                println!("Buffer cleared.");
            }
            Input::Status => print_status(&session),
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Unknown(cmd) => println!("Unknown command ':{cmd}'. Type :help for commands."),
        }
    }

    println!(
        "Session ended after {} attempt(s){}.",
        session.attempts(),
        if session.is_passed() { ", passed" } else { "" }
    );

    Ok(())
}

fn print_status(session: &ExerciseSession<'_>) {
    let state = match session.state() {
        SessionState::Editing => "editing",
        SessionState::Checked => "checked",
        SessionState::Passed => "passed",
    };
    println!(
        "State: {state} | attempts: {} | hints: {}/{} | solution: {}",
        session.attempts(),
        session.hints_revealed(),
        session.exercise().hints.len(),
        if session.solution_revealed() {
            "revealed"
        } else if session.can_reveal_solution() {
            "available"
        } else {
            "locked"
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_text() {
        assert_eq!(parse_input(":check"), Input::Check);
        assert_eq!(parse_input("  :hint "), Input::Hint);
        assert_eq!(parse_input(":s"), Input::Solution);
        assert_eq!(parse_input(":q"), Input::Quit);
        assert_eq!(parse_input(":dance"), Input::Unknown("dance".into()));
        assert_eq!(
            parse_input("Write for developers."),
            Input::Text("Write for developers.".into())
        );
        assert_eq!(parse_input(""), Input::Text(String::new()));
    }
}
