//! Task generation through a hosted text-completion model.
//!
//! The rest of the crate sees generation as a single fallible call:
//! a prompt goes in and a list of task texts comes out. Replies are plain
//! newline-separated text; [`parse_generated_tasks`] turns them into tasks.

use crate::error::AppError;

mod gemini;

pub use gemini::GeminiGenerator;

pub const TODO_LIST_INSTRUCTION: &str = "\
You are an AI assistant that provides a to-do list with unnumbered, actionable items.
Each item should be a concise, actionable task without special characters.
The tasks should be relevant to the user's current goals and priorities.
Each task should have an objective, measurable result unless it is a general task.
Some tasks may need a number, like do plank 30s or situps 5 times; add a numeric objective to tasks like that.
Be creative in your task generation.

Here's an example format: Jog for 30 minutes, Read 20 pages of a book, Prepare a healthy lunch, \
Respond to 5 pending emails, Meditate for 10 minutes, Do leetcode easy 2 times and so on.";

pub trait TaskGenerator {
    fn generate(&self, prompt: &str) -> Result<Vec<String>, AppError>;
}

/// One task per non-blank line, with a leading `12.` style ordinal removed.
pub fn parse_generated_tasks(reply: &str) -> Vec<String> {
    reply
        .split('\n')
        .map(|line| strip_ordinal(line).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_ordinal(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|ch: char| ch.is_ascii_digit()).len();
    if digits == 0 {
        return line;
    }

    match line[digits..].strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_generated_tasks;

    #[test]
    fn strips_ordinals_and_blank_lines() {
        let reply = "1. Jog for 30 minutes\n\n2.Read 20 pages\r\n10.   Meditate\n   \n";
        assert_eq!(
            parse_generated_tasks(reply),
            ["Jog for 30 minutes", "Read 20 pages", "Meditate"]
        );
    }

    #[test]
    fn keeps_numbers_that_are_not_ordinals() {
        let reply = "30 push-ups\n2024 budget review\nDo plank 30s";
        assert_eq!(
            parse_generated_tasks(reply),
            ["30 push-ups", "2024 budget review", "Do plank 30s"]
        );
    }

    #[test]
    fn only_a_leading_ordinal_is_removed() {
        assert_eq!(parse_generated_tasks("1. 2. Nested"), ["2. Nested"]);
        assert_eq!(parse_generated_tasks("  3. Indented"), ["3. Indented"]);
    }

    #[test]
    fn empty_reply_yields_nothing() {
        assert!(parse_generated_tasks("").is_empty());
        assert!(parse_generated_tasks("1.\n2. \n").is_empty());
    }
}
