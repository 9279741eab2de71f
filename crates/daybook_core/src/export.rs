use crate::model::Task;

const COMPLETED_SUFFIX: &str = " (Completed)";

fn completed_suffix(task: &Task) -> &'static str {
    if task.completed { COMPLETED_SUFFIX } else { "" }
}

/// `1. text`, one task per line, numbered from one.
pub fn to_plain_text(tasks: &[Task]) -> String {
    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| format!("{}. {}{}", index + 1, task.text, completed_suffix(task)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn to_html(tasks: &[Task]) -> String {
    let items = tasks
        .iter()
        .map(|task| {
            format!(
                "  <li>{}{}</li>",
                escape_html(&task.text),
                completed_suffix(task)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("<ol>\n{items}\n</ol>")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
