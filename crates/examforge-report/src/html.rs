//! HTML exam export.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use examforge_core::{ExamSet, QuestionRecord};

use crate::{choice_label, ExportView};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML document for `exam`.
pub fn generate_html(exam: &ExamSet, view: ExportView) -> String {
    let title = if view.shows_answers() {
        "Exam answer key"
    } else {
        "Exam"
    };
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>examforge | {title}</title>\n"));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{title}</h1>\n"));
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | generated {}</p>\n",
        exam.len(),
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<ol class=\"questions\">\n");
    for question in exam {
        html.push_str(&question_item(question, view));
    }
    html.push_str("</ol>\n");

    if view.shows_answers() {
        html.push_str("<section class=\"raw-data\">\n");
        html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
        html.push_str("<pre><code>");
        html.push_str(&html_escape(
            &serde_json::to_string_pretty(exam).unwrap_or_default(),
        ));
        html.push_str("</code></pre>\n");
        html.push_str("</details>\n</section>\n");
    }

    html.push_str("</body>\n</html>");
    html
}

fn question_item(question: &QuestionRecord, view: ExportView) -> String {
    let mut item = String::new();
    item.push_str("<li class=\"question\">\n");
    item.push_str(&format!("<p class=\"prompt\">{}</p>\n", html_escape(&question.prompt)));
    item.push_str(&format!(
        "<p class=\"hint\">{}</p>\n",
        question.selection_mode().hint()
    ));

    item.push_str("<ul class=\"choices\">\n");
    for (i, choice) in question.choices.iter().enumerate() {
        let correct = view.shows_answers() && question.answer_spec.choices().contains(&choice.as_str());
        item.push_str(&format!(
            "<li{}><span class=\"label\">{}.</span> {}</li>\n",
            if correct { " class=\"correct\"" } else { "" },
            choice_label(i),
            html_escape(choice)
        ));
    }
    item.push_str("</ul>\n");

    if view.shows_answers() && !question.explanation.trim().is_empty() {
        item.push_str(&format!(
            "<p class=\"explanation\">{}</p>\n",
            html_escape(&question.explanation)
        ));
    }

    item.push_str("</li>\n");
    item
}

/// Write an HTML export to a file, creating parent directories.
pub fn write_html(exam: &ExamSet, view: ExportView, path: &Path) -> Result<()> {
    let html = generate_html(exam, view);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --muted: #6b7280; --border: #e5e7eb; --correct: #dcfce7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --correct: #064e3b; }
}
@media print { .raw-data { display: none; } }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 50rem; padding: 2rem; background: var(--bg); color: var(--fg); }
.meta, .hint { color: var(--muted); }
.hint { font-style: italic; margin: 0.25rem 0; }
.question { margin: 1.5rem 0; break-inside: avoid; }
.prompt { font-weight: bold; margin: 0; }
.choices { list-style: none; padding-left: 1rem; }
.choices li { padding: 0.2rem 0.5rem; border-radius: 4px; }
.label { font-weight: bold; margin-right: 0.25rem; }
.correct { background: var(--correct); }
.explanation { border-left: 3px solid var(--border); padding-left: 0.75rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use examforge_core::AnswerSpec;

    fn make_exam() -> ExamSet {
        ExamSet::new(vec![QuestionRecord {
            prompt: "Is 1 < 2 & 3 > 2?".into(),
            choices: vec!["Yes".into(), "No".into()],
            answer_spec: AnswerSpec::Single("Yes".into()),
            explanation: "Both comparisons hold.".into(),
        }])
        .unwrap()
    }

    #[test]
    fn html_export_contains_required_elements() {
        let html = generate_html(&make_exam(), ExportView::QuestionsOnly);
        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Is 1 &lt; 2 &amp; 3 &gt; 2?"));
        assert!(html.contains("<span class=\"label\">B.</span> No"));
        assert!(html.contains("select one"));
        assert!(!html.contains("class=\"correct\""));
        assert!(!html.contains("Both comparisons hold."));
        assert!(!html.contains("Raw JSON Data"));
    }

    #[test]
    fn answer_key_marks_correct_choice() {
        let html = generate_html(&make_exam(), ExportView::WithAnswers);
        assert!(html.contains("<li class=\"correct\"><span class=\"label\">A.</span> Yes</li>"));
        assert!(html.contains("Both comparisons hold."));
        assert!(html.contains("Raw JSON Data"));
        assert!(html.contains("&quot;correct_answer&quot;"));
    }

    #[test]
    fn html_export_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam.html");

        write_html(&make_exam(), ExportView::WithAnswers, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
