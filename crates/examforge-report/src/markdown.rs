//! Markdown exam export.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use examforge_core::ExamSet;

use crate::{choice_label, labelled_answers, ExportView};

/// Render `exam` as a Markdown document.
pub fn generate_markdown(exam: &ExamSet, view: ExportView) -> String {
    let mut md = String::new();

    let title = if view.shows_answers() {
        "Exam answer key"
    } else {
        "Exam"
    };
    let _ = writeln!(md, "# {title}\n");
    let _ = writeln!(
        md,
        "_{} questions | generated {}_\n",
        exam.len(),
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );

    for (i, question) in exam.iter().enumerate() {
        let _ = writeln!(md, "## {}. {}\n", i + 1, question.prompt.trim());
        let _ = writeln!(md, "*{}*\n", capitalize(question.selection_mode().hint()));

        for (c, choice) in question.choices.iter().enumerate() {
            let _ = writeln!(md, "- **{}.** {}", choice_label(c), choice);
        }
        md.push('\n');

        if view.shows_answers() {
            let _ = writeln!(md, "**Answer:** {}\n", labelled_answers(question).join(", "));
            if !question.explanation.trim().is_empty() {
                let _ = writeln!(md, "> {}\n", question.explanation.trim());
            }
        }
    }

    md
}

/// Write a Markdown export to a file, creating parent directories.
pub fn write_markdown(exam: &ExamSet, view: ExportView, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, generate_markdown(exam, view))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examforge_core::{AnswerSpec, QuestionRecord};

    fn make_exam() -> ExamSet {
        ExamSet::new(vec![
            QuestionRecord {
                prompt: "What is the powerhouse of the cell?".into(),
                choices: vec!["Nucleus".into(), "Mitochondria".into(), "Ribosome".into()],
                answer_spec: AnswerSpec::Single("Mitochondria".into()),
                explanation: "Mitochondria produce ATP.".into(),
            },
            QuestionRecord {
                prompt: "Which are prime?".into(),
                choices: vec!["2".into(), "4".into(), "5".into()],
                answer_spec: AnswerSpec::Multiple(["2".to_string(), "5".to_string()].into()),
                explanation: "4 is 2 * 2.".into(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn questions_only_hides_answers() {
        let md = generate_markdown(&make_exam(), ExportView::QuestionsOnly);
        assert!(md.starts_with("# Exam\n"));
        assert!(md.contains("## 1. What is the powerhouse of the cell?"));
        assert!(md.contains("- **B.** Mitochondria"));
        assert!(md.contains("*Select one*"));
        assert!(md.contains("*Select all that apply*"));
        assert!(!md.contains("**Answer:**"));
        assert!(!md.contains("produce ATP"));
    }

    #[test]
    fn with_answers_shows_key_and_explanation() {
        let md = generate_markdown(&make_exam(), ExportView::WithAnswers);
        assert!(md.starts_with("# Exam answer key"));
        assert!(md.contains("**Answer:** B. Mitochondria"));
        assert!(md.contains("**Answer:** A. 2, C. 5"));
        assert!(md.contains("> Mitochondria produce ATP."));
    }

    #[test]
    fn write_to_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("exam.md");
        write_markdown(&make_exam(), ExportView::QuestionsOnly, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("2 questions"));
    }
}
