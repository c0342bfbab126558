//! examforge-report: printable exports of a generated exam.
//!
//! Two renderings are supported, Markdown and self-contained HTML, each in a
//! questions-only view (for handing out) and a with-answers view (the key).

pub mod html;
pub mod markdown;

pub use html::{generate_html, write_html};
pub use markdown::{generate_markdown, write_markdown};

use examforge_core::QuestionRecord;

/// Which parts of each question an export shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportView {
    /// Prompt, choices and the selection hint.
    QuestionsOnly,
    /// Everything above plus the correct answer(s) and the explanation.
    WithAnswers,
}

impl ExportView {
    /// Short name used in file names.
    pub fn slug(&self) -> &'static str {
        match self {
            ExportView::QuestionsOnly => "questions",
            ExportView::WithAnswers => "answers",
        }
    }

    pub fn shows_answers(&self) -> bool {
        matches!(self, ExportView::WithAnswers)
    }
}

/// Letter shown in front of the choice at `index` ("A", "B", ...).
///
/// Past the alphabet the label falls back to the 1-based number.
pub fn choice_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

/// The correct choices of `question`, labelled as they are presented.
pub fn labelled_answers(question: &QuestionRecord) -> Vec<String> {
    question
        .choices
        .iter()
        .enumerate()
        .filter(|(_, choice)| question.answer_spec.choices().contains(&choice.as_str()))
        .map(|(i, choice)| format!("{}. {}", choice_label(i), choice))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use examforge_core::AnswerSpec;

    #[test]
    fn labels_are_letters_then_numbers() {
        assert_eq!(choice_label(0), "A");
        assert_eq!(choice_label(25), "Z");
        assert_eq!(choice_label(26), "27");
    }

    #[test]
    fn answers_follow_choice_order() {
        let question = QuestionRecord {
            prompt: "Which are even?".into(),
            choices: vec!["4".into(), "3".into(), "2".into()],
            answer_spec: AnswerSpec::Multiple(["2".to_string(), "4".to_string()].into()),
            explanation: String::new(),
        };
        assert_eq!(labelled_answers(&question), vec!["A. 4", "C. 2"]);
    }
}
