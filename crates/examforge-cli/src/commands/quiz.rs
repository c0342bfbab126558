//! The `examforge quiz` command.
//!
//! Questions are asked in order over any line-based reader/writer pair so the
//! loop can run against stdin/stdout or an in-memory script.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use examforge_core::model::{ExamSet, QuestionRecord, Selection, SelectionMode};
use examforge_core::session::{QuizSession, ScoreSummary, SlotStatus};
use examforge_report::{choice_label, labelled_answers};

use super::{build_exam, read_document, ConsoleReporter, GenerationArgs};

pub async fn execute(
    input: Option<PathBuf>,
    exam_path: Option<PathBuf>,
    args: GenerationArgs,
) -> Result<()> {
    let exam = match (exam_path, input) {
        (Some(path), _) => ExamSet::load_json(&path)?,
        (None, Some(input)) => {
            let config = args.resolve()?;
            let text = read_document(&input)?;
            build_exam(&text, &config, &ConsoleReporter).await?
        }
        (None, None) => anyhow::bail!("either --input or --exam is required"),
    };
    anyhow::ensure!(!exam.is_empty(), "the exam has no questions");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_quiz(Arc::new(exam), stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Ask every question once and print the final score.
///
/// End of input stops the quiz early; the score so far is still reported.
pub fn run_quiz<R: BufRead, W: Write>(
    exam: Arc<ExamSet>,
    mut input: R,
    mut out: W,
) -> Result<ScoreSummary> {
    let mut session = QuizSession::new(exam);
    let total = session.len();
    let mut line = String::new();

    'questions: while let Some(index) = session.next_unanswered() {
        let Some(question) = session.question(index).cloned() else {
            break;
        };
        print_question(&mut out, index, total, &question)?;

        loop {
            write!(out, "Your answer: ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line).context("failed to read answer")? == 0 {
                writeln!(out, "\n\nQuiz ended early.")?;
                break 'questions;
            }

            let selection = match parse_answer(&question, &line) {
                Ok(selection) => selection,
                Err(message) => {
                    writeln!(out, "{message}")?;
                    continue;
                }
            };

            match session.submit(index, selection) {
                Ok(feedback) => {
                    if feedback.correct {
                        writeln!(out, "Correct!")?;
                    } else {
                        writeln!(
                            out,
                            "Incorrect. Correct answer: {}",
                            labelled_answers(&question).join(", ")
                        )?;
                    }
                    if !feedback.explanation.trim().is_empty() {
                        writeln!(out, "Explanation: {}", feedback.explanation.trim())?;
                    }
                    writeln!(out)?;
                    break;
                }
                Err(e) => writeln!(out, "{e}")?,
            }
        }
    }

    let summary = session.summary();
    print_results(&mut out, &session)?;
    tracing::info!(
        score = summary.score,
        total = summary.total,
        answered = session.answered_count(),
        "quiz finished"
    );
    Ok(summary)
}

fn print_question<W: Write>(
    out: &mut W,
    index: usize,
    total: usize,
    question: &QuestionRecord,
) -> Result<()> {
    writeln!(out, "Question {}/{}: {}", index + 1, total, question.prompt.trim())?;
    writeln!(out, "({})", question.selection_mode().hint())?;
    for (i, choice) in question.choices.iter().enumerate() {
        writeln!(out, "  {}. {}", choice_label(i), choice)?;
    }
    Ok(())
}

/// Turn a typed answer like `b` or `a, c` into a selection.
///
/// Letters and 1-based numbers are both accepted.
fn parse_answer(question: &QuestionRecord, line: &str) -> Result<Selection, String> {
    let tokens: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err("Please enter an answer.".into());
    }

    let mut picked = Vec::with_capacity(tokens.len());
    for token in tokens {
        let index = choice_index(token)
            .filter(|&i| i < question.choices.len())
            .ok_or_else(|| format!("No choice labelled '{token}'."))?;
        picked.push(question.choices[index].clone());
    }

    match question.selection_mode() {
        SelectionMode::Single => {
            if picked.len() != 1 {
                return Err("Select exactly one choice.".into());
            }
            Ok(Selection::Single(picked.remove(0)))
        }
        SelectionMode::Multiple => Ok(Selection::multiple(picked)),
    }
}

fn choice_index(token: &str) -> Option<usize> {
    if let Ok(number) = token.parse::<usize>() {
        return number.checked_sub(1);
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

fn print_results<W: Write>(out: &mut W, session: &QuizSession) -> Result<()> {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Result", "Your answer"]);

    for (i, slot) in session.slots().iter().enumerate() {
        let result = match slot.status() {
            SlotStatus::Correct => "correct",
            SlotStatus::Incorrect => "incorrect",
            SlotStatus::Unanswered => "unanswered",
        };
        let answer = slot
            .submitted()
            .map(|s| s.choices().join(", "))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![Cell::new(i + 1), Cell::new(result), Cell::new(answer)]);
    }

    let summary = session.summary();
    writeln!(out, "{table}")?;
    writeln!(
        out,
        "Score: {}/{} ({:.0}%)",
        summary.score,
        summary.total,
        summary.percentage()
    )?;
    Ok(())
}
