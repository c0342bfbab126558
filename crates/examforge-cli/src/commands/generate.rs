//! The `examforge generate` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use examforge_core::model::ExamSet;
use examforge_report::{write_html, write_markdown, ExportView};

use super::{build_exam, read_document, ConsoleReporter, GenerationArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Json,
    Markdown,
    Html,
}

fn parse_formats(spec: &str) -> Result<Vec<ExportFormat>> {
    if spec.trim() == "all" {
        return Ok(vec![
            ExportFormat::Json,
            ExportFormat::Markdown,
            ExportFormat::Html,
        ]);
    }

    let mut formats = Vec::new();
    for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let format = match name {
            "json" => ExportFormat::Json,
            "markdown" | "md" => ExportFormat::Markdown,
            "html" => ExportFormat::Html,
            other => anyhow::bail!("unknown format: '{other}' (expected json, markdown, html or all)"),
        };
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    anyhow::ensure!(!formats.is_empty(), "at least one output format is required");
    Ok(formats)
}

pub async fn execute(
    input: PathBuf,
    output: PathBuf,
    format: String,
    args: GenerationArgs,
) -> Result<()> {
    let formats = parse_formats(&format)?;
    let config = args.resolve()?;
    let text = read_document(&input)?;

    let exam = build_exam(&text, &config, &ConsoleReporter).await?;

    print_summary(&exam);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    for path in write_exports(&exam, &formats, &output, &timestamp.to_string())? {
        eprintln!("Saved: {}", path.display());
    }

    Ok(())
}

fn write_exports(
    exam: &ExamSet,
    formats: &[ExportFormat],
    output: &Path,
    stem_suffix: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for format in formats {
        match format {
            ExportFormat::Json => {
                let path = output.join(format!("exam-{stem_suffix}.json"));
                exam.save_json(&path)?;
                written.push(path);
            }
            ExportFormat::Markdown => {
                for view in [ExportView::QuestionsOnly, ExportView::WithAnswers] {
                    let path = output.join(format!("exam-{stem_suffix}-{}.md", view.slug()));
                    write_markdown(exam, view, &path)?;
                    written.push(path);
                }
            }
            ExportFormat::Html => {
                for view in [ExportView::QuestionsOnly, ExportView::WithAnswers] {
                    let path = output.join(format!("exam-{stem_suffix}-{}.html", view.slug()));
                    write_html(exam, view, &path)?;
                    written.push(path);
                }
            }
        }
    }
    Ok(written)
}

fn print_summary(exam: &ExamSet) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Type", "Choices"]);

    for (i, question) in exam.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(truncate(&question.prompt, 60)),
            Cell::new(question.selection_mode()),
            Cell::new(question.choices.len()),
        ]);
    }

    eprintln!("\n{table}");
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examforge_core::{AnswerSpec, QuestionRecord};

    #[test]
    fn format_lists() {
        assert_eq!(parse_formats("json").unwrap(), vec![ExportFormat::Json]);
        assert_eq!(
            parse_formats("md, html,json,md").unwrap(),
            vec![ExportFormat::Markdown, ExportFormat::Html, ExportFormat::Json]
        );
        assert_eq!(parse_formats("all").unwrap().len(), 3);
        assert!(parse_formats("pdf").is_err());
        assert!(parse_formats(" , ").is_err());
    }

    #[test]
    fn long_prompts_are_shortened() {
        assert_eq!(truncate("short", 60), "short");
        let long = "x".repeat(80);
        let cut = truncate(&long, 60);
        assert_eq!(cut.chars().count(), 60);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn exports_every_view() {
        let exam = ExamSet::new(vec![QuestionRecord {
            prompt: "Q".into(),
            choices: vec!["a".into(), "b".into()],
            answer_spec: AnswerSpec::Single("a".into()),
            explanation: "because".into(),
        }])
        .unwrap();
        let dir = tempfile::tempdir().unwrap();

        let written = write_exports(
            &exam,
            &[ExportFormat::Json, ExportFormat::Markdown, ExportFormat::Html],
            dir.path(),
            "test",
        )
        .unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "exam-test.json",
                "exam-test-questions.md",
                "exam-test-answers.md",
                "exam-test-questions.html",
                "exam-test-answers.html",
            ]
        );
        assert_eq!(ExamSet::load_json(&written[0]).unwrap(), exam);
    }
}
