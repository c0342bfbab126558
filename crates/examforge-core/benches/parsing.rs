use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examforge_core::parser::parse_questions;

fn bench_parse_questions(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_questions");

    let bare = generate_response(5, "", "");
    let chatty = generate_response(
        20,
        "Sure! Here is the exam you asked for, based on the document:\n\n```json\n",
        "\n```\n\nLet me know if you want more questions.",
    );
    let large = generate_response(200, "", "");
    let no_json = "I am sorry, but I cannot create questions from this content.".repeat(20);

    group.bench_function("5_bare", |b| {
        b.iter(|| parse_questions(black_box(&bare)))
    });

    group.bench_function("20_with_prose", |b| {
        b.iter(|| parse_questions(black_box(&chatty)))
    });

    group.bench_function("200_bare", |b| {
        b.iter(|| parse_questions(black_box(&large)))
    });

    group.bench_function("no_json", |b| {
        b.iter(|| parse_questions(black_box(&no_json)))
    });

    group.finish();
}

fn generate_response(n: usize, preamble: &str, postamble: &str) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| {
            let answer = if i % 3 == 0 {
                r#"["Choice A", "Choice C"]"#.to_string()
            } else {
                r#""Choice B""#.to_string()
            };
            format!(
                r#"{{"question": "Question {i} about the document?", "choices": ["Choice A", "Choice B", "Choice C", "Choice D"], "correct_answer": {answer}, "explanation": "Explanation for question {i}."}}"#
            )
        })
        .collect();
    format!("{preamble}[{}]{postamble}", items.join(",\n"))
}

criterion_group!(benches, bench_parse_questions);
criterion_main!(benches);
