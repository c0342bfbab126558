//! The `examforge init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    let path = Path::new("examforge.toml");
    if path.exists() {
        println!("examforge.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG).context("failed to write examforge.toml")?;
        println!("Created examforge.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export OPENAI_API_KEY (or edit examforge.toml)");
    println!("  2. Run: examforge generate --input notes.txt --format all");
    println!("  3. Run: examforge quiz --exam examforge-output/exam-<timestamp>.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examforge configuration

model = "gpt-4o-mini"
temperature = 0.5
max_output_tokens = 10096

# Documents are split at sentence boundaries into chunks of at most this many characters.
max_chunk_chars = 3000

# Hard upper bound is 20.
max_questions = 20

[provider]
api_key = "${OPENAI_API_KEY}"
# base_url = "https://api.openai.com"
# org_id = "org-..."
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use examforge_providers::ExamforgeConfig;

    #[test]
    fn sample_config_parses() {
        let config: ExamforgeConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.max_questions, 20);
        assert_eq!(config.provider.api_key, "${OPENAI_API_KEY}");
    }
}
