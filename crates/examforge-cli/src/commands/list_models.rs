//! The `examforge list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use examforge_core::model::Model;
use examforge_core::traits::LlmProvider;
use examforge_providers::config::load_config_from;
use examforge_providers::OpenAiProvider;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let config = load_config_from(config_path.as_deref())?;

    // Listing needs no request, so a missing key is fine here.
    let provider = OpenAiProvider::new(
        &config.provider.api_key,
        config.provider.base_url.clone(),
        config.provider.org_id.clone(),
    );

    let mut table = Table::new();
    table.set_header(vec!["Model", "Name", "Context", ""]);
    for info in provider.available_models() {
        let marker = if info.model == config.model {
            "configured"
        } else if info.model == Model::default() {
            "default"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(info.model),
            Cell::new(&info.name),
            Cell::new(format!("{}K", info.max_context / 1000)),
            Cell::new(marker),
        ]);
    }

    println!("Provider: {}", provider.name());
    println!("{table}");
    Ok(())
}
