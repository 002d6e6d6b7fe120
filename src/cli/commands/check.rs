//! Check command: verify the API key and model.

use crate::cli::icons::{dim_arrow, error, success};
use crate::config::{ApiKey, Settings};
use crate::llm::GeminiClient;

/// Fetch the configured model to confirm the key and model name are valid.
pub async fn cmd_check(settings: &Settings, api_key: ApiKey) -> anyhow::Result<()> {
    let client = GeminiClient::new(settings.llm.clone(), api_key)?;

    match client.model_info().await {
        Ok(model) => {
            println!(
                "{} {} is available",
                success(),
                model.display_name.as_deref().unwrap_or(&model.name)
            );
            println!("  {} Endpoint: {}", dim_arrow(), client.config().endpoint);
            if let Some(limit) = model.input_token_limit {
                println!("  {} Input token limit: {}", dim_arrow(), limit);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{} Model '{}' is not usable: {}",
                error(),
                client.config().model,
                e
            );
            std::process::exit(1);
        }
    }
}
