//! Raw completion example
//!
//! Sends a single prompt and pretty-prints the untouched JSON response.
//! Without a config file it talks to the header-keyed deployment, sending the
//! key as `x-api-key`.
//!
//! Run with:
//!   cargo run --example raw_completion -- ["prompt"]
//!   cargo run --example raw_completion -- --model WizardCoder "def print_prime(n):"
//!
//! Requires: PREDICTIONGUARD_TOKEN environment variable

use edgequake_rag::config::CompletionConfig;
use edgequake_rag::providers::PredictionGuardProvider;
use edgequake_rag::{CompletionRequest, RagConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_PROMPT: &str = "The best joke I know is: ";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("EDGEQUAKE_RAG_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut model = None;
    let mut prompt = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--model" {
            model = Some(args.next().ok_or("--model needs a model name")?);
        } else {
            prompt = Some(arg);
        }
    }
    let prompt = prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string());

    let config = RagConfig::load_or(RagConfig {
        completion: CompletionConfig::header_keyed(),
        ..Default::default()
    })?;
    let provider = PredictionGuardProvider::from_config(&config.completion)?;
    let model = model.unwrap_or_else(|| config.assistant.answer_model.clone());

    let request = CompletionRequest::new(model, prompt);
    let response = provider.complete_raw(&request).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
