//! Typed-output toxicity check example
//!
//! Completes a prompt read from a file with the endpoint's toxicity filter
//! enabled. A flagged completion comes back with a non-success status and
//! the program aborts with that status.
//!
//! Run with: cargo run --example toxicity_check -- prompt.txt [--factuality]
//! Requires: PREDICTIONGUARD_TOKEN environment variable

use edgequake_rag::postprocess::REDUCED_STOP_MARKERS;
use edgequake_rag::providers::PredictionGuardProvider;
use edgequake_rag::{
    truncate_at_stop_markers, CompletionProvider, CompletionRequest, RagConfig, TypedOutput,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("EDGEQUAKE_RAG_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let prompt_file = args
        .next()
        .ok_or("Please provide a prompt file as an argument.")?;
    let check = match args.next().as_deref() {
        Some("--factuality") => TypedOutput::factuality(),
        _ => TypedOutput::toxicity(),
    };

    let prompt = std::fs::read_to_string(&prompt_file)?;

    let config = RagConfig::load()?;
    let provider = PredictionGuardProvider::from_config(&config.completion)?;

    let request =
        CompletionRequest::new(&config.assistant.answer_model, prompt.as_str()).with_output(check);
    let response = provider.complete(&request).await?;
    let choice = response.first_successful_choice()?;

    let completion = truncate_at_stop_markers(&choice.text, REDUCED_STOP_MARKERS);
    println!("\n{}{}", prompt, completion);

    if let Some(output) = &choice.output {
        println!("\n📊 Check output: {}", output);
    }

    Ok(())
}
