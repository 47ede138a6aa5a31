//! Context question-answering example
//!
//! Reads a context document from a file and asks a question about it with
//! the question-answering prompt.
//!
//! Run with: cargo run --example context_qa -- context.txt ["question"]
//! Requires: PREDICTIONGUARD_TOKEN environment variable

use edgequake_rag::postprocess::DEFAULT_STOP_MARKERS;
use edgequake_rag::prompts::question_answer_prompt;
use edgequake_rag::providers::PredictionGuardProvider;
use edgequake_rag::{truncate_at_stop_markers, CompletionProvider, CompletionRequest, RagConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_QUESTION: &str = "When did we add an additional endpoint to the API?";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("EDGEQUAKE_RAG_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let context_file = args
        .next()
        .ok_or("Please provide a context file as an argument.")?;
    let question = args.next().unwrap_or_else(|| DEFAULT_QUESTION.to_string());

    let context = std::fs::read_to_string(&context_file)?;

    let config = RagConfig::load()?;
    let provider = PredictionGuardProvider::from_config(&config.completion)?;

    let request = CompletionRequest::new(
        &config.assistant.answer_model,
        question_answer_prompt(&context, &question),
    );
    let response = provider.complete(&request).await?;
    let completion =
        truncate_at_stop_markers(&response.first_choice()?.text, DEFAULT_STOP_MARKERS);

    println!("{}", completion);
    Ok(())
}
