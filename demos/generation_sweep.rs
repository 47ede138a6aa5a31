//! Generation parameter sweep example
//!
//! Shows how temperature and max-token limits change completions. Calls are
//! paced one second apart with a `RateLimitedProvider`.
//!
//! Run with:
//!   cargo run --example generation_sweep -- temperature
//!   cargo run --example generation_sweep -- max-tokens
//!
//! Requires: PREDICTIONGUARD_TOKEN environment variable

use edgequake_rag::postprocess::DEFAULT_STOP_MARKERS;
use edgequake_rag::providers::PredictionGuardProvider;
use edgequake_rag::rate_limiter::DEFAULT_MIN_INTERVAL;
use edgequake_rag::{
    truncate_at_stop_markers, CompletionProvider, CompletionRequest, RagConfig,
    RateLimitedProvider, RateLimiterConfig,
};
use tracing_subscriber::EnvFilter;

const SWEEP_MODEL: &str = "Camel-5B";

const TEMPERATURE_PROMPT: &str = "A great name for a unknown wizard (other than Gandalf and \
Radagast) from the Lord of the Rings universe is ";

const MAX_TOKENS_PROMPT: &str = "Merothooda the White Diviner is a great wizard from the Lord \
of the Rings. Many stories are told about her. For example, some say ";

async fn generate(
    provider: &impl CompletionProvider,
    request: &CompletionRequest,
) -> Result<String, Box<dyn std::error::Error>> {
    let response = provider.complete(request).await?;
    Ok(truncate_at_stop_markers(
        &response.first_choice()?.text,
        DEFAULT_STOP_MARKERS,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("EDGEQUAKE_RAG_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mode = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "temperature".to_string());

    let config = RagConfig::load()?;
    let interval = config
        .completion
        .min_interval()
        .unwrap_or(DEFAULT_MIN_INTERVAL);
    let provider = RateLimitedProvider::new(
        PredictionGuardProvider::from_config(&config.completion)?,
        RateLimiterConfig::new(interval),
    );

    match mode.as_str() {
        "temperature" => {
            // 0.1 to 2.0 in steps of 0.4, three samples each.
            for step in 0..5 {
                let temperature = 0.1 + 0.4 * step as f64;
                println!("\nTemperature: {:.1}", temperature);
                println!("--------------------------");

                for _ in 0..3 {
                    let request = CompletionRequest::new(SWEEP_MODEL, TEMPERATURE_PROMPT)
                        .with_temperature(temperature)
                        .with_max_tokens(20);
                    println!("{}", generate(&provider, &request).await?);
                }
            }
        }
        "max-tokens" => {
            for max_tokens in (30..=200).step_by(80) {
                println!("\nMax Tokens: {}", max_tokens);
                println!("--------------------------");

                let request = CompletionRequest::new(SWEEP_MODEL, MAX_TOKENS_PROMPT)
                    .with_temperature(0.8)
                    .with_max_tokens(max_tokens);
                println!("{}", generate(&provider, &request).await?);
            }
        }
        other => {
            return Err(format!(
                "unknown sweep '{}' (expected temperature or max-tokens)",
                other
            )
            .into());
        }
    }

    Ok(())
}
