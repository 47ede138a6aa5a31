//! Remote API clients and test doubles.

pub mod cohere;
pub use cohere::{CohereProvider, CohereProviderBuilder};

pub mod prediction_guard;
pub use prediction_guard::{PredictionGuardProvider, PredictionGuardProviderBuilder};

pub mod mock;
pub use mock::{MockCompletionProvider, MockEmbeddingProvider};

// Span wrapper for completion calls
pub mod tracing;
pub use self::tracing::TracingProvider;

#[cfg(test)]
pub(crate) mod test_server;
