//! Conversational retrieval assistant.
//!
//! # Request flow
//!
//! ```text
//! user input
//!     │
//!     ▼
//! classify ── "yes" ──► embed query ─► search corpus ─► QA prompt ─► complete
//!     │                                                                 │
//!     └── anything else ──► last N turns ─► chat prompt ─► complete     │
//!                                                            │          │
//!                                          truncate at stop markers ◄───┘
//!                                                            │
//!                                              append turn, return Answer
//! ```
//!
//! Every remote call is awaited before the next one starts. The first error
//! aborts the request and leaves the turn log untouched.

use std::sync::Arc;
use tracing::{debug, info};

use crate::chat::{ChatHistory, ChatTurn};
use crate::config::AssistantConfig;
use crate::corpus::VectorCorpus;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::postprocess::truncate_at_stop_markers;
use crate::prompts::{chat_prompt, classification_prompt, question_answer_prompt};
use crate::traits::{CompletionProvider, CompletionRequest, TypedOutput};

/// The positive category of the yes/no classifier.
const CLASSIFIER_YES: &str = "yes";

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Answered from the corpus.
    Retrieval,
    /// Answered conversationally from the recent turns.
    Chat,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Retrieval => write!(f, "retrieval"),
            Route::Chat => write!(f, "chat"),
        }
    }
}

/// A routed, post-processed reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub route: Route,
    pub text: String,
    /// Retrieved chunk used as context (retrieval route with a hit only).
    pub context: Option<String>,
}

/// True when `input` asks to leave the interactive loop.
pub fn is_exit_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("exit")
}

/// Routes each user input to retrieval-grounded QA or plain chat.
pub struct RagAssistant {
    completion: Arc<dyn CompletionProvider>,
    embedder: Embedder,
    corpus: VectorCorpus,
    history: ChatHistory,
    config: AssistantConfig,
}

impl RagAssistant {
    pub fn new(
        completion: Arc<dyn CompletionProvider>,
        embedder: Embedder,
        corpus: VectorCorpus,
    ) -> Self {
        Self::with_config(completion, embedder, corpus, AssistantConfig::default())
    }

    pub fn with_config(
        completion: Arc<dyn CompletionProvider>,
        embedder: Embedder,
        corpus: VectorCorpus,
        config: AssistantConfig,
    ) -> Self {
        Self {
            completion,
            embedder,
            corpus,
            history: ChatHistory::new(),
            config,
        }
    }

    pub fn corpus(&self) -> &VectorCorpus {
        &self.corpus
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Decide whether `input` is an informational question.
    pub async fn classify(&self, input: &str) -> Result<Route> {
        let request = CompletionRequest::new(
            &self.config.classifier_model,
            classification_prompt(input),
        )
        .with_output(TypedOutput::yes_no());

        let response = self.completion.complete(&request).await?;
        let verdict = response.first_choice()?.text.trim();
        debug!("Classifier verdict for input: {:?}", verdict);

        Ok(if verdict == CLASSIFIER_YES {
            Route::Retrieval
        } else {
            Route::Chat
        })
    }

    /// Answer from the most similar corpus chunk.
    ///
    /// With no positive match the prompt carries an empty context and the
    /// model is expected to refuse.
    pub async fn answer_from_corpus(&self, input: &str) -> Result<Answer> {
        let query = self.embedder.embed_query(input).await?;
        let hit = self.corpus.search(&query)?;
        let context = hit.map(|h| h.chunk.to_string());

        let request = CompletionRequest::new(
            &self.config.answer_model,
            question_answer_prompt(context.as_deref().unwrap_or(""), input),
        );
        let response = self.completion.complete(&request).await?;
        let text = truncate_at_stop_markers(
            &response.first_choice()?.text,
            &self.config.stop_markers,
        );

        Ok(Answer {
            route: Route::Retrieval,
            text,
            context,
        })
    }

    /// Answer conversationally from the most recent turns.
    pub async fn answer_conversationally(&self, input: &str) -> Result<Answer> {
        let transcript = self.history.transcript(self.config.history_window);
        let request =
            CompletionRequest::new(&self.config.chat_model, chat_prompt(&transcript, input))
                .with_output(TypedOutput::yes_no());

        let response = self.completion.complete(&request).await?;
        let text = truncate_at_stop_markers(
            &response.first_choice()?.text,
            &self.config.stop_markers,
        );

        Ok(Answer {
            route: Route::Chat,
            text,
            context: None,
        })
    }

    /// Classify, answer on the chosen route, and log the exchange.
    pub async fn respond(&mut self, input: &str) -> Result<Answer> {
        let route = self.classify(input).await?;
        let answer = match route {
            Route::Retrieval => self.answer_from_corpus(input).await?,
            Route::Chat => self.answer_conversationally(input).await?,
        };

        info!(route = %answer.route, "Answered user input");
        self.history.push(ChatTurn::new(input, answer.text.clone()));
        Ok(answer)
    }
}
