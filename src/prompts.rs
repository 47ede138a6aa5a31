//! Instruction-style prompt templates.
//!
//! All templates use the `### Instruction:` / `### Input:` / `### Response:`
//! layout the hosted instruction-tuned models were trained on.

/// Answer given when the retrieved context does not contain the answer.
pub const REFUSAL_ANSWER: &str =
    "Sorry I had trouble answering this question, based on the information I found.";

/// Question answering grounded in a retrieved context.
pub fn question_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "### Instruction:\n\
         Read the context below and answer the question. If the question cannot be answered \
         based on the context alone or the context does not explicitly say the answer to the \
         question, respond \"{refusal}\"\n\
         \n\
         ### Input:\n\
         Context: \"{context}\"\n\
         \n\
         Question: \"{question}\"\n\
         \n\
         ### Response:\n",
        refusal = REFUSAL_ANSWER,
        context = context,
        question = question,
    )
}

/// Conversational reply given the recent transcript.
pub fn chat_prompt(transcript: &str, input: &str) -> String {
    format!(
        "### Instruction:\n\
         You are a helpful and kind chat assistant. Respond to the below user input based on \
         the following conversation context:\n\
         \n\
         {transcript}\n\
         ### Input: \n\
         {input}\n\
         \n\
         ### Response:\n",
        transcript = transcript,
        input = input,
    )
}

/// Yes/no classification: is the input an informational question?
pub fn classification_prompt(input: &str) -> String {
    format!(
        "### Instruction:\n\
         Is the user asking an informational question or just wanting to chat? Answer \"yes\" \
         if they are asking an informational question.\n\
         \n\
         ### Input: \n\
         {input}\n\
         \n\
         ### Response:\n",
        input = input,
    )
}
