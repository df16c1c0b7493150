//! Answer-generation boundary.
//!
//! Phrasing an answer is left to an [`AnswerGenerator`] collaborator. This
//! module owns the gate in front of it: [`answer`] only calls the generator
//! when retrieval produced context, and otherwise passes the no-content signal
//! through untouched.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use crate::document::SearchResult;
use crate::error::Result;
use crate::retriever::{NoContentReason, RetrievedContext, Retriever};

/// Message shown to users when retrieval finds nothing.
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found in your documents. \
     Try uploading more content or asking a different question.";

/// Produces a natural-language answer from a question and retrieved context.
///
/// Implementations report failures as
/// [`RagError::AnswerGeneration`](crate::RagError::AnswerGeneration).
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Answer `question` using only `context`.
    async fn generate(&self, question: &str, context: &str) -> Result<String>;

    /// A short generator name used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Render the grounding prompt sent to a generator.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "Based on the following context from study materials, answer the question.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}

/// The outcome of [`answer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Answer {
    /// The generator's answer and the passages it was grounded on.
    Generated { text: String, passages: Vec<SearchResult> },
    /// Retrieval found nothing; the generator was not called.
    NoRelevantContent { reason: NoContentReason },
}

impl Answer {
    /// The text to show a user.
    pub fn message(&self) -> &str {
        match self {
            Self::Generated { text, .. } => text,
            Self::NoRelevantContent { .. } => NO_RELEVANT_INFORMATION,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Retrieve context for `question` and, if any was found, ask `generator` to answer.
///
/// # Errors
///
/// Retrieval errors from [`Retriever::answer_context`] and generator errors
/// are returned unchanged.
pub async fn answer(
    retriever: &Retriever,
    generator: &dyn AnswerGenerator,
    question: &str,
    top_k: usize,
) -> Result<Answer> {
    let context = match retriever.answer_context(question, top_k).await? {
        RetrievedContext::Found(context) => context,
        RetrievedContext::NoRelevantContent(reason) => {
            return Ok(Answer::NoRelevantContent { reason });
        }
    };

    let text = generator.generate(question, &context.text).await.map_err(|e| {
        error!(generator = generator.name(), error = %e, "answer generation failed");
        e
    })?;
    info!(generator = generator.name(), passages = context.passages.len(), "answer generated");

    Ok(Answer::Generated { text, passages: context.passages })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_before_question() {
        let prompt = build_prompt("What is ATP?", "ATP stores energy.");
        let context_at = prompt.find("ATP stores energy.").unwrap();
        let question_at = prompt.find("Question: What is ATP?").unwrap();
        assert!(context_at < question_at);
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn no_content_answer_uses_fixed_message() {
        let answer = Answer::NoRelevantContent { reason: NoContentReason::EmptyIndex };
        assert_eq!(answer.to_string(), NO_RELEVANT_INFORMATION);
    }
}
