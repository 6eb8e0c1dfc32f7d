//! Prompt assembly for the text generator.
//!
//! Everything here is pure: no I/O, same inputs give the same prompt.

use std::fmt::Write as _;

use crate::{Headline, NewsList, Quote, ValidationError};

/// Character cap for a generated prompt.
///
/// The local model runs with a 2048-token context; at roughly four characters
/// per token this leaves room for the completion.
pub const DEFAULT_PROMPT_CHAR_BUDGET: usize = 6000;

const NEWS_HEADER: &str = "Recent News:";
const INSIGHT_INSTRUCTION: &str = "Answer the user with a concise financial insight.";
const SUMMARY_INSTRUCTION: &str = "Summarize the following crypto news in a few sentences:";

/// Builds prompts under a fixed character budget.
///
/// The question and price block are always emitted. Headline lines are added
/// in order while they fit, so trimming drops from the tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    char_budget: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            char_budget: DEFAULT_PROMPT_CHAR_BUDGET,
        }
    }
}

impl PromptBuilder {
    pub fn new(char_budget: usize) -> Self {
        Self { char_budget }
    }

    pub const fn char_budget(&self) -> usize {
        self.char_budget
    }

    /// Prompt for a user question about one asset.
    pub fn insight(
        &self,
        question: &str,
        quote: &Quote,
        news: &NewsList,
    ) -> Result<String, ValidationError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }

        let mut head = String::new();
        let _ = writeln!(head, "User question: {question}");
        head.push('\n');
        let _ = writeln!(
            head,
            "Market Price: ${} (24h change: {} / {}%)",
            quote.price().normalize(),
            quote.change_absolute().normalize(),
            quote.change_percent().normalize()
        );
        head.push_str(NEWS_HEADER);
        head.push('\n');

        let tail = format!("\n{INSIGHT_INSTRUCTION}\n");
        Ok(self.assemble(head, news.headlines(), &tail))
    }

    /// Prompt asking for a short digest of the headlines.
    pub fn summary(&self, news: &NewsList) -> String {
        let head = format!("{SUMMARY_INSTRUCTION}\n");
        self.assemble(head, news.headlines(), "")
    }

    fn assemble(&self, head: String, headlines: &[Headline], tail: &str) -> String {
        let mut used = head.chars().count() + tail.chars().count();
        let mut prompt = head;

        for (index, headline) in headlines.iter().enumerate() {
            let line = render_headline(headline);
            let cost = line.chars().count() + 1;
            if used + cost > self.char_budget {
                tracing::debug!(
                    kept = index,
                    dropped = headlines.len() - index,
                    budget = self.char_budget,
                    "prompt budget reached"
                );
                break;
            }
            used += cost;
            prompt.push_str(&line);
            prompt.push('\n');
        }

        prompt.push_str(tail);
        prompt
    }
}

/// `{title}: {summary}`, with an empty summary when none is present.
pub fn render_headline(headline: &Headline) -> String {
    format!(
        "{}: {}",
        headline.title,
        headline.summary.as_deref().unwrap_or_default()
    )
}

/// [`PromptBuilder::insight`] with the default budget.
pub fn build_prompt(
    question: &str,
    quote: &Quote,
    news: &NewsList,
) -> Result<String, ValidationError> {
    PromptBuilder::default().insight(question, quote, news)
}

/// [`PromptBuilder::summary`] with the default budget.
pub fn build_summary_prompt(news: &NewsList) -> String {
    PromptBuilder::default().summary(news)
}
