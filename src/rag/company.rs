//! Picking the target company a question refers to

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::Result;
use crate::llm::ChatModel;
use crate::llm::ResumePrompts;

/// Resolves which of the stored target companies a question is about.
///
/// Returns a name copied from `known` or `None`; any other answer would
/// silently filter every result out.
#[async_trait]
pub trait CompanyResolver: Send + Sync {
    async fn resolve(&self, question: &str, known: &[String]) -> Result<Option<String>>;
}

/// Asks the chat model to name the company
pub struct LlmCompanyResolver {
    model: Arc<dyn ChatModel>,
}

impl LlmCompanyResolver {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl CompanyResolver for LlmCompanyResolver {
    async fn resolve(&self, question: &str, known: &[String]) -> Result<Option<String>> {
        if known.is_empty() {
            return Ok(None);
        }

        let companies = known.join("\n");
        let prompt = ResumePrompts::company_extraction().render(&HashMap::from([
            ("companies", companies.as_str()),
            ("question", question),
        ]));
        let answer = self.model.generate(&prompt).await?;
        let resolved = match_known(&answer, known);
        debug!("Company resolver answered {:?} -> {:?}", answer.trim(), resolved);
        Ok(resolved)
    }
}

/// Map a free-text answer onto the known list, case-insensitively
fn match_known(answer: &str, known: &[String]) -> Option<String> {
    let cleaned = answer
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.' || c.is_whitespace());
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("none") {
        return None;
    }
    known
        .iter()
        .find(|company| company.eq_ignore_ascii_case(cleaned))
        .cloned()
}

/// Matches company names appearing as whole words in the question.
///
/// The longest matching name wins. Needs no model call.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordCompanyResolver;

#[async_trait]
impl CompanyResolver for KeywordCompanyResolver {
    async fn resolve(&self, question: &str, known: &[String]) -> Result<Option<String>> {
        let haystack = format!(" {} ", normalize(question));
        Ok(known
            .iter()
            .filter(|company| {
                let needle = normalize(company);
                !needle.is_empty() && haystack.contains(&format!(" {needle} "))
            })
            .max_by_key(|company| company.len())
            .cloned())
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
