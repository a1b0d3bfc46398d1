//! Prompt templates for resume chat

use std::collections::HashMap;

/// Greeting shown to the user and seeded into every new conversation
pub const GREETING: &str = "Hello! I'm here to assist you with resume analysis, job matching, \
                            and career-related questions. How can I help you today?";

/// Answer used when the model fails to produce one
pub const APOLOGY: &str = "Sorry, I couldn't generate an answer based on the available data.";

/// Placeholder for the target company when none was identified
pub const NO_COMPANY: &str = "No company";

/// Template with `{{name}}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Substitute placeholders in one pass.
    ///
    /// Values are inserted verbatim, so a value containing `{{x}}` is never
    /// expanded again. Unknown placeholders are left untouched.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            let name = &rest[start + 2..start + 2 + len];
            result.push_str(&rest[..start]);
            match values.get(name) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[start..start + 4 + len]),
            }
            rest = &rest[start + 4 + len..];
        }
        result.push_str(rest);
        result
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

fn extract_variables(template: &str) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let name = rest[start + 2..start + 2 + len].to_string();
        if !name.is_empty() && !variables.contains(&name) {
            variables.push(name);
        }
        rest = &rest[start + 4 + len..];
    }
    variables
}

/// Prompts used by the chat pipeline
pub struct ResumePrompts;

impl ResumePrompts {
    /// Instructions seeded as the first user turn of every conversation
    #[must_use]
    pub fn career_assistant() -> &'static str {
        "You are a career assistant for a job-matching platform. Recruiters and \
candidates ask you about resumes stored on the platform, how well they fit a \
target company, and how to improve them.

Each message contains a \"Retrieved Context\" section with the most relevant \
resumes, a \"Target Company\" section, and the user's question.

Rules:
- Base every statement about a candidate on the retrieved resumes. If the \
context does not contain the answer, say so.
- When a target company is given, judge fit against that company.
- Never invent employers, dates, degrees or skills.
- Keep answers concise and structured; use short bullet lists for comparisons."
    }

    /// Per-turn message wrapping retrieved context, company and question
    #[must_use]
    pub fn turn_message() -> PromptTemplate {
        PromptTemplate::new(
            "Retrieved Context:\n{{context}}\n\nTarget Company:\n{{company}}\n\nUser's Question:\n{{question}}",
        )
    }

    /// Asks the model which known company, if any, the question is about
    #[must_use]
    pub fn company_extraction() -> PromptTemplate {
        PromptTemplate::new(
            r#"Identify the company the following question is about.

Known companies:
{{companies}}

Question: {{question}}

Reply with the exact company name from the list above, copied character for character. If the question does not mention any of them, reply with "none". Reply with nothing else."#,
        )
    }

    /// Compose the per-turn message sent to the model
    #[must_use]
    pub fn compose_turn(context: &str, company: Option<&str>, question: &str) -> String {
        let values = HashMap::from([
            ("context", context),
            ("company", company.unwrap_or(NO_COMPANY)),
            ("question", question),
        ]);
        Self::turn_message().render(&values)
    }
}
