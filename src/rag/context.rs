//! Context assembly from retrieved resumes

use crate::models::ScoredResume;

/// Separator between resume blocks
pub const BLOCK_SEPARATOR: &str = "\n---\n";

/// Turns search hits into the "Retrieved Context" text.
///
/// Blocks keep retrieval order. No truncation happens here; an oversized
/// message is rejected by the context window check in the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn assemble(&self, results: &[ScoredResume]) -> String {
        results
            .iter()
            .map(|hit| self.format_resume(hit))
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }

    fn format_resume(&self, hit: &ScoredResume) -> String {
        format!(
            "Resume:\n{}\nSkills: {}",
            hit.record.resume_text,
            hit.record.skills.join(", ")
        )
    }
}
