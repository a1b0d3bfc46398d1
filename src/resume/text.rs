//! Flattening a resume into the text that gets embedded

use crate::models::EducationItem;
use crate::models::ExperienceItem;
use crate::models::ProjectItem;
use crate::models::ResumeRecord;

/// Flatten a resume into labelled paragraphs.
///
/// Sections appear in a fixed order (name, email, summary, skills, experience,
/// education, projects) and empty sections are omitted, so identical input
/// always yields byte-identical text.
#[must_use]
pub fn prepare_resume_text(resume: &ResumeRecord) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(name) = non_empty(resume.name.as_deref()) {
        sections.push(format!("Name: {name}"));
    }
    if let Some(email) = non_empty(resume.email.as_deref()) {
        sections.push(format!("Email: {email}"));
    }
    if let Some(summary) = non_empty(resume.summary.as_deref()) {
        sections.push(format!("Summary: {summary}"));
    }
    if let Some(skills) = resume.skills.as_ref().filter(|s| !s.is_empty()) {
        sections.push(format!("Skills: {}", skills.joined()));
    }

    push_section(&mut sections, "Experience", resume.experience(), format_experience);
    push_section(&mut sections, "Education", resume.education(), format_education);
    push_section(&mut sections, "Projects", resume.projects(), format_project);

    sections.join("\n\n")
}

fn push_section<T>(
    sections: &mut Vec<String>,
    label: &str,
    items: &[T],
    format_item: fn(&T) -> String,
) {
    let entries: Vec<String> = items
        .iter()
        .map(format_item)
        .filter(|entry| !entry.is_empty())
        .collect();
    if !entries.is_empty() {
        sections.push(format!("{label}: {}", entries.join(". ")));
    }
}

fn format_experience(exp: &ExperienceItem) -> String {
    let mut parts = Vec::new();
    if let Some(title) = non_empty(exp.title.as_deref()) {
        parts.push(title.to_string());
    }
    if let Some(company) = non_empty(exp.company.as_deref()) {
        parts.push(format!("at {company}"));
    }
    if let Some(duration) = non_empty(exp.duration.as_deref()) {
        parts.push(format!("({duration})"));
    }
    if let Some(description) = non_empty(exp.description.as_deref()) {
        parts.push(format!(": {description}"));
    }
    parts.join(" ")
}

fn format_education(edu: &EducationItem) -> String {
    let mut parts = Vec::new();
    if let Some(degree) = non_empty(edu.degree.as_deref()) {
        parts.push(degree.to_string());
    }
    if let Some(school) = non_empty(edu.school.as_deref()) {
        parts.push(format!("from {school}"));
    }
    if let Some(year) = non_empty(edu.year.as_deref()) {
        parts.push(format!("({year})"));
    }
    parts.join(" ")
}

fn format_project(project: &ProjectItem) -> String {
    let mut parts = Vec::new();
    if let Some(name) = non_empty(project.name.as_deref()) {
        parts.push(name.to_string());
    }
    if let Some(description) = non_empty(project.description.as_deref()) {
        parts.push(format!(": {description}"));
    }
    if let Some(tech) = project.technologies.as_ref().filter(|t| !t.is_empty()) {
        parts.push(format!("Technologies: {}", tech.joined()));
    }
    parts.join(" ")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
