//! Metadata features derived from a resume

use std::sync::LazyLock;

use regex::Regex;

use crate::models::EducationLevel;
use crate::models::ExperienceItem;
use crate::models::ResumeFeatures;
use crate::models::ResumeRecord;
use crate::models::StringList;
use crate::models::YearsValue;

/// Years credited for an experience entry whose length cannot be determined
pub const DEFAULT_ENTRY_YEARS: f64 = 1.0;

static YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(year|yr)").expect("valid regex"));
static MONTHS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(month|mo)").expect("valid regex"));

static PHD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ph\.?\s?d|doctor").expect("valid regex"));
static MASTERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)master|\bm\.?s\.?c?\b|\bmba\b|\bm\.?eng\b|\bm\.?a\.?\b").expect("valid regex")
});
static BACHELORS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)bachelor|\bb\.?s\.?c?\b|\bb\.?a\.?\b|\bb\.?eng\b|\bb\.?tech\b")
        .expect("valid regex")
});
static ASSOCIATES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)associate").expect("valid regex"));

/// Extract the metadata stored next to a resume embedding
#[must_use]
pub fn extract_features(resume: &ResumeRecord) -> ResumeFeatures {
    let experience = resume.experience();

    ResumeFeatures {
        skills: resume.skills.as_ref().map(normalize_skills).unwrap_or_default(),
        experience_years: experience_years(experience),
        education_level: education_level(
            resume.education().iter().filter_map(|e| e.degree.as_deref()),
        ),
        job_titles: experience
            .iter()
            .filter_map(|e| e.title.clone())
            .filter(|t| !t.is_empty())
            .collect(),
        companies: experience
            .iter()
            .filter_map(|e| e.company.clone())
            .filter(|c| !c.is_empty())
            .collect(),
    }
}

/// Normalise skills to a list, splitting text on `,` `;` `|`.
///
/// Order is preserved; entries are trimmed and empties dropped.
#[must_use]
pub fn normalize_skills(skills: &StringList) -> Vec<String> {
    match skills {
        StringList::List(items) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        StringList::Text(text) => split_delimited(text),
    }
}

pub(crate) fn split_delimited(text: &str) -> Vec<String> {
    text.split([',', ';', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Approximate total years of experience.
///
/// Per entry: an explicit `years` value wins; otherwise the first
/// "<n> year|yr" in `duration` counts n years, else the first
/// "<n> month|mo" counts n/12; otherwise the entry counts as one year.
/// The fallback can overcount (e.g. "2020-2023" is one year).
#[must_use]
pub fn experience_years(entries: &[ExperienceItem]) -> f64 {
    entries.iter().map(entry_years).sum()
}

fn entry_years(entry: &ExperienceItem) -> f64 {
    if let Some(years) = entry.years.as_ref().and_then(YearsValue::as_f64) {
        return years.max(0.0);
    }
    if let Some(duration) = entry.duration.as_deref() {
        if let Some(n) = first_number(&YEARS_RE, duration) {
            return n;
        }
        if let Some(n) = first_number(&MONTHS_RE, duration) {
            return n / 12.0;
        }
    }
    DEFAULT_ENTRY_YEARS
}

fn first_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Highest education level named by any degree string
pub fn education_level<'a>(degrees: impl IntoIterator<Item = &'a str>) -> EducationLevel {
    degrees
        .into_iter()
        .map(degree_level)
        .max()
        .unwrap_or_default()
}

fn degree_level(degree: &str) -> EducationLevel {
    if PHD_RE.is_match(degree) {
        EducationLevel::Phd
    } else if MASTERS_RE.is_match(degree) {
        EducationLevel::Masters
    } else if BACHELORS_RE.is_match(degree) {
        EducationLevel::Bachelors
    } else if ASSOCIATES_RE.is_match(degree) {
        EducationLevel::Associates
    } else {
        EducationLevel::HighSchool
    }
}
