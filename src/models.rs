//! Resume data model shared by ingestion, storage and retrieval

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// A list that clients send either as a JSON array or as one delimited string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    List(Vec<String>),
    Text(String),
}

impl StringList {
    /// Display form used in flattened resume text
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Self::List(items) => items.join(", "),
            Self::Text(text) => text.clone(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::Text(text) => text.is_empty(),
        }
    }
}

/// `years` arrives as a number or as numeric text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearsValue {
    Number(f64),
    Text(String),
}

impl YearsValue {
    /// Leading numeric value, `None` when it does not parse
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(text) => parse_leading_float(text),
        }
    }
}

fn parse_leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub years: Option<YearsValue>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationItem {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Option<StringList>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Semi-structured resume as produced by the upload/parse step.
///
/// Every field is optional; absent fields contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Option<StringList>,
    #[serde(default)]
    pub experience: Option<Vec<ExperienceItem>>,
    #[serde(default)]
    pub education: Option<Vec<EducationItem>>,
    #[serde(default)]
    pub projects: Option<Vec<ProjectItem>>,
}

impl ResumeRecord {
    pub fn experience(&self) -> &[ExperienceItem] {
        self.experience.as_deref().unwrap_or_default()
    }

    pub fn education(&self) -> &[EducationItem] {
        self.education.as_deref().unwrap_or_default()
    }

    pub fn projects(&self) -> &[ProjectItem] {
        self.projects.as_deref().unwrap_or_default()
    }
}

/// Highest completed education, ordered from lowest to highest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    #[default]
    #[serde(rename = "High School")]
    HighSchool,
    Associates,
    Bachelors,
    Masters,
    #[serde(rename = "PhD")]
    Phd,
}

impl EducationLevel {
    pub const ALL: [Self; 5] = [
        Self::HighSchool,
        Self::Associates,
        Self::Bachelors,
        Self::Masters,
        Self::Phd,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighSchool => "High School",
            Self::Associates => "Associates",
            Self::Bachelors => "Bachelors",
            Self::Masters => "Masters",
            Self::Phd => "PhD",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EducationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown education level: {s}"))
    }
}

/// Metadata features derived from a resume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeFeatures {
    pub skills: Vec<String>,
    /// Approximate total, see `resume::features::experience_years`
    pub experience_years: f64,
    pub education_level: EducationLevel,
    pub job_titles: Vec<String>,
    pub companies: Vec<String>,
}

/// Persisted resume embedding with its filterable metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeVector {
    pub id: String,
    pub user_id: String,
    pub resume_text: String,
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub education_level: EducationLevel,
    pub job_titles: Vec<String>,
    pub companies: Vec<String>,
    pub target_company: String,
    pub created_at: DateTime<Utc>,
    pub vector: Vec<f32>,
}

impl ResumeVector {
    /// Build a fresh record with a new id and `created_at = now`
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        resume_text: String,
        features: ResumeFeatures,
        target_company: impl Into<String>,
        vector: Vec<f32>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            resume_text,
            skills: features.skills,
            experience_years: features.experience_years,
            education_level: features.education_level,
            job_titles: features.job_titles,
            companies: features.companies,
            target_company: target_company.into(),
            created_at: Utc::now(),
            vector,
        }
    }
}

/// A search hit: the stored record and its cosine similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResume {
    pub record: ResumeVector,
    pub score: f32,
}

impl ScoredResume {
    /// Cosine distance, `1 - similarity`
    #[must_use]
    pub fn distance(&self) -> f32 {
        1.0 - self.score
    }
}
