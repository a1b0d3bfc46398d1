//! Aggregate view of the resumes aimed at one company

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::errors::Result;
use crate::models::EducationLevel;
use crate::models::ResumeVector;
use crate::vector_store::VectorStore;

const TOP_N: usize = 10;

/// Skills counted as part of a technology stack (lowercase)
const TECH_VOCABULARY: &[&str] = &[
    "rust", "go", "golang", "python", "java", "kotlin", "scala", "c", "c++", "c#", "ruby",
    "php", "swift", "javascript", "typescript", "node.js", "react", "next.js", "vue",
    "angular", "svelte", "django", "flask", "fastapi", "spring", "rails", ".net", "graphql",
    "sql", "postgresql", "mysql", "mongodb", "redis", "elasticsearch", "kafka", "spark",
    "hadoop", "aws", "gcp", "azure", "docker", "kubernetes", "terraform", "linux", "git",
    "tensorflow", "pytorch", "pandas", "numpy", "scikit-learn",
];

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "for", "in", "of", "on", "the", "to", "with", "i", "ii", "iii",
    "jr", "sr", "senior", "junior", "lead", "staff", "principal", "intern",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountedItem {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInsights {
    pub company: String,
    pub resume_count: usize,
    pub average_experience_years: f64,
    pub max_experience_years: f64,
    /// Ordered from lowest to highest level
    pub education_distribution: Vec<CountedItem>,
    pub top_skills: Vec<CountedItem>,
    pub top_job_titles: Vec<CountedItem>,
    pub top_previous_companies: Vec<CountedItem>,
    pub tech_stack: Vec<CountedItem>,
    pub themes: Vec<CountedItem>,
}

impl CompanyInsights {
    /// Aggregate `resumes`, which are all aimed at `company`
    #[must_use]
    pub fn from_resumes(company: &str, resumes: &[ResumeVector]) -> Self {
        let resume_count = resumes.len();
        let total_years: f64 = resumes.iter().map(|r| r.experience_years).sum();
        let max_experience_years = resumes
            .iter()
            .map(|r| r.experience_years)
            .fold(0.0_f64, f64::max);

        let mut education: BTreeMap<EducationLevel, usize> = BTreeMap::new();
        for resume in resumes {
            *education.entry(resume.education_level).or_default() += 1;
        }

        let top_skills = top_counts(resumes.iter().flat_map(|r| r.skills.iter()), TOP_N);
        let tech_stack = top_counts(
            resumes
                .iter()
                .flat_map(|r| r.skills.iter())
                .filter(|s| TECH_VOCABULARY.contains(&s.trim().to_lowercase().as_str())),
            TOP_N,
        );

        let title_terms: Vec<String> = resumes
            .iter()
            .flat_map(|r| r.job_titles.iter())
            .flat_map(|title| {
                title
                    .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
                    .map(str::to_lowercase)
                    .filter(|t| t.len() > 1 && !STOPWORDS.contains(&t.as_str()))
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            company: company.to_string(),
            resume_count,
            average_experience_years: if resume_count == 0 {
                0.0
            } else {
                total_years / resume_count as f64
            },
            max_experience_years,
            education_distribution: education
                .into_iter()
                .map(|(level, count)| CountedItem {
                    name: level.to_string(),
                    count,
                })
                .collect(),
            top_skills,
            top_job_titles: top_counts(resumes.iter().flat_map(|r| r.job_titles.iter()), TOP_N),
            top_previous_companies: top_counts(
                resumes.iter().flat_map(|r| r.companies.iter()),
                TOP_N,
            ),
            tech_stack,
            themes: top_counts(title_terms.iter(), TOP_N),
        }
    }
}

/// Load and aggregate the resumes targeting `company`
pub async fn company_insights(store: &dyn VectorStore, company: &str) -> Result<CompanyInsights> {
    let resumes = store.list_by_company(company).await?;
    let insights = CompanyInsights::from_resumes(company, &resumes);
    info!(
        "Computed insights for {} over {} resumes",
        company, insights.resume_count
    );
    Ok(insights)
}

/// Case-insensitive counts, keeping the first-seen spelling.
///
/// Ties are broken by first appearance.
fn top_counts<'a, S>(items: impl Iterator<Item = &'a S>, limit: usize) -> Vec<CountedItem>
where
    S: AsRef<str> + 'a + ?Sized,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counted: Vec<CountedItem> = Vec::new();

    for item in items {
        let name = item.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        let key = name.to_lowercase();
        match index.get(&key) {
            Some(&pos) => counted[pos].count += 1,
            None => {
                index.insert(key, counted.len());
                counted.push(CountedItem {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counted.sort_by(|a, b| b.count.cmp(&a.count));
    counted.truncate(limit);
    counted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResumeFeatures;

    fn resume(skills: &[&str], years: f64, level: EducationLevel, titles: &[&str]) -> ResumeVector {
        ResumeVector::new(
            "u",
            String::new(),
            ResumeFeatures {
                skills: skills.iter().map(|s| (*s).to_string()).collect(),
                experience_years: years,
                education_level: level,
                job_titles: titles.iter().map(|s| (*s).to_string()).collect(),
                companies: vec!["Initech".to_string()],
            },
            "Acme Corp",
            vec![1.0],
        )
    }

    #[test]
    fn test_aggregates_over_resumes() {
        let resumes = vec![
            resume(&["Rust", "Leadership"], 4.0, EducationLevel::Masters, &["Senior Backend Engineer"]),
            resume(&["rust", "Python"], 2.0, EducationLevel::Bachelors, &["Backend Engineer"]),
            resume(&["Python", "RUST"], 6.0, EducationLevel::Bachelors, &["Data Engineer"]),
        ];

        let insights = CompanyInsights::from_resumes("Acme Corp", &resumes);

        assert_eq!(insights.resume_count, 3);
        assert!((insights.average_experience_years - 4.0).abs() < f64::EPSILON);
        assert!((insights.max_experience_years - 6.0).abs() < f64::EPSILON);
        assert_eq!(
            insights.top_skills[0],
            CountedItem {
                name: "Rust".to_string(),
                count: 3
            }
        );
        assert_eq!(insights.top_skills[1].name, "Python");
        assert_eq!(
            insights.education_distribution,
            vec![
                CountedItem {
                    name: "Bachelors".to_string(),
                    count: 2
                },
                CountedItem {
                    name: "Masters".to_string(),
                    count: 1
                },
            ]
        );
        assert!(insights.tech_stack.iter().all(|t| t.name != "Leadership"));
        assert_eq!(insights.themes[0].name, "engineer");
        assert_eq!(insights.themes[0].count, 3);
        assert_eq!(insights.themes[1].name, "backend");
        assert_eq!(insights.top_previous_companies[0].count, 3);
    }

    #[test]
    fn test_empty_company_has_zeroed_insights() {
        let insights = CompanyInsights::from_resumes("Nobody", &[]);
        assert_eq!(insights.resume_count, 0);
        assert!(insights.average_experience_years.abs() < f64::EPSILON);
        assert!(insights.top_skills.is_empty());
    }

    #[test]
    fn test_top_counts_truncates_and_keeps_first_spelling() {
        let items: Vec<String> = (0..15).map(|i| format!("skill{i}")).collect();
        assert_eq!(top_counts(items.iter(), 10).len(), 10);

        let items = ["Go", "GO", "go"];
        assert_eq!(
            top_counts(items.iter().copied(), 10),
            vec![CountedItem {
                name: "Go".to_string(),
                count: 3
            }]
        );
    }
}
