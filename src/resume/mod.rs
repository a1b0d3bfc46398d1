//! Resume processing: text flattening, feature extraction and ingestion
//!
//! # Examples
//!
//! ```rust
//! use getthatjob::models::ResumeRecord;
//! use getthatjob::resume::extract_features;
//! use getthatjob::resume::prepare_resume_text;
//!
//! let resume: ResumeRecord = serde_json::from_str(
//!     r#"{"name": "Ada", "skills": "Rust, Go", "education": [{"degree": "PhD"}]}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(prepare_resume_text(&resume), "Name: Ada\n\nSkills: Rust, Go\n\nEducation: PhD");
//! assert_eq!(extract_features(&resume).skills, vec!["Rust", "Go"]);
//! ```

pub mod features;
pub mod ingest;
pub mod text;

pub use features::extract_features;
pub use ingest::IngestOutcome;
pub use ingest::IngestService;
pub use text::prepare_resume_text;
