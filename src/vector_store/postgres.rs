//! pgvector-backed resume collection

use std::future::Future;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use pgvector::Vector;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::PgPool;
use sqlx::Row;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::check_dimension;
use super::normalize_stored_list;
use super::VectorStore;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::errors::Result;
use crate::models::EducationLevel;
use crate::models::ResumeVector;
use crate::models::ScoredResume;

const COLUMNS: &str = "id, user_id, resume_text, skills, experience_years, education_level, \
                       job_titles, companies, target_company, created_at, vector";

/// Resume collection stored in one Postgres table with an HNSW cosine index
pub struct PgVectorStore {
    pool: PgPool,
    collection: String,
    dimension: usize,
    ef_search: usize,
    timeout: Duration,
    initialized: AtomicBool,
}

impl PgVectorStore {
    /// Wrap an existing pool
    ///
    /// # Errors
    /// Returns a config error when `collection` is not a plain identifier.
    pub fn new(
        pool: PgPool,
        collection: &str,
        dimension: usize,
        ef_search: usize,
        timeout: Duration,
    ) -> Result<Self> {
        validate_collection_name(collection)?;
        Ok(Self {
            pool,
            collection: collection.to_string(),
            dimension,
            ef_search: ef_search.max(1),
            timeout,
            initialized: AtomicBool::new(false),
        })
    }

    /// Connect a pool from configuration
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections())
            .min_connections(config.min_connections())
            .acquire_timeout(Duration::from_secs(config.connection_timeout()))
            .connect(config.database_url())
            .await?;

        Self::new(
            pool,
            &config.vector_store.collection,
            config.embedding_dimension(),
            config.vector_store.ef_search,
            Duration::from_secs(config.vector_store.timeout_secs),
        )
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn table(&self) -> String {
        quote_ident(&self.collection)
    }

    /// Bound a store call by the configured timeout
    async fn timed<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.timeout, fut).await?
    }
}

const MAX_EF_SEARCH: usize = 1000;

/// `hnsw.ef_search` for an unfiltered query; an index scan never returns
/// more than ef_search rows
fn ef_search_for(configured: usize, limit: usize) -> usize {
    configured.max(limit).min(MAX_EF_SEARCH)
}

/// Nearest-neighbour query over `table`.
///
/// A company-filtered query ranks the company's rows exactly: the
/// materialized CTE keeps the planner off the approximate index, whose
/// candidate list would be filtered after the scan and could come back short.
fn search_sql(table: &str, filtered: bool) -> String {
    if filtered {
        format!(
            "WITH candidates AS MATERIALIZED (
                 SELECT {COLUMNS} FROM {table} WHERE target_company = $2
             )
             SELECT {COLUMNS}, 1.0 - (vector <=> $1::vector) AS score
             FROM candidates
             ORDER BY vector <=> $1::vector
             LIMIT $3"
        )
    } else {
        format!(
            "SELECT {COLUMNS}, 1.0 - (vector <=> $1::vector) AS score
             FROM {table}
             ORDER BY vector <=> $1::vector
             LIMIT $2"
        )
    }
}

/// Quotes Postgres identifiers, escaping embedded quotes.
fn quote_ident(input: &str) -> String {
    let escaped = input.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

fn validate_collection_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && name.len() <= 48 {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "vector_store.collection must be a plain identifier, got {name:?}"
        )))
    }
}

fn row_to_record(row: &PgRow) -> Result<ResumeVector> {
    let id: String = row.try_get("id")?;
    let education: String = row.try_get("education_level")?;
    let education_level = education.parse::<EducationLevel>().unwrap_or_else(|e| {
        warn!("Record {}: {}, reading as High School", id, e);
        EducationLevel::default()
    });
    let skills: serde_json::Value = row.try_get("skills")?;
    let job_titles: serde_json::Value = row.try_get("job_titles")?;
    let companies: serde_json::Value = row.try_get("companies")?;
    let vector: Vector = row.try_get("vector")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(ResumeVector {
        user_id: row.try_get("user_id")?,
        resume_text: row.try_get("resume_text")?,
        skills: normalize_stored_list(&skills, &id, "skills"),
        experience_years: row.try_get("experience_years")?,
        education_level,
        job_titles: normalize_stored_list(&job_titles, &id, "job_titles"),
        companies: normalize_stored_list(&companies, &id, "companies"),
        target_company: row.try_get("target_company")?,
        created_at,
        vector: vector.to_vec(),
        id,
    })
}

async fn insert_row<'e, E>(executor: E, table: &str, record: &ResumeVector) -> Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO {table} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
    );
    sqlx::query(&sql)
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.resume_text)
        .bind(Json(&record.skills))
        .bind(record.experience_years)
        .bind(record.education_level.as_str())
        .bind(Json(&record.job_titles))
        .bind(Json(&record.companies))
        .bind(&record.target_company)
        .bind(record.created_at)
        .bind(Vector::from(record.vector.clone()))
        .execute(executor)
        .await?;
    Ok(())
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn ensure_collection(&self) -> Result<()> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        let table = self.table();
        let collection = &self.collection;
        let statements = [
            "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
            format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id VARCHAR(100) PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    resume_text TEXT NOT NULL,
                    skills JSONB NOT NULL DEFAULT '[]'::jsonb,
                    experience_years DOUBLE PRECISION NOT NULL DEFAULT 0,
                    education_level VARCHAR(100) NOT NULL,
                    job_titles JSONB NOT NULL DEFAULT '[]'::jsonb,
                    companies JSONB NOT NULL DEFAULT '[]'::jsonb,
                    target_company TEXT NOT NULL DEFAULT '',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    vector VECTOR({}) NOT NULL
                )",
                self.dimension
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {table} \
                 USING hnsw (vector vector_cosine_ops)",
                quote_ident(&format!("{collection}_vector_idx"))
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {table} (target_company)",
                quote_ident(&format!("{collection}_target_company_idx"))
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {table} (user_id)",
                quote_ident(&format!("{collection}_user_id_idx"))
            ),
        ];

        self.timed(async {
            let mut tx = self.pool.begin().await?;
            // Serialize concurrent bootstraps across processes
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(collection)
                .execute(&mut *tx)
                .await?;
            for statement in &statements {
                sqlx::query(statement).execute(&mut *tx).await?;
            }
            tx.commit().await?;
            Ok::<_, AppError>(())
        })
        .await?;

        self.initialized.store(true, Ordering::Release);
        info!(
            "Collection {} ready (dimension {}, hnsw ef_search {})",
            collection, self.dimension, self.ef_search
        );
        Ok(())
    }

    async fn insert(&self, record: &ResumeVector) -> Result<()> {
        check_dimension(record, self.dimension)?;
        let table = self.table();
        self.timed(insert_row(&self.pool, &table, record)).await?;
        debug!("Inserted resume {} into {}", record.id, self.collection);
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        target_company: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredResume>> {
        if query.len() != self.dimension {
            return Err(AppError::Validation(format!(
                "query dimension {} does not match collection dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let sql = search_sql(&self.table(), target_company.is_some());
        let ef_search = format!(
            "SET LOCAL hnsw.ef_search = {}",
            ef_search_for(self.ef_search, limit)
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let query_vec = Vector::from(query.to_vec());

        let rows = self
            .timed(async {
                let mut tx = self.pool.begin().await?;
                let statement = match target_company {
                    Some(company) => sqlx::query(&sql).bind(&query_vec).bind(company),
                    None => {
                        sqlx::query(&ef_search).execute(&mut *tx).await?;
                        sqlx::query(&sql).bind(&query_vec)
                    }
                };
                let rows = statement.bind(limit).fetch_all(&mut *tx).await?;
                tx.commit().await?;
                Ok::<_, AppError>(rows)
            })
            .await?;

        rows.iter()
            .map(|row| -> Result<ScoredResume> {
                let score: f64 = row.try_get("score")?;
                Ok(ScoredResume {
                    record: row_to_record(row)?,
                    score: score as f32,
                })
            })
            .collect()
    }

    async fn get(&self, id: &str) -> Result<Option<ResumeVector>> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", self.table());
        let row = self
            .timed(async {
                Ok::<_, AppError>(sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?)
            })
            .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ResumeVector>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE user_id = $1 ORDER BY created_at DESC",
            self.table()
        );
        let rows = self
            .timed(async {
                Ok::<_, AppError>(sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?)
            })
            .await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn list_by_company(&self, target_company: &str) -> Result<Vec<ResumeVector>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE target_company = $1",
            self.table()
        );
        let rows = self
            .timed(async {
                Ok::<_, AppError>(sqlx::query(&sql)
                    .bind(target_company)
                    .fetch_all(&self.pool)
                    .await?)
            })
            .await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn update_target_company(
        &self,
        id: &str,
        target_company: &str,
    ) -> Result<ResumeVector> {
        let table = self.table();
        let select = format!("SELECT {COLUMNS} FROM {table} WHERE id = $1 FOR UPDATE");
        let delete = format!("DELETE FROM {table} WHERE id = $1");

        // Delete and reinsert commit together
        let record = self
            .timed(async {
                let mut tx = self.pool.begin().await?;
                let row = sqlx::query(&select)
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("resume {id}")))?;

                let mut record = row_to_record(&row)?;
                record.target_company = target_company.to_string();
                record.created_at = Utc::now();

                sqlx::query(&delete).bind(id).execute(&mut *tx).await?;
                insert_row(&mut *tx, &table, &record).await?;
                tx.commit().await?;
                Ok::<_, AppError>(record)
            })
            .await?;

        info!("Updated target company of resume {} to {:?}", id, target_company);
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table());
        let result = self
            .timed(async {
                Ok::<_, AppError>(sqlx::query(&sql).bind(id).execute(&self.pool).await?)
            })
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn distinct_companies(&self) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT target_company FROM {} WHERE target_company <> '' ORDER BY target_company",
            self.table()
        );
        self.timed(async {
            Ok::<_, AppError>(sqlx::query_scalar::<_, String>(&sql)
                .fetch_all(&self.pool)
                .await?)
        })
        .await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResumeFeatures;

    #[test]
    fn test_collection_names_are_plain_identifiers() {
        assert!(validate_collection_name("resume_vectors").is_ok());
        assert!(validate_collection_name("_v2").is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("1resumes").is_err());
        assert!(validate_collection_name("resumes; DROP TABLE x").is_err());
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("resume_vectors"), "\"resume_vectors\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_filtered_search_ranks_company_rows_exactly() {
        let filtered = search_sql("\"resumes\"", true);
        assert!(filtered.contains("AS MATERIALIZED"));
        assert!(filtered.contains("WHERE target_company = $2"));
        assert!(filtered.contains("LIMIT $3"));

        let unfiltered = search_sql("\"resumes\"", false);
        assert!(!unfiltered.contains("$3"));
        assert!(!unfiltered.contains("target_company = "));
        assert!(unfiltered.contains("LIMIT $2"));
    }

    #[test]
    fn test_ef_search_covers_limit() {
        assert_eq!(ef_search_for(40, 10), 40);
        assert_eq!(ef_search_for(40, 100), 100);
        assert_eq!(ef_search_for(40, 5000), MAX_EF_SEARCH);
    }

    // Database tests run when DATABASE_URL points at Postgres with pgvector
    // and pass trivially otherwise.
    async fn test_store(dimension: usize) -> Option<PgVectorStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.unwrap();
        let collection = format!("rv_test_{}", uuid::Uuid::new_v4().simple());
        let store =
            PgVectorStore::new(pool, &collection, dimension, 40, Duration::from_secs(10)).unwrap();
        store.ensure_collection().await.unwrap();
        Some(store)
    }

    async fn drop_table(store: &PgVectorStore) {
        sqlx::query(&format!("DROP TABLE {}", store.table()))
            .execute(store.pool())
            .await
            .unwrap();
    }

    fn record(company: &str, skills: &[&str], vector: Vec<f32>) -> ResumeVector {
        ResumeVector::new(
            "user-1",
            format!("Engineer targeting {company}"),
            ResumeFeatures {
                skills: skills.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
            company,
            vector,
        )
    }

    #[tokio::test]
    async fn test_round_trip_against_postgres() {
        let Some(store) = test_store(3).await else {
            return;
        };

        let record = record("Acme Corp", &["Rust"], vec![1.0, 0.0, 0.0]);
        store.insert(&record).await.unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], Some("Acme Corp"), 5).await.unwrap();
        assert_eq!(hits[0].record.id, record.id);
        assert_eq!(hits[0].record.skills, vec!["Rust"]);
        let hits = store.search(&[1.0, 0.0, 0.0], None, 5).await.unwrap();
        assert_eq!(hits.len(), 1);

        assert_eq!(store.list_by_user("user-1").await.unwrap().len(), 1);
        assert!(store.delete(&record.id).await.unwrap());
        assert!(!store.delete(&record.id).await.unwrap());
        drop_table(&store).await;
    }

    #[tokio::test]
    async fn test_filtered_search_finds_rare_company() {
        let Some(store) = test_store(3).await else {
            return;
        };

        let acme = record("Acme Corp", &["Rust"], vec![0.0, 1.0, 0.0]);
        store.insert(&acme).await.unwrap();
        for i in 0..300u16 {
            let jitter = f32::from(i) / 1000.0;
            let other = record("Globex", &["Go"], vec![1.0, jitter, 0.5 - jitter]);
            store.insert(&other).await.unwrap();
        }

        let hits = store.search(&[1.0, 0.0, 0.0], Some("Acme Corp"), 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.id, acme.id);

        let hits = store.search(&[1.0, 0.0, 0.0], Some("Globex"), 10).await.unwrap();
        assert_eq!(hits.len(), 10);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        drop_table(&store).await;
    }

    #[tokio::test]
    async fn test_ensure_collection_is_idempotent_across_instances() {
        let Some(store) = test_store(3).await else {
            return;
        };
        let record = record("Acme Corp", &["Rust"], vec![1.0, 0.0, 0.0]);
        store.insert(&record).await.unwrap();

        let second = PgVectorStore::new(
            store.pool().clone(),
            &store.collection,
            3,
            40,
            Duration::from_secs(10),
        )
        .unwrap();
        second.ensure_collection().await.unwrap();
        second.ensure_collection().await.unwrap();

        assert!(second.get(&record.id).await.unwrap().is_some());
        drop_table(&store).await;
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let Some(store) = test_store(3).await else {
            return;
        };

        let short = record("Acme Corp", &[], vec![1.0, 0.0]);
        assert!(matches!(store.insert(&short).await, Err(AppError::Validation(_))));
        assert!(matches!(
            store.search(&[1.0, 0.0], None, 5).await,
            Err(AppError::Validation(_))
        ));

        // The column type enforces the dimension for writes that bypass the store
        let sql = format!(
            "INSERT INTO {} (id, user_id, resume_text, education_level, vector) \
             VALUES ('raw', 'u', 't', 'High School', '[1,0]')",
            store.table()
        );
        assert!(sqlx::query(&sql).execute(store.pool()).await.is_err());
        drop_table(&store).await;
    }

    #[tokio::test]
    async fn test_update_target_company_replaces_record() {
        let Some(store) = test_store(3).await else {
            return;
        };
        let record = record("Acme Corp", &["Rust"], vec![1.0, 0.0, 0.0]);
        store.insert(&record).await.unwrap();

        assert!(matches!(
            store.update_target_company("missing", "Globex").await,
            Err(AppError::NotFound(_))
        ));

        let updated = store.update_target_company(&record.id, "Globex").await.unwrap();
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.target_company, "Globex");
        assert_eq!(updated.skills, record.skills);
        assert!(updated.created_at >= record.created_at);

        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE id = $1", store.table()))
                .bind(&record.id)
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(count, 1);
        assert!(store.list_by_company("Acme Corp").await.unwrap().is_empty());
        assert_eq!(store.distinct_companies().await.unwrap(), vec!["Globex"]);
        drop_table(&store).await;
    }

    #[tokio::test]
    async fn test_malformed_stored_list_degrades_only_that_record() {
        let Some(store) = test_store(3).await else {
            return;
        };
        let broken = record("Acme Corp", &["Rust"], vec![1.0, 0.0, 0.0]);
        let intact = record("Acme Corp", &["Go"], vec![0.9, 0.1, 0.0]);
        store.insert(&broken).await.unwrap();
        store.insert(&intact).await.unwrap();

        let sql = format!(
            "UPDATE {} SET skills = to_jsonb('[\"unterminated'::text), \
             job_titles = to_jsonb('Engineer, Lead'::text) WHERE id = $1",
            store.table()
        );
        sqlx::query(&sql).bind(&broken.id).execute(store.pool()).await.unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], Some("Acme Corp"), 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        let degraded = hits.iter().find(|h| h.record.id == broken.id).unwrap();
        assert!(degraded.record.skills.is_empty());
        assert_eq!(degraded.record.job_titles, vec!["Engineer", "Lead"]);
        let other = hits.iter().find(|h| h.record.id == intact.id).unwrap();
        assert_eq!(other.record.skills, vec!["Go"]);
        drop_table(&store).await;
    }

    #[tokio::test]
    async fn test_long_identifiers_are_stored() {
        let Some(store) = test_store(3).await else {
            return;
        };
        let company = "Acme ".repeat(40);
        let mut long = record(company.trim(), &[], vec![1.0, 0.0, 0.0]);
        long.user_id = "u".repeat(150);
        store.insert(&long).await.unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], Some(company.trim()), 5).await.unwrap();
        assert_eq!(hits[0].record.id, long.id);
        assert_eq!(store.list_by_user(&long.user_id).await.unwrap().len(), 1);
        drop_table(&store).await;
    }
}
