//! SQLite persistence for drafts, comments and analysis runs.

use crate::models::*;
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use std::time::Duration;
use tracing::{debug, info};

/// Bootstrap schema for local runs and tests
pub const SCHEMA: &str = include_str!("schema.sql");

/// Upper bound on comments returned by the dashboard view
pub const DASHBOARD_COMMENT_LIMIT: i64 = 200;

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    draft_id: i64,
    section_id: Option<i64>,
    section_code: Option<String>,
    section_title: Option<String>,
    comment_text: String,
    stakeholder_type: Option<String>,
    sentiment: Option<String>,
    confidence: Option<f64>,
    analyzed_at: Option<DateTime<Utc>>,
    gemini_response: Option<String>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            draft_id: row.draft_id,
            section_id: row.section_id,
            section_code: row.section_code,
            section_title: row.section_title,
            comment_text: row.comment_text,
            stakeholder_type: row.stakeholder_type,
            sentiment: row.sentiment.as_deref().and_then(Sentiment::from_label),
            confidence: row.confidence,
            analyzed_at: row.analyzed_at,
            gemini_response: row
                .gemini_response
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
        }
    }
}

#[derive(sqlx::FromRow)]
struct RunRow {
    id: i64,
    draft_id: i64,
    total_comments: i64,
    sentiment_counts: Json<SentimentCounts>,
    top_keywords: Json<Vec<Keyword>>,
    draft_summary: String,
    top_themes: Json<Vec<String>>,
    priority_recommendation: String,
    stakeholder_suggestions: Json<Value>,
    gemini_response: Json<Value>,
    run_at: DateTime<Utc>,
}

impl From<RunRow> for AnalysisRun {
    fn from(row: RunRow) -> Self {
        AnalysisRun {
            id: row.id,
            draft_id: row.draft_id,
            total_comments: row.total_comments.max(0) as usize,
            sentiment_counts: row.sentiment_counts.0,
            top_keywords: row.top_keywords.0,
            draft_summary: row.draft_summary,
            top_themes: row.top_themes.0,
            priority_recommendation: row.priority_recommendation,
            stakeholder_suggestions: row.stakeholder_suggestions.0,
            gemini_response: row.gemini_response.0,
            run_at: row.run_at,
        }
    }
}

const COMMENT_COLUMNS: &str = "c.id, c.draft_id, c.section_id, s.section_code, s.section_title, \
     c.comment_text, c.stakeholder_type, c.sentiment, c.confidence, c.analyzed_at, c.gemini_response";

/// Drafts, sections and comments to load in one go
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportDocument {
    pub drafts: Vec<ImportDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportDraft {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<ImportSection>,
    #[serde(default)]
    pub comments: Vec<ImportComment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSection {
    pub code: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportComment {
    pub text: String,
    #[serde(default)]
    pub stakeholder_type: Option<String>,
    /// Matches an `ImportSection::code` of the same draft
    #[serde(default)]
    pub section: Option<String>,
}

/// Counts of rows created by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub drafts: usize,
    pub sections: usize,
    pub comments: usize,
}

/// Handle to the relational store. Cloning shares the pool.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url`
    pub async fn connect(database_url: &str) -> ConsultResult<Self> {
        info!("Connecting to database: {}", database_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Single-connection in-memory store; each call gets a fresh database
    pub async fn in_memory() -> ConsultResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the tables if they are missing
    pub async fn init_schema(&self) -> ConsultResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn list_drafts(&self) -> ConsultResult<Vec<Draft>> {
        let drafts = sqlx::query_as::<_, Draft>("SELECT id, title FROM drafts ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(drafts)
    }

    pub async fn get_draft(&self, draft_id: i64) -> ConsultResult<Option<Draft>> {
        let draft = sqlx::query_as::<_, Draft>("SELECT id, title FROM drafts WHERE id = ?")
            .bind(draft_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(draft)
    }

    pub async fn create_draft(&self, title: &str) -> ConsultResult<i64> {
        let result = sqlx::query("INSERT INTO drafts (title) VALUES (?)")
            .bind(title)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn create_section(
        &self,
        draft_id: i64,
        section_code: &str,
        section_title: Option<&str>,
    ) -> ConsultResult<i64> {
        let result = sqlx::query(
            "INSERT INTO sections (draft_id, section_code, section_title) VALUES (?, ?, ?)",
        )
        .bind(draft_id)
        .bind(section_code)
        .bind(section_title)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn create_comment(&self, comment: &NewComment) -> ConsultResult<i64> {
        let result = sqlx::query(
            "INSERT INTO comments (draft_id, section_id, comment_text, stakeholder_type) VALUES (?, ?, ?, ?)",
        )
        .bind(comment.draft_id)
        .bind(comment.section_id)
        .bind(&comment.comment_text)
        .bind(&comment.stakeholder_type)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Comments of a draft ordered by id, optionally capped
    pub async fn comments_for_draft(&self, draft_id: i64, limit: Option<i64>) -> ConsultResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {} FROM comments c LEFT JOIN sections s ON s.id = c.section_id \
             WHERE c.draft_id = ? ORDER BY c.id ASC LIMIT ?",
            COMMENT_COLUMNS
        );
        // a negative LIMIT means no limit in SQLite
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(draft_id)
            .bind(limit.unwrap_or(-1))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    /// Store one verdict on its comment. Returns false when no comment of
    /// `draft_id` has that id.
    pub async fn record_classification(
        &self,
        draft_id: i64,
        classification: &Classification,
        raw_response: &Value,
        analyzed_at: DateTime<Utc>,
    ) -> ConsultResult<bool> {
        let result = sqlx::query(
            "UPDATE comments SET sentiment = ?, confidence = ?, gemini_response = ?, analyzed_at = ? \
             WHERE id = ? AND draft_id = ?",
        )
        .bind(classification.sentiment.as_str())
        .bind(classification.confidence)
        .bind(raw_response.to_string())
        .bind(analyzed_at)
        .bind(classification.id)
        .bind(draft_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a run; returns its id
    pub async fn insert_run(&self, run: &NewAnalysisRun, run_at: DateTime<Utc>) -> ConsultResult<i64> {
        let result = sqlx::query(
            "INSERT INTO draft_analysis_run (draft_id, total_comments, sentiment_counts, top_keywords, \
             draft_summary, top_themes, priority_recommendation, stakeholder_suggestions, gemini_response, run_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(run.draft_id)
        .bind(run.total_comments as i64)
        .bind(Json(&run.sentiment_counts))
        .bind(Json(&run.top_keywords))
        .bind(&run.summary.draft_summary)
        .bind(Json(&run.summary.top_themes))
        .bind(&run.summary.priority_recommendation)
        .bind(Json(&run.summary.stakeholder_suggestions))
        .bind(Json(&run.gemini_response))
        .bind(run_at)
        .execute(&self.pool)
        .await?;
        debug!(draft_id = run.draft_id, run_id = result.last_insert_rowid(), "Analysis run stored");
        Ok(result.last_insert_rowid())
    }

    /// Most recent run for a draft
    pub async fn latest_run(&self, draft_id: i64) -> ConsultResult<Option<AnalysisRun>> {
        let row = sqlx::query_as::<_, RunRow>(
            "SELECT id, draft_id, total_comments, sentiment_counts, top_keywords, draft_summary, top_themes, \
             priority_recommendation, stakeholder_suggestions, gemini_response, run_at \
             FROM draft_analysis_run WHERE draft_id = ? ORDER BY run_at DESC, id DESC LIMIT 1",
        )
        .bind(draft_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(AnalysisRun::from))
    }

    pub async fn count_runs(&self, draft_id: i64) -> ConsultResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM draft_analysis_run WHERE draft_id = ?")
            .bind(draft_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Load a document in a single transaction
    pub async fn import(&self, document: &ImportDocument) -> ConsultResult<ImportSummary> {
        let mut tx = self.pool.begin().await?;
        let mut summary = ImportSummary::default();

        for draft in &document.drafts {
            let draft_id = sqlx::query("INSERT INTO drafts (title) VALUES (?)")
                .bind(&draft.title)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
            summary.drafts += 1;

            let mut section_ids = std::collections::HashMap::new();
            for section in &draft.sections {
                let section_id = sqlx::query(
                    "INSERT INTO sections (draft_id, section_code, section_title) VALUES (?, ?, ?)",
                )
                .bind(draft_id)
                .bind(&section.code)
                .bind(&section.title)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
                section_ids.insert(section.code.as_str(), section_id);
                summary.sections += 1;
            }

            for comment in &draft.comments {
                let section_id = match comment.section.as_deref() {
                    Some(code) => Some(*section_ids.get(code).ok_or_else(|| {
                        ConsultError::Validation(format!(
                            "Comment in draft '{}' references unknown section '{}'",
                            draft.title, code
                        ))
                    })?),
                    None => None,
                };
                sqlx::query(
                    "INSERT INTO comments (draft_id, section_id, comment_text, stakeholder_type) VALUES (?, ?, ?, ?)",
                )
                .bind(draft_id)
                .bind(section_id)
                .bind(&comment.text)
                .bind(&comment.stakeholder_type)
                .execute(&mut *tx)
                .await?;
                summary.comments += 1;
            }
        }

        tx.commit().await?;
        info!(
            drafts = summary.drafts,
            sections = summary.sections,
            comments = summary.comments,
            "Import complete"
        );
        Ok(summary)
    }
}
