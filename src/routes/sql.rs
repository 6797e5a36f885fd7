//! SQL generation endpoints: standalone NL→SQL and the compound
//! ask-database pipeline (schema → SQL → execution → analysis).

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ai::{CompletionParams, PromptBuilder, TURN_END};
use crate::db;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate-sql", post(generate_sql))
        .route("/ask-database", post(ask_database))
}

// ── /generate-sql ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateSqlRequest {
    #[serde(default)]
    pub request: String,
    #[serde(default)]
    pub schema: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateSqlResponse {
    pub sql: String,
}

/// Translate a natural-language request into a single SQL statement. When the
/// caller supplies no schema text, a compact one is introspected live; if that
/// fails the prompt simply goes out without schema context.
pub async fn generate_sql(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateSqlRequest>,
) -> Result<Json<GenerateSqlResponse>, ApiError> {
    if req.request.is_empty() {
        return Err(ApiError::MissingInput("request"));
    }

    let schema_text = match req.schema.filter(|s| !s.is_empty()) {
        Some(supplied) => supplied,
        None => db::fetch_schema(&state.config)
            .await
            .map(|snapshot| snapshot.to_compact())
            .unwrap_or_default(),
    };

    let mut system = String::from(
        "You are an expert SQL query generator. \
         Generate only the SQL query without explanations.",
    );
    if !schema_text.is_empty() {
        system.push_str("\nDatabase schema: ");
        system.push_str(&schema_text);
    }

    let prompt = PromptBuilder::new()
        .system(system)
        .user(format!("Generate a SQL query for: {}", req.request))
        .render();
    let params = CompletionParams {
        max_tokens: 256,
        temperature: 0.3,
        stop: vec![TURN_END.to_owned()],
    };
    let raw = state.llama.complete(&prompt, &params).await?;

    Ok(Json(GenerateSqlResponse {
        sql: ensure_terminator(&raw),
    }))
}

// ── /ask-database ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AskDatabaseRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskDatabaseResponse {
    pub question: String,
    pub sql: String,
    pub row_count: usize,
    pub data: Vec<Map<String, Value>>,
    pub analysis: String,
}

/// Answer a question about the database: introspect the schema, generate a
/// query, run it, then ask the model to summarize the rows. Execution failure
/// short-circuits before the analysis step.
pub async fn ask_database(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskDatabaseRequest>,
) -> Result<Json<AskDatabaseResponse>, ApiError> {
    if req.question.is_empty() {
        return Err(ApiError::MissingInput("question"));
    }
    if !state.llama.is_healthy().await {
        return Err(ApiError::BackendUnavailable);
    }

    let snapshot = db::fetch_schema(&state.config)
        .await
        .map_err(|e| ApiError::SchemaUnavailable(e.to_string()))?;

    let system = format!(
        "You are an expert PostgreSQL query generator. \
         Generate only the SQL query without explanations or markdown.\n\n\
         Database schema:\n{}",
        snapshot.to_prompt_block()
    );
    let prompt = PromptBuilder::new()
        .system(system)
        .user(&req.question)
        .seed_assistant("SELECT")
        .render();
    let params = CompletionParams {
        max_tokens: 256,
        temperature: 0.2,
        stop: vec![TURN_END.to_owned()],
    };
    let raw = state.llama.complete(&prompt, &params).await?;

    // The completion continues the seeded token, so stitch it back on.
    let sql = ensure_terminator(truncate_code_fence(&format!("SELECT {raw}")));

    let output = db::run_query(&state.config, &sql)
        .await
        .map_err(|e| ApiError::QueryFailed {
            sql: sql.clone(),
            details: e.to_string(),
        })?;

    let rows_text = serde_json::to_string_pretty(&output.rows)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let analysis_system =
        "You are a data analyst. Explain query results in clear, plain language.";
    let analysis_user = format!(
        "Question: {}\n\nSQL query: {}\n\nThe query returned {} rows:\n{}\n\n\
         Summarize what these results show.",
        req.question, sql, output.row_count, rows_text
    );
    let analysis_prompt = PromptBuilder::new()
        .system(analysis_system)
        .user(analysis_user)
        .render();
    let analysis_params = CompletionParams {
        max_tokens: 512,
        temperature: 0.7,
        stop: vec![TURN_END.to_owned()],
    };
    let analysis = state.llama.complete(&analysis_prompt, &analysis_params).await?;

    Ok(Json(AskDatabaseResponse {
        question: req.question,
        sql,
        row_count: output.row_count,
        data: output.rows,
        analysis,
    }))
}

// ── Generated-SQL normalization ──────────────────────────────────────────────

/// Append the statement terminator unless the text already ends with one.
fn ensure_terminator(sql: &str) -> String {
    let trimmed = sql.trim_end();
    if trimmed.ends_with(';') {
        trimmed.to_owned()
    } else {
        format!("{trimmed};")
    }
}

/// Drop everything from the first code-fence marker on. Models sometimes
/// append a fenced copy or commentary after the bare statement.
fn truncate_code_fence(sql: &str) -> &str {
    match sql.find("```") {
        Some(pos) => sql[..pos].trim_end(),
        None => sql,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::ai::LlamaClient;
    use crate::config::Config;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            config: Arc::new(Config::from_env()),
            llama: LlamaClient::new("http://127.0.0.1:1"),
        })
    }

    #[test]
    fn terminator_appended_when_missing() {
        assert_eq!(ensure_terminator("SELECT 1"), "SELECT 1;");
    }

    #[test]
    fn terminator_not_duplicated() {
        assert_eq!(ensure_terminator("SELECT 1;"), "SELECT 1;");
    }

    #[test]
    fn terminator_applied_after_trailing_whitespace() {
        assert_eq!(ensure_terminator("SELECT 1\n"), "SELECT 1;");
    }

    #[test]
    fn code_fence_and_everything_after_is_dropped() {
        let raw = "SELECT * FROM users\n```\nexplanatory text";
        assert_eq!(truncate_code_fence(raw), "SELECT * FROM users");
    }

    #[test]
    fn text_without_fence_is_untouched() {
        assert_eq!(truncate_code_fence("SELECT 1"), "SELECT 1");
    }

    #[tokio::test]
    async fn empty_request_is_rejected() {
        let result = generate_sql(
            State(test_state()),
            Json(GenerateSqlRequest {
                request: String::new(),
                schema: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::MissingInput("request"))));
    }

    #[tokio::test]
    async fn empty_question_is_rejected() {
        let result = ask_database(
            State(test_state()),
            Json(AskDatabaseRequest {
                question: String::new(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::MissingInput("question"))));
    }

    #[tokio::test]
    async fn ask_database_returns_503_when_backend_is_down() {
        let result = ask_database(
            State(test_state()),
            Json(AskDatabaseRequest {
                question: "how many users".into(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BackendUnavailable)));
    }
}
