#![deny(warnings)]

//! Persistence layer: a SQLite document store keyed by
//! `collection/document`, holding one JSON object per key.
//!
//! Writes have set semantics: a document is replaced as a whole.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};
use std::path::Path;
use workshop_core::survey::{ParticipantState, QuestionnaireResponse, SessionRecord};

/// Collection of enrollment records.
pub const SESSIONS: &str = "sessions";
/// Collection of questionnaire responses.
pub const RESPONSES: &str = "responses";
/// Collection of the latest role and group per participant.
pub const SESSION_STATES: &str = "session_states";

/// Returns the default SQLite URL used for local saves.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./saves/workshop.db"
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document fields must be a JSON object")]
    NotAnObject,
    #[error("invalid document key `{0}`")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database file named by a SQLite URL; `None` for in-memory databases.
fn database_file(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

/// Open (creating if needed) the database at `url` and apply migrations.
///
/// Missing parent directories of a file database are created.
pub async fn init_db(url: &str) -> Result<SqlitePool, StoreError> {
    if let Some(parent) = database_file(url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = if url.contains(":memory:") {
        // every connection would get its own empty in-memory database
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await?
    };
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!(url, "document store ready");
    Ok(pool)
}

fn check_key(key: &str) -> Result<(), StoreError> {
    if key.trim().is_empty() || key.contains('/') {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Insert or replace the document `collection/id`.
pub async fn upsert_document(
    pool: &SqlitePool,
    collection: &str,
    id: &str,
    fields: &Value,
) -> Result<(), StoreError> {
    check_key(collection)?;
    check_key(id)?;
    if !fields.is_object() {
        return Err(StoreError::NotAnObject);
    }
    sqlx::query(
        r#"
        INSERT INTO documents (collection, document_id, fields, updated_at)
        VALUES (?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(collection, document_id)
        DO UPDATE SET fields = excluded.fields, updated_at = excluded.updated_at
        "#,
    )
    .bind(collection)
    .bind(id)
    .bind(serde_json::to_string(fields)?)
    .execute(pool)
    .await?;
    debug!(collection, id, "document written");
    Ok(())
}

/// Serialize `value` and store it as `collection/id`.
pub async fn set_document<T: Serialize>(
    pool: &SqlitePool,
    collection: &str,
    id: &str,
    value: &T,
) -> Result<(), StoreError> {
    upsert_document(pool, collection, id, &serde_json::to_value(value)?).await
}

pub async fn get_document(
    pool: &SqlitePool,
    collection: &str,
    id: &str,
) -> Result<Option<Value>, StoreError> {
    let row = sqlx::query("SELECT fields FROM documents WHERE collection = ? AND document_id = ?")
        .bind(collection)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => {
            let text: String = row.try_get("fields")?;
            Ok(Some(serde_json::from_str(&text)?))
        }
        None => Ok(None),
    }
}

/// Fetch and deserialize `collection/id`.
pub async fn get_as<T: DeserializeOwned>(
    pool: &SqlitePool,
    collection: &str,
    id: &str,
) -> Result<Option<T>, StoreError> {
    match get_document(pool, collection, id).await? {
        Some(v) => Ok(Some(serde_json::from_value(v)?)),
        None => Ok(None),
    }
}

/// All documents of a collection, ordered by id.
pub async fn list_documents(
    pool: &SqlitePool,
    collection: &str,
) -> Result<Vec<(String, Value)>, StoreError> {
    let rows = sqlx::query(
        "SELECT document_id, fields FROM documents WHERE collection = ? ORDER BY document_id",
    )
    .bind(collection)
    .fetch_all(pool)
    .await?;
    rows.into_iter()
        .map(|row| -> Result<(String, Value), StoreError> {
            let id: String = row.try_get("document_id")?;
            let text: String = row.try_get("fields")?;
            Ok((id, serde_json::from_str(&text)?))
        })
        .collect()
}

/// Store an enrollment record under `sessions/<session_id>`.
pub async fn save_session(pool: &SqlitePool, record: &SessionRecord) -> Result<(), StoreError> {
    set_document(pool, SESSIONS, &record.session_id, record).await?;
    info!(session = %record.session_id, group = record.group, "session recorded");
    Ok(())
}

/// Store a questionnaire under `responses/<session_id>`.
pub async fn save_response(
    pool: &SqlitePool,
    response: &QuestionnaireResponse,
) -> Result<(), StoreError> {
    set_document(pool, RESPONSES, &response.session_id, response).await?;
    info!(session = %response.session_id, "questionnaire recorded");
    Ok(())
}

/// Store a participant's role and group under `session_states/<participant>`.
pub async fn save_participant_state(
    pool: &SqlitePool,
    participant: &str,
    state: &ParticipantState,
) -> Result<(), StoreError> {
    set_document(pool, SESSION_STATES, participant, state).await?;
    debug!(participant, group = state.group, "participant state recorded");
    Ok(())
}
