// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sqlite Audit Sink
//!
//! Reference `AuditSink` implementation over a single `tasks` table,
//! matching the schema and upsert/cleanup semantics of
//! `original_source/challenge-5`'s `save_task_to_database` /
//! `get_task_status` / `cleanup_completed_tasks` functions, adapted to
//! `sqlx`'s async sqlite pool instead of a per-call `sqlite3.connect`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use scheduler_domain::{AuditSink, ExecutorKind, Payload, SchedulerError, Task, TaskId, TaskStatus};

pub struct SqliteAuditSink {
    pool: SqlitePool,
}

impl SqliteAuditSink {
    /// Opens (creating if absent) the sqlite database at `path` and runs
    /// the one-table schema migration.
    pub async fn connect(path: &str) -> Result<Self, SchedulerError> {
        let url = format!("sqlite://{path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .map_err(|e| SchedulerError::AuditSinkUnavailable(format!("failed to open {path}: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                payload TEXT NOT NULL,
                priority TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT,
                result TEXT,
                error_message TEXT,
                processing_time_ms REAL,
                retry_count INTEGER NOT NULL,
                worker_id TEXT,
                executor_kind TEXT
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| SchedulerError::AuditSinkUnavailable(format!("failed to create tasks table: {e}")))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    async fn upsert(&self, task: &Task) -> Result<(), SchedulerError> {
        let payload_json = task
            .payload
            .to_json_string()
            .map_err(|e| SchedulerError::internal(format!("failed to serialize payload: {e}")))?;
        let result_json = task
            .result
            .as_ref()
            .map(|r| r.to_json_string())
            .transpose()
            .map_err(|e| SchedulerError::internal(format!("failed to serialize result: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO tasks
                (id, name, payload, priority, status, created_at, started_at, completed_at,
                 result, error_message, processing_time_ms, retry_count, worker_id, executor_kind)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                started_at = excluded.started_at,
                completed_at = excluded.completed_at,
                result = excluded.result,
                error_message = excluded.error_message,
                processing_time_ms = excluded.processing_time_ms,
                retry_count = excluded.retry_count,
                worker_id = excluded.worker_id,
                executor_kind = excluded.executor_kind
            "#,
        )
        .bind(task.id.to_string())
        .bind(&task.name)
        .bind(payload_json)
        .bind(task.priority.to_string())
        .bind(task.status.to_string())
        .bind(task.created_at.to_rfc3339())
        .bind(task.started_at.map(|t| t.to_rfc3339()))
        .bind(task.completed_at.map(|t| t.to_rfc3339()))
        .bind(result_json)
        .bind(&task.error_message)
        .bind(task.processing_time_ms)
        .bind(task.retry_count as i64)
        .bind(&task.worker_id)
        .bind(task.executor_kind.map(|k| k.to_string()))
        .execute(&self.pool)
        .await
        .map_err(|e| SchedulerError::AuditSinkUnavailable(format!("upsert failed: {e}")))?;

        Ok(())
    }

    async fn lookup(&self, id: TaskId) -> Result<Option<Task>, SchedulerError> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SchedulerError::AuditSinkUnavailable(format!("lookup failed: {e}")))?;

        let Some(row) = row else { return Ok(None) };
        row_to_task(&row).map(Some)
    }

    async fn cleanup(&self, older_than: DateTime<Utc>) -> Result<u64, SchedulerError> {
        let result = sqlx::query(
            "DELETE FROM tasks WHERE status IN ('completed', 'failed', 'cancelled') AND completed_at < ?",
        )
        .bind(older_than.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| SchedulerError::AuditSinkUnavailable(format!("cleanup failed: {e}")))?;

        Ok(result.rows_affected())
    }
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Result<Task, SchedulerError> {
    use std::str::FromStr;

    let id: String = row.try_get("id").map_err(row_err)?;
    let name: String = row.try_get("name").map_err(row_err)?;
    let payload_json: String = row.try_get("payload").map_err(row_err)?;
    let priority: String = row.try_get("priority").map_err(row_err)?;
    let status: String = row.try_get("status").map_err(row_err)?;
    let created_at: String = row.try_get("created_at").map_err(row_err)?;
    let started_at: Option<String> = row.try_get("started_at").map_err(row_err)?;
    let completed_at: Option<String> = row.try_get("completed_at").map_err(row_err)?;
    let result_json: Option<String> = row.try_get("result").map_err(row_err)?;
    let error_message: Option<String> = row.try_get("error_message").map_err(row_err)?;
    let processing_time_ms: Option<f64> = row.try_get("processing_time_ms").map_err(row_err)?;
    let retry_count: i64 = row.try_get("retry_count").map_err(row_err)?;
    let worker_id: Option<String> = row.try_get("worker_id").map_err(row_err)?;
    let executor_kind: Option<String> = row.try_get("executor_kind").map_err(row_err)?;

    Ok(Task {
        id: TaskId::from_str(&id).map_err(|e| SchedulerError::internal(format!("bad stored task id: {e}")))?,
        name,
        payload: Payload::from_json_str(&payload_json)
            .map_err(|e| SchedulerError::internal(format!("bad stored payload: {e}")))?,
        priority: priority
            .parse()
            .map_err(|_| SchedulerError::internal(format!("bad stored priority: {priority}")))?,
        max_retries: retry_count.max(0) as u32,
        timeout_seconds: 0,
        retry_count: retry_count.max(0) as u32,
        status: status
            .parse::<TaskStatus>()
            .map_err(|_| SchedulerError::internal(format!("bad stored status: {status}")))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| SchedulerError::internal(format!("bad stored created_at: {e}")))?
            .with_timezone(&Utc),
        started_at: started_at
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
            .transpose()
            .map_err(|e| SchedulerError::internal(format!("bad stored started_at: {e}")))?,
        completed_at: completed_at
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
            .transpose()
            .map_err(|e| SchedulerError::internal(format!("bad stored completed_at: {e}")))?,
        result: result_json
            .map(|s| Payload::from_json_str(&s))
            .transpose()
            .map_err(|e| SchedulerError::internal(format!("bad stored result: {e}")))?,
        error_message,
        worker_id,
        executor_kind: executor_kind.and_then(|k| match k.as_str() {
            "process" => Some(ExecutorKind::Process),
            "thread" => Some(ExecutorKind::Thread),
            _ => None,
        }),
        processing_time_ms,
    })
}

fn row_err(e: sqlx::Error) -> SchedulerError {
    SchedulerError::AuditSinkUnavailable(format!("malformed row: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduler_domain::Priority;

    #[tokio::test]
    async fn upsert_then_lookup_round_trips_a_task() {
        let sink = SqliteAuditSink::connect(":memory:").await.unwrap();
        let mut task = Task::new("compute", Payload::empty(), Priority::High, 2, 30);
        task.mark_running(ExecutorKind::Process).unwrap();
        task.mark_completed(Payload::empty(), 12.5, "process-0".to_string());

        sink.upsert(&task).await.unwrap();
        let fetched = sink.lookup(task.id).await.unwrap().expect("task should be persisted");
        assert_eq!(fetched.id, task.id);
        assert_eq!(fetched.status, TaskStatus::Completed);
        assert_eq!(fetched.worker_id.as_deref(), Some("process-0"));
    }

    #[tokio::test]
    async fn lookup_of_unknown_id_is_none() {
        let sink = SqliteAuditSink::connect(":memory:").await.unwrap();
        assert!(sink.lookup(TaskId::new()).await.unwrap().is_none());
    }
}
