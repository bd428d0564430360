use async_trait::async_trait;
use lendfront::config::StorageConfig;
use lendfront::invoices::{
    newest_first_page, InvoiceId, InvoiceRecord, InvoiceRepository, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock(
    records: &Mutex<Vec<InvoiceRecord>>,
) -> Result<MutexGuard<'_, Vec<InvoiceRecord>>, RepositoryError> {
    records
        .lock()
        .map_err(|_| RepositoryError::Unavailable("invoice store lock poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryInvoiceRepository {
    records: Arc<Mutex<Vec<InvoiceRecord>>>,
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    async fn page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<InvoiceRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(newest_first_page(&guard, offset, limit))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(lock(&self.records)?.len() as u64)
    }

    async fn fetch(&self, id: &InvoiceId) -> Result<Option<InvoiceRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }
}

const CREATE_INVOICES: &str = r#"
    CREATE TABLE IF NOT EXISTS invoices (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL,
        document TEXT NOT NULL
    )
"#;

const CREATE_INVOICES_ORDER_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS invoices_newest_first
    ON invoices (created_at DESC, seq DESC)
"#;

/// Receipts kept as JSON documents in SQLite, keyed by `_id` and ordered by creation time.
#[derive(Clone)]
pub(crate) struct SqliteInvoiceRepository {
    pool: SqlitePool,
}

impl SqliteInvoiceRepository {
    pub(crate) async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(storage_error)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        for statement in [CREATE_INVOICES, CREATE_INVOICES_ORDER_INDEX] {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(storage_error)?;
        }

        let repository = Self { pool };
        let records = repository.count().await?;
        info!(records, "invoice database opened");
        Ok(repository)
    }
}

fn storage_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
        _ => RepositoryError::Unavailable(err.to_string()),
    }
}

fn decode(document: &str) -> Result<InvoiceRecord, RepositoryError> {
    serde_json::from_str(document)
        .map_err(|err| RepositoryError::Unavailable(format!("corrupt invoice document ({err})")))
}

fn sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl InvoiceRepository for SqliteInvoiceRepository {
    async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord, RepositoryError> {
        let document = serde_json::to_string(&record)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;

        sqlx::query("INSERT INTO invoices (id, created_at, document) VALUES (?, ?, ?)")
            .bind(record.id.0.as_str())
            .bind(record.created_at.timestamp_micros())
            .bind(document.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(record)
    }

    async fn page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<InvoiceRecord>, RepositoryError> {
        let documents = sqlx::query_scalar::<_, String>(
            r#"
            SELECT document
            FROM invoices
            ORDER BY created_at DESC, seq DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(sql_int(limit))
        .bind(sql_int(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        documents.iter().map(|document| decode(document)).collect()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn fetch(&self, id: &InvoiceId) -> Result<Option<InvoiceRecord>, RepositoryError> {
        let document =
            sqlx::query_scalar::<_, String>("SELECT document FROM invoices WHERE id = ?")
                .bind(id.0.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        document.as_deref().map(decode).transpose()
    }
}

/// Storage backend picked from configuration at startup.
pub(crate) enum InvoiceStore {
    Memory(InMemoryInvoiceRepository),
    Sqlite(SqliteInvoiceRepository),
}

impl InvoiceStore {
    pub(crate) async fn from_config(config: &StorageConfig) -> Result<Self, RepositoryError> {
        match &config.database_url {
            Some(url) => SqliteInvoiceRepository::connect(url).await.map(Self::Sqlite),
            None => Ok(Self::Memory(InMemoryInvoiceRepository::default())),
        }
    }

    fn backend(&self) -> &dyn InvoiceRepository {
        match self {
            InvoiceStore::Memory(repository) => repository,
            InvoiceStore::Sqlite(repository) => repository,
        }
    }
}

#[async_trait]
impl InvoiceRepository for InvoiceStore {
    async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord, RepositoryError> {
        self.backend().insert(record).await
    }

    async fn page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<InvoiceRecord>, RepositoryError> {
        self.backend().page(offset, limit).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.backend().count().await
    }

    async fn fetch(&self, id: &InvoiceId) -> Result<Option<InvoiceRecord>, RepositoryError> {
        self.backend().fetch(id).await
    }
}
