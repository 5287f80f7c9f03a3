//! Remote table client
//!
//! Every entity type maps 1:1 to a named remote table exposing select-all,
//! select-by-id, insert-one, partial update-by-id, and delete-by-id. The
//! hosted backend speaks the PostgREST convention (`/rest/v1/{table}` with
//! `id=eq.{id}` filters) with an `apikey` header and a bearer credential
//! per request; anonymous reads are allowed for public content, writes
//! require a signed-in identity.
//!
//! Three backends share one client type:
//! - `Rest` - the hosted table service
//! - `Local` - file-backed tables under the data directory, so the CLI
//!   works fully offline
//! - `Memory` - in-process tables with write-failure injection for tests

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Request timeout for the hosted backend.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A record type backed by a named remote table.
///
/// Implementors carry a unique `String` id; ids are compared exactly.
pub trait Table: Clone + Serialize + DeserializeOwned {
    /// Remote table name
    const NAME: &'static str;

    /// Unique record id
    fn id(&self) -> &str;
}

/// Errors from remote table operations.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Table service returned status {status} for '{table}': {body}")]
    Status {
        table: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to decode rows from '{table}': {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode row for '{table}': {source}")]
    Encode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on local table '{table}': {source}")]
    Io {
        table: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Injected write failure on '{table}'")]
    Injected { table: &'static str },
}

/// Client for one table service, generic over the record type per call.
pub struct TableClient {
    backend: Backend,
}

enum Backend {
    Rest(RestBackend),
    Local(LocalBackend),
    Memory(MemoryBackend),
}

impl TableClient {
    /// Select the backend from configuration: hosted REST when a remote is
    /// configured and enabled, file-backed local tables otherwise.
    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        if config.remote_enabled {
            if let (Some(url), Some(key)) = (&config.remote_url, &config.remote_anon_key) {
                return Self::rest(url, key);
            }
        }
        Ok(Self::local(config.tables_dir()))
    }

    /// Hosted PostgREST-style backend.
    pub fn rest(base_url: &str, anon_key: &str) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            backend: Backend::Rest(RestBackend {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                anon_key: anon_key.to_string(),
                bearer: RwLock::new(None),
            }),
        })
    }

    /// File-backed tables in the given directory (normally
    /// [`Config::tables_dir`]).
    pub fn local(tables_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Local(LocalBackend {
                dir: tables_dir.into(),
            }),
        }
    }

    /// In-process tables, used by tests and demos.
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryBackend {
                tables: Mutex::new(HashMap::new()),
                fail_writes: AtomicBool::new(false),
            }),
        }
    }

    /// Attach (or clear) the signed-in user's access token.
    ///
    /// The REST backend sends it as the bearer credential; without one the
    /// anon key is sent, which row-level policy limits to public reads.
    pub fn set_bearer(&self, token: Option<String>) {
        if let Backend::Rest(rest) = &self.backend {
            if let Ok(mut bearer) = rest.bearer.write() {
                *bearer = token;
            }
        }
    }

    /// Make every subsequent write fail. Memory backend only; no-op for
    /// the others.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Backend::Memory(mem) = &self.backend {
            mem.fail_writes.store(fail, Ordering::SeqCst);
        }
    }

    /// Fetch every row of the table.
    pub async fn select_all<T: Table>(&self) -> Result<Vec<T>, RemoteError> {
        match &self.backend {
            Backend::Rest(rest) => rest.select_all::<T>().await,
            Backend::Local(local) => decode_rows::<T>(local.read_table(T::NAME)?),
            Backend::Memory(mem) => decode_rows::<T>(mem.read_table(T::NAME)),
        }
    }

    /// Fetch a single row by id.
    pub async fn select_by_id<T: Table>(&self, id: &str) -> Result<Option<T>, RemoteError> {
        match &self.backend {
            Backend::Rest(rest) => rest.select_by_id::<T>(id).await,
            Backend::Local(local) => {
                let rows = decode_rows::<T>(local.read_table(T::NAME)?)?;
                Ok(rows.into_iter().find(|r| r.id() == id))
            }
            Backend::Memory(mem) => {
                let rows = decode_rows::<T>(mem.read_table(T::NAME))?;
                Ok(rows.into_iter().find(|r| r.id() == id))
            }
        }
    }

    /// Insert one row.
    pub async fn insert<T: Table>(&self, row: &T) -> Result<(), RemoteError> {
        let value = encode_row(row)?;
        match &self.backend {
            Backend::Rest(rest) => rest.insert::<T>(&value).await,
            Backend::Local(local) => local.modify_table(T::NAME, |rows| {
                rows.push(value);
            }),
            Backend::Memory(mem) => mem.modify_table(T::NAME, |rows| {
                rows.push(value);
            }),
        }
    }

    /// Apply a partial update (JSON object of changed fields) to one row.
    pub async fn update<T: Table>(&self, id: &str, patch: &Value) -> Result<(), RemoteError> {
        match &self.backend {
            Backend::Rest(rest) => rest.update::<T>(id, patch).await,
            Backend::Local(local) => local.modify_table(T::NAME, |rows| {
                merge_into_row(rows, id, patch);
            }),
            Backend::Memory(mem) => mem.modify_table(T::NAME, |rows| {
                merge_into_row(rows, id, patch);
            }),
        }
    }

    /// Delete one row by id.
    pub async fn delete<T: Table>(&self, id: &str) -> Result<(), RemoteError> {
        match &self.backend {
            Backend::Rest(rest) => rest.delete::<T>(id).await,
            Backend::Local(local) => local.modify_table(T::NAME, |rows| {
                rows.retain(|row| row_id(row) != Some(id));
            }),
            Backend::Memory(mem) => mem.modify_table(T::NAME, |rows| {
                rows.retain(|row| row_id(row) != Some(id));
            }),
        }
    }
}

// ==================== REST backend ====================

struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    bearer: RwLock<Option<String>>,
}

impl RestBackend {
    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn bearer_token(&self) -> String {
        self.bearer
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn apply_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.bearer_token()))
    }

    async fn check<T: Table>(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            table: T::NAME,
            status: status.as_u16(),
            body,
        })
    }

    async fn select_all<T: Table>(&self) -> Result<Vec<T>, RemoteError> {
        debug!(table = T::NAME, "select all");
        let req = self
            .http
            .get(self.table_url(T::NAME))
            .query(&[("select", "*")]);
        let response = Self::check::<T>(self.apply_headers(req).send().await?).await?;
        let rows: Vec<Value> = response.json().await?;
        decode_rows::<T>(rows)
    }

    async fn select_by_id<T: Table>(&self, id: &str) -> Result<Option<T>, RemoteError> {
        let filter = format!("eq.{}", id);
        let req = self
            .http
            .get(self.table_url(T::NAME))
            .query(&[("select", "*"), ("id", filter.as_str())]);
        let response = Self::check::<T>(self.apply_headers(req).send().await?).await?;
        let rows: Vec<Value> = response.json().await?;
        Ok(decode_rows::<T>(rows)?.into_iter().next())
    }

    async fn insert<T: Table>(&self, row: &Value) -> Result<(), RemoteError> {
        let req = self
            .http
            .post(self.table_url(T::NAME))
            .header("Prefer", "return=minimal")
            .json(row);
        Self::check::<T>(self.apply_headers(req).send().await?).await?;
        Ok(())
    }

    async fn update<T: Table>(&self, id: &str, patch: &Value) -> Result<(), RemoteError> {
        let filter = format!("eq.{}", id);
        let req = self
            .http
            .patch(self.table_url(T::NAME))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(patch);
        Self::check::<T>(self.apply_headers(req).send().await?).await?;
        Ok(())
    }

    async fn delete<T: Table>(&self, id: &str) -> Result<(), RemoteError> {
        let filter = format!("eq.{}", id);
        let req = self
            .http
            .delete(self.table_url(T::NAME))
            .query(&[("id", filter.as_str())]);
        Self::check::<T>(self.apply_headers(req).send().await?).await?;
        Ok(())
    }
}

// ==================== Local backend ====================

struct LocalBackend {
    dir: PathBuf,
}

impl LocalBackend {
    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table))
    }

    fn read_table(&self, table: &'static str) -> Result<Vec<Value>, RemoteError> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content =
            std::fs::read_to_string(&path).map_err(|source| RemoteError::Io { table, source })?;
        serde_json::from_str(&content).map_err(|source| RemoteError::Decode { table, source })
    }

    fn modify_table(
        &self,
        table: &'static str,
        f: impl FnOnce(&mut Vec<Value>),
    ) -> Result<(), RemoteError> {
        let mut rows = self.read_table(table)?;
        f(&mut rows);
        self.write_table(table, &rows)
    }

    fn write_table(&self, table: &'static str, rows: &[Value]) -> Result<(), RemoteError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| RemoteError::Io { table, source })?;
        let content = serde_json::to_string_pretty(rows)
            .map_err(|source| RemoteError::Encode { table, source })?;

        // Write via a temp file and rename so a crash never truncates a table
        let path = self.table_path(table);
        let tmp = self.dir.join(format!("{}.json.tmp", table));
        std::fs::write(&tmp, content).map_err(|source| RemoteError::Io { table, source })?;
        std::fs::rename(&tmp, &path).map_err(|source| RemoteError::Io { table, source })?;
        Ok(())
    }
}

// ==================== Memory backend ====================

struct MemoryBackend {
    tables: Mutex<HashMap<&'static str, Vec<Value>>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    fn read_table(&self, table: &'static str) -> Vec<Value> {
        self.tables
            .lock()
            .map(|tables| tables.get(table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn modify_table(
        &self,
        table: &'static str,
        f: impl FnOnce(&mut Vec<Value>),
    ) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Injected { table });
        }
        if let Ok(mut tables) = self.tables.lock() {
            f(tables.entry(table).or_default());
        }
        Ok(())
    }
}

// ==================== Row helpers ====================

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn encode_row<T: Table>(row: &T) -> Result<Value, RemoteError> {
    serde_json::to_value(row).map_err(|source| RemoteError::Encode {
        table: T::NAME,
        source,
    })
}

fn decode_rows<T: Table>(rows: Vec<Value>) -> Result<Vec<T>, RemoteError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|source| RemoteError::Decode {
                table: T::NAME,
                source,
            })
        })
        .collect()
}

/// Shallow-merge a JSON object patch into the row with the given id.
fn merge_into_row(rows: &mut [Value], id: &str, patch: &Value) {
    let Some(row) = rows.iter_mut().find(|row| row_id(row) == Some(id)) else {
        return;
    };
    if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
}
