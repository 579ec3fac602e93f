//! Table readers: where the four record sets come from.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{Backend, TableNames};
use crate::error::FetchError;
use crate::records::Snapshot;

/// Fetch every row of a named table.
pub trait TableReader {
    fn fetch_all(&self, table: &str) -> Result<Vec<Value>, FetchError>;
}

/// Fetch a table and decode each row.
pub fn fetch_table<T: DeserializeOwned>(
    reader: &dyn TableReader,
    table: &str,
) -> Result<Vec<T>, FetchError> {
    let rows = reader.fetch_all(table)?;
    let decoded = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row)
                .map_err(|e| FetchError::new(table, format!("row {}: {}", index, e)))
        })
        .collect::<Result<Vec<T>, FetchError>>()?;
    tracing::info!(table, rows = decoded.len(), "fetched table");
    Ok(decoded)
}

/// Load all four tables. Fails on the first table that cannot be loaded.
pub fn load_snapshot(reader: &dyn TableReader, tables: &TableNames) -> Result<Snapshot, FetchError> {
    Ok(Snapshot {
        applicants: fetch_table(reader, &tables.applicants)?,
        reference_products: fetch_table(reader, &tables.reference_products)?,
        products: fetch_table(reader, &tables.products)?,
        presentations: fetch_table(reader, &tables.presentations)?,
    })
}

/// PostgREST reader: GET {url}/rest/v1/{table}?select=*
pub struct RestTableReader {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl RestTableReader {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(backend: &Backend) -> Result<Self> {
        let url = backend
            .url
            .as_deref()
            .context("No backend url configured (set [backend] url or use --fixtures)")?;
        let api_key = backend.api_key()?;
        Ok(Self::new(url, api_key, backend.timeout()))
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

impl TableReader for RestTableReader {
    fn fetch_all(&self, table: &str) -> Result<Vec<Value>, FetchError> {
        let url = self.table_url(table);
        tracing::debug!(%url, "requesting table");
        let mut response = self
            .agent
            .get(&url)
            .query("select", "*")
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .call()
            .map_err(|e| FetchError::new(table, e.to_string()))?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| FetchError::new(table, e.to_string()))?;
        parse_rows(table, &body)
    }
}

/// Offline reader: one `{table}.json` array per table in a directory.
pub struct JsonDirReader {
    dir: PathBuf,
}

impl JsonDirReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TableReader for JsonDirReader {
    fn fetch_all(&self, table: &str) -> Result<Vec<Value>, FetchError> {
        let path = self.dir.join(format!("{}.json", table));
        let content = std::fs::read_to_string(&path)
            .map_err(|e| FetchError::new(table, format!("{}: {}", path.display(), e)))?;
        parse_rows(table, &content)
    }
}

fn parse_rows(table: &str, body: &str) -> Result<Vec<Value>, FetchError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(other) => Err(FetchError::new(
            table,
            format!("expected a JSON array, got {}", json_kind(&other)),
        )),
        Err(e) => Err(FetchError::new(table, format!("invalid JSON: {}", e))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
