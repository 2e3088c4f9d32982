//! Supabase (PostgREST) note store client.

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{NoteStore, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::models::{Identifier, NoteRecord};
use crate::util::compact_text;

const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=representation";

/// Note store talking to a Supabase project's REST endpoint.
#[derive(Clone)]
pub struct SupabaseNoteStore {
    rest_url: String,
    anon_key: String,
    table: String,
    key_column: String,
    content_column: String,
    updated_at_column: Option<String>,
    client: Client,
}

impl std::fmt::Debug for SupabaseNoteStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SupabaseNoteStore")
            .field("rest_url", &self.rest_url)
            .field("anon_key", &"[REDACTED]")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl SupabaseNoteStore {
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let (Some(url), Some(anon_key)) = (
            config.supabase_url.as_deref(),
            config.supabase_anon_key.as_deref(),
        ) else {
            return Err(StoreError::NotConfigured);
        };

        let rest_url = normalize_rest_url(url)?;
        let anon_key = anon_key.trim().to_string();
        if anon_key.is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }
        if config.table.trim().is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "Table name must not be empty",
            ));
        }

        Ok(Self {
            rest_url,
            anon_key,
            table: config.table.trim().to_string(),
            key_column: config.key_column.clone(),
            content_column: config.content_column.clone(),
            updated_at_column: config.updated_at_column.clone(),
            client: Client::builder().build()?,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.rest_url, self.table)
    }

    fn select_clause(&self) -> String {
        let mut columns = vec![self.key_column.as_str(), self.content_column.as_str()];
        if let Some(column) = self.updated_at_column.as_deref() {
            columns.push(column);
        }
        columns.join(",")
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Accept", "application/json")
    }

    async fn send_rows(&self, request: RequestBuilder) -> StoreResult<Vec<Value>> {
        let response = self.authorized(request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(parse_api_error(status, &body)));
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn row_content(&self, row: &Value) -> String {
        row.get(&self.content_column)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn row_timestamp(&self, row: &Value) -> Option<DateTime<Utc>> {
        let column = self.updated_at_column.as_deref()?;
        row.get(column)
            .and_then(Value::as_str)
            .and_then(parse_store_timestamp)
    }

    fn row_identifier(&self, row: &Value) -> Option<Identifier> {
        match row.get(&self.key_column)? {
            Value::String(raw) => Identifier::parse(raw).ok(),
            Value::Number(number) => Identifier::parse(&number.to_string()).ok(),
            _ => None,
        }
    }
}

impl NoteStore for SupabaseNoteStore {
    async fn fetch(&self, identifier: &Identifier) -> StoreResult<Option<NoteRecord>> {
        tracing::debug!(%identifier, table = %self.table, "Fetching note");
        let request = self.client.get(self.table_url()).query(&[
            ("select", self.select_clause()),
            (self.key_column.as_str(), format!("eq.{identifier}")),
            ("limit", "1".to_string()),
        ]);

        let rows = self.send_rows(request).await?;
        Ok(rows.first().map(|row| NoteRecord {
            identifier: identifier.clone(),
            content: self.row_content(row),
            last_modified: self.row_timestamp(row),
        }))
    }

    async fn upsert(&self, identifier: &Identifier, content: &str) -> StoreResult<NoteRecord> {
        tracing::debug!(%identifier, table = %self.table, "Upserting note");
        let mut payload = Map::new();
        payload.insert(
            self.key_column.clone(),
            Value::String(identifier.to_string()),
        );
        payload.insert(
            self.content_column.clone(),
            Value::String(content.to_string()),
        );

        let request = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", self.key_column.as_str())])
            .header("Prefer", UPSERT_PREFER)
            .json(&Value::Object(payload));

        let rows = self.send_rows(request).await?;
        // With row-level security the representation may come back empty
        Ok(rows.first().map_or_else(
            || NoteRecord::new(identifier.clone(), content),
            |row| NoteRecord {
                identifier: identifier.clone(),
                content: self.row_content(row),
                last_modified: self.row_timestamp(row),
            },
        ))
    }

    async fn scan(&self) -> StoreResult<Vec<NoteRecord>> {
        tracing::debug!(table = %self.table, "Scanning notes");
        let request = self.client.get(self.table_url()).query(&[
            ("select", self.select_clause()),
            ("order", format!("{}.asc", self.key_column)),
        ]);

        let rows = self.send_rows(request).await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let Some(identifier) = self.row_identifier(row) else {
                tracing::warn!(
                    "Skipping row with non-numeric {}: {}",
                    self.key_column,
                    compact_text(&row.to_string())
                );
                continue;
            };
            records.push(NoteRecord {
                identifier,
                content: self.row_content(row),
                last_modified: self.row_timestamp(row),
            });
        }
        Ok(records)
    }
}

/// Normalize a Supabase project URL to its REST endpoint.
pub fn normalize_rest_url(url: &str) -> StoreResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !crate::util::is_http_url(trimmed) {
        return Err(StoreError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }
    if trimmed.ends_with("/rest/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/rest/v1"))
    }
}

/// Parse a PostgREST timestamp, with or without an offset (naive values are UTC).
fn parse_store_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorResponse {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorResponse>(body) {
        if let Some(message) = payload.message {
            let mut rendered = message.trim().to_string();
            if let Some(details) = payload.details.filter(|value| !value.trim().is_empty()) {
                rendered.push_str(": ");
                rendered.push_str(details.trim());
            }
            if let Some(hint) = payload.hint.filter(|value| !value.trim().is_empty()) {
                rendered.push_str(&format!(" (hint: {})", hint.trim()));
            }
            return format!("{rendered} ({})", status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
