//! Client for a PostgREST endpoint, as exposed by Supabase under `/rest/v1`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response, Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{OWNER_COLUMN, RemoteDatabase, RemoteError, ResultRemote};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ids per `DELETE` request, keeps the query string short.
const DELETE_CHUNK: usize = 100;

/// Rows requested per `GET`. PostgREST truncates larger responses to its
/// `db-max-rows` setting (1000 on Supabase).
const PAGE_SIZE: usize = 1000;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

#[derive(Clone, Debug)]
pub struct PostgrestClient {
    client: Client,
    base_url: String,
}

impl PostgrestClient {
    pub fn builder() -> PostgrestBuilder {
        PostgrestBuilder::default()
    }

    fn url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    /// Every row of the owner, fetched page by page in id order until a page
    /// comes back empty. A server capping pages below [`PAGE_SIZE`] only
    /// costs extra requests.
    async fn select_paged<T: DeserializeOwned>(
        &self,
        table: &str,
        owner_id: &str,
        columns: &str,
    ) -> ResultRemote<Vec<T>> {
        let owner = eq(owner_id);
        let limit = PAGE_SIZE.to_string();
        let mut rows = Vec::new();
        loop {
            let offset = rows.len().to_string();
            let resp = self
                .client
                .get(self.url(table))
                .query(&[
                    ("select", columns),
                    (OWNER_COLUMN, owner.as_str()),
                    ("order", "id.asc"),
                    ("limit", limit.as_str()),
                    ("offset", offset.as_str()),
                ])
                .send()
                .await?;
            let page = check(resp).await?.json::<Vec<T>>().await?;
            if page.is_empty() {
                break;
            }
            rows.extend(page);
        }
        tracing::trace!(table, count = rows.len(), "selected rows");
        Ok(rows)
    }
}

#[derive(Default, Debug)]
pub struct PostgrestBuilder {
    url: String,
    api_key: String,
    access_token: Option<String>,
    timeout: Option<Duration>,
}

impl PostgrestBuilder {
    pub fn url(mut self, url: &str) -> PostgrestBuilder {
        self.url = url.to_string();
        self
    }

    pub fn api_key(mut self, api_key: &str) -> PostgrestBuilder {
        self.api_key = api_key.to_string();
        self
    }

    /// Bearer token of the signed-in owner. The API key is sent as bearer
    /// when no token is set.
    pub fn access_token(mut self, token: Option<&str>) -> PostgrestBuilder {
        self.access_token = token.filter(|t| !t.is_empty()).map(str::to_string);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> PostgrestBuilder {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ResultRemote<PostgrestClient> {
        let url = Url::parse(&self.url).map_err(|err| RemoteError::InvalidUrl(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&self.api_key)?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);
        let mut authorization = HeaderValue::from_str(&format!("Bearer {bearer}"))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        tracing::debug!(url = %url, "created postgrest client");
        Ok(PostgrestClient {
            client,
            base_url: self.url,
        })
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// `in.("a","b")` filter with every id double quoted.
fn in_list(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Total from a `Content-Range` header such as `0-9/42` or `*/0`.
fn parse_total(content_range: &str) -> Option<u64> {
    content_range.rsplit_once('/')?.1.trim().parse().ok()
}

async fn check(resp: Response) -> ResultRemote<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>().await {
        Ok(err) => err.message,
        Err(_) => "server error".to_string(),
    };
    Err(RemoteError::Server { status, message })
}

#[async_trait]
impl RemoteDatabase for PostgrestClient {
    async fn select(&self, table: &str, owner_id: &str) -> ResultRemote<Vec<Value>> {
        self.select_paged(table, owner_id, "*").await
    }

    async fn select_ids(&self, table: &str, owner_id: &str) -> ResultRemote<Vec<String>> {
        let rows: Vec<IdRow> = self.select_paged(table, owner_id, "id").await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    async fn count(&self, table: &str, owner_id: &str) -> ResultRemote<u64> {
        let resp = self
            .client
            .get(self.url(table))
            .query(&[
                ("select", "id"),
                (OWNER_COLUMN, eq(owner_id).as_str()),
                ("limit", "1"),
            ])
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let resp = check(resp).await?;
        resp.headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_total)
            .ok_or_else(|| RemoteError::Response(format!("missing row count for {table}")))
    }

    async fn upsert(&self, table: &str, rows: Vec<Value>) -> ResultRemote<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let resp = self
            .client
            .post(self.url(table))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, owner_id: &str, ids: &[String]) -> ResultRemote<()> {
        for chunk in ids.chunks(DELETE_CHUNK) {
            let resp = self
                .client
                .delete(self.url(table))
                .query(&[
                    (OWNER_COLUMN, eq(owner_id)),
                    ("id", in_list(chunk)),
                ])
                .header("Prefer", "return=minimal")
                .send()
                .await?;
            check(resp).await?;
        }
        Ok(())
    }
}
