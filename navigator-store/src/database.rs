use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use navigator_core::gateway::{Collection, Filter, Query, Relation, RemoteGateway, Row, RELATED_KEY};
use navigator_core::{GatewayError, GatewayResult};
use navigator_shared::Masked;
use reqwest::{header, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Client for the hosted PostgREST data store.
pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    access_key: Masked<String>,
    bearer: RwLock<Option<Masked<String>>>,
}

impl RestGateway {
    pub fn new(base_url: &str, access_key: Masked<String>, timeout: Duration) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key,
            bearer: RwLock::new(None),
        })
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.table())
    }

    fn request(&self, method: Method, collection: Collection) -> reqwest::RequestBuilder {
        let bearer = self
            .bearer
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .unwrap_or_else(|| self.access_key.clone());

        self.client
            .request(method, self.table_url(collection))
            .header("apikey", self.access_key.expose())
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer.expose()))
    }

    async fn fetch(&self, collection: Collection, params: Vec<(String, String)>) -> GatewayResult<Vec<Row>> {
        debug!("GET {} {:?}", collection.table(), params);
        let response = self
            .request(Method::GET, collection)
            .query(&params)
            .send()
            .await
            .map_err(transport)?;

        check(response)
            .await?
            .json::<Vec<Row>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteGateway for RestGateway {
    async fn fetch_many(&self, collection: Collection, query: &Query) -> GatewayResult<Vec<Row>> {
        self.fetch(collection, encode_query(query, "*")).await
    }

    async fn fetch_related(
        &self,
        collection: Collection,
        relation: &Relation,
        query: &Query,
    ) -> GatewayResult<Vec<Row>> {
        let select = format!("*,{}:{}(*)", RELATED_KEY, relation.foreign_key);
        self.fetch(collection, encode_query(query, &select)).await
    }

    async fn insert(&self, collection: Collection, record: Row) -> GatewayResult<()> {
        let response = self
            .request(Method::POST, collection)
            .header("Prefer", "return=minimal")
            .json(&record)
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(|_| ())
    }

    async fn delete_where(&self, collection: Collection, filters: &[Filter]) -> GatewayResult<()> {
        let params: Vec<(String, String)> = filters.iter().map(encode_filter).collect();
        let response = self
            .request(Method::DELETE, collection)
            .query(&params)
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(|_| ())
    }

    fn authorize(&self, bearer: Option<Masked<String>>) {
        match self.bearer.write() {
            Ok(mut guard) => *guard = bearer,
            Err(_) => warn!("Bearer token lock poisoned; keeping previous token"),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

async fn check(response: reqwest::Response) -> GatewayResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|err| err.message)
        .unwrap_or(body);
    warn!("Data store rejected request ({}): {}", status, message);

    if status == StatusCode::CONFLICT {
        Err(GatewayError::Conflict(message))
    } else {
        Err(GatewayError::Rejected { status: status.as_u16(), message })
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

/// Query-string parameters for a PostgREST read.
pub fn encode_query(query: &Query, select: &str) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), select.to_string())];
    params.extend(query.filters.iter().map(encode_filter));

    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.field, if o.ascending { "asc" } else { "desc" }))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn encode_filter(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq { field, value } => {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (field.clone(), format!("eq.{}", raw))
        }
        Filter::In { field, values } => {
            let list = values.iter().map(literal).collect::<Vec<_>>().join(",");
            (field.clone(), format!("in.({})", list))
        }
        Filter::AnyILike { fields, needle } => {
            let pattern = quote(&format!("*{}*", needle));
            let clauses = fields
                .iter()
                .map(|field| format!("{}.ilike.{}", field, pattern))
                .collect::<Vec<_>>()
                .join(",");
            ("or".to_string(), format!("({})", clauses))
        }
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        other => other.to_string(),
    }
}

/// Reserved characters inside `in.(..)` lists and `or=(..)` clauses.
fn quote(raw: &str) -> String {
    if raw.chars().any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\')) {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw.to_string()
    }
}
