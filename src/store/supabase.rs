use super::types::{DataRow, Predicate, SelectQuery, StoreError, StoreResponse};
use super::DataStore;
use crate::constants::REST_PATH;
use crate::error::{DashboardError, DashboardResult};
use crate::settings::StoreSettings;
use serde_json::Value;

/// PostgREST client for the hosted store.
pub struct SupabaseStore {
  client: reqwest::Client,
  settings: StoreSettings,
}

impl SupabaseStore {
  pub fn new(settings: StoreSettings) -> DashboardResult<Self> {
    let client = reqwest::Client::builder()
      .timeout(settings.timeout)
      .build()
      .map_err(|e| DashboardError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
    Ok(Self { client, settings })
  }

  /// Full request URL for a select, including filters, ordering and limit.
  pub fn request_url(&self, query: &SelectQuery) -> String {
    format!(
      "{}{}/{}?{}",
      self.settings.url,
      REST_PATH,
      urlencoding::encode(&query.table),
      query_string(query)
    )
  }
}

#[async_trait::async_trait]
impl DataStore for SupabaseStore {
  async fn select(&self, query: &SelectQuery) -> Result<StoreResponse, StoreError> {
    let request = self.build_request(query)?;
    log::debug!("[store] GET {}", request.url());

    let response = self
      .client
      .execute(request)
      .await
      .map_err(|e| StoreError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(rejection(status.as_u16(), &body));
    }

    let content_range = response
      .headers()
      .get("content-range")
      .and_then(|v| v.to_str().ok())
      .map(String::from);

    let rows: Vec<DataRow> = response
      .json()
      .await
      .map_err(|e| StoreError::Decode(e.to_string()))?;

    let count = response_total(content_range.as_deref(), rows.len(), query.count_exact);
    Ok(StoreResponse { rows, count })
  }
}

impl SupabaseStore {
  /// The GET request for a select, with auth headers and, for counted
  /// queries, `Prefer: count=exact`.
  pub fn build_request(&self, query: &SelectQuery) -> Result<reqwest::Request, StoreError> {
    let mut request = self
      .client
      .get(self.request_url(query))
      .header("apikey", &self.settings.api_key)
      .header("Authorization", format!("Bearer {}", self.settings.bearer_token()))
      .header("Accept", "application/json");
    if query.count_exact {
      request = request.header("Prefer", "count=exact");
    }
    request
      .build()
      .map_err(|e| StoreError::Network(format!("Failed to build request: {}", e)))
  }
}

/// Exact count for a response. Falls back to the returned row count when the
/// `Content-Range` total is `*` or the header is absent. Uncounted queries
/// report no count.
pub fn response_total(content_range: Option<&str>, rows: usize, count_exact: bool) -> Option<u64> {
  if !count_exact {
    return None;
  }
  Some(
    content_range
      .and_then(parse_content_range_total)
      .unwrap_or(rows as u64),
  )
}

/// Maps a non-2xx response to a rejection, preferring the JSON `message`.
pub fn rejection(status: u16, body: &str) -> StoreError {
  StoreError::Rejected {
    status,
    message: error_message(body),
  }
}

/// Encodes select, filters, order and limit as PostgREST query parameters.
pub fn query_string(query: &SelectQuery) -> String {
  let mut params: Vec<(String, String)> = vec![("select".to_string(), query.select_clause())];

  for predicate in &query.predicates {
    let operand = match predicate {
      Predicate::Eq { value, .. } => format!("eq.{}", scalar_text(value)),
      Predicate::In { values, .. } => {
        let list: Vec<String> = values.iter().map(in_list_item).collect();
        format!("in.({})", list.join(","))
      }
    };
    params.push((predicate.column().to_string(), operand));
  }

  if let Some(order) = &query.order {
    let direction = if order.ascending { "asc" } else { "desc" };
    params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
  }
  if let Some(limit) = query.limit {
    params.push(("limit".to_string(), limit.to_string()));
  }

  params
    .iter()
    .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
    .collect::<Vec<_>>()
    .join("&")
}

fn scalar_text(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => "null".to_string(),
    other => other.to_string(),
  }
}

// Values with reserved characters must be double-quoted inside in.(...)
fn in_list_item(value: &Value) -> String {
  let text = scalar_text(value);
  if text.chars().any(|c| matches!(c, ',' | '(' | ')' | '"' | '\\' | ' ')) {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
  } else {
    text
  }
}

/// Total from a `Content-Range` header such as `0-9/25` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
  header.rsplit_once('/').and_then(|(_, total)| total.trim().parse().ok())
}

fn error_message(body: &str) -> String {
  serde_json::from_str::<Value>(body)
    .ok()
    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
    .unwrap_or_else(|| body.to_string())
}
