//! HTTP client for the analytics API the dashboard pages consume.
//!
//! Builds `GET /api/{endpoint}` requests from an ordered parameter list,
//! parses the JSON body, and exposes typed views of each endpoint payload.
//! The client itself only guards transport-level failures; the backend also
//! reports application failures as an `error` field inside an otherwise
//! well-formed body, and those are rejected by [`check_payload`] on the
//! caller side so every page applies the same check.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use gloo_net::http::Request;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Origin prefix for API calls; empty means same-origin relative URLs.
    pub base_url: String,
}

impl ApiConfig {
    pub fn same_origin() -> Self {
        Self {
            base_url: String::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::same_origin()
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("api error: {0}")]
    Api(String),
}

/// Ordered query parameters; values are stringified on insertion.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize as `k=v&k2=v2`, preserving insertion order.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn endpoint_url(&self, endpoint: &str, params: &QueryParams) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if params.is_empty() {
            format!("{base}/api/{endpoint}")
        } else {
            format!("{base}/api/{endpoint}?{}", params.encode())
        }
    }

    /// Issue a GET against the endpoint and parse the JSON body.
    ///
    /// Rejects on network failure, non-2xx status, or a malformed body.
    /// No retry, no timeout: a request that never resolves leaves the
    /// caller suspended at the await point.
    #[cfg(target_arch = "wasm32")]
    pub async fn fetch(&self, endpoint: &str, params: &QueryParams) -> Result<Value, ClientError> {
        let url = self.endpoint_url(endpoint, params);
        let resp = Request::get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        if !resp.ok() {
            return Err(ClientError::Status(resp.status()));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

/// Reject payloads carrying a non-empty `error` field.
///
/// The backend reports application failures inside 2xx bodies as well as
/// alongside 4xx/5xx statuses, so this check is independent of transport
/// status and runs after the client resolves.
pub fn check_payload(payload: Value) -> Result<Value, ClientError> {
    if let Some(message) = payload.get("error").and_then(Value::as_str) {
        if !message.is_empty() {
            return Err(ClientError::Api(message.to_string()));
        }
    }
    Ok(payload)
}

pub fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ClientError> {
    serde_json::from_value(payload).map_err(|e| ClientError::Parse(e.to_string()))
}

/// [`check_payload`] then [`decode`]: the one validation path every page uses.
pub fn decode_checked<T: DeserializeOwned>(payload: Value) -> Result<T, ClientError> {
    decode(check_payload(payload)?)
}

/// Per-page response cache keyed by endpoint name.
///
/// Lives for a single page visit and is only consulted to skip refetching
/// when the user flips between charts sharing one container.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<String, Value>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, endpoint: &str) -> Option<Value> {
        self.entries.get(endpoint).cloned()
    }

    pub fn insert(&mut self, endpoint: impl Into<String>, payload: Value) {
        self.entries.insert(endpoint.into(), payload);
    }
}

// ---------- endpoint payloads ------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PriceHistory {
    pub dates: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

/// First element is null (no prior close to diff against).
#[derive(Debug, Clone, Deserialize)]
pub struct DailyReturns {
    pub dates: Vec<String>,
    pub returns: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeSeries {
    pub dates: Vec<String>,
    pub volume: Vec<f64>,
    pub volume_ma: Vec<f64>,
}

/// Field names mirror the API response keys; rolling windows leave leading
/// nulls in every series.
#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorSeries {
    pub dates: Vec<String>,
    #[serde(rename = "SMA")]
    pub sma: Vec<Option<f64>>,
    #[serde(rename = "EMA")]
    pub ema: Vec<Option<f64>>,
    #[serde(rename = "MACD")]
    pub macd: Vec<Option<f64>>,
    #[serde(rename = "Signal_Line")]
    pub signal_line: Vec<Option<f64>>,
}

/// Crossover flags, 0 or 1 per date.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalSeries {
    pub dates: Vec<String>,
    pub buy_signals: Vec<f64>,
    pub sell_signals: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationOutcome {
    pub final_value: f64,
    pub return_pct: f64,
}

/// One matrix row per symbol, columns follow `dates`.
#[derive(Debug, Clone, Deserialize)]
pub struct HeatmapGrid {
    pub symbols: Vec<String>,
    pub dates: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolatilityTable {
    pub symbols: Vec<String>,
    pub volatility: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrengthTable {
    pub symbols: Vec<String>,
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvestmentSeries {
    pub dates: Vec<String>,
    pub investment_value: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeekdayReturns {
    #[serde(rename = "Monday")]
    pub monday: Option<f64>,
    #[serde(rename = "Tuesday")]
    pub tuesday: Option<f64>,
    #[serde(rename = "Wednesday")]
    pub wednesday: Option<f64>,
    #[serde(rename = "Thursday")]
    pub thursday: Option<f64>,
    #[serde(rename = "Friday")]
    pub friday: Option<f64>,
}

impl WeekdayReturns {
    /// Fixed Monday..Friday ordering for the bar axis.
    pub fn into_pairs(self) -> (Vec<String>, Vec<Option<f64>>) {
        let labels = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
            .into_iter()
            .map(String::from)
            .collect();
        let values = vec![
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
        ];
        (labels, values)
    }
}

/// Bar colors are assigned by the backend, one per symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct GrowthDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YearGrowth {
    pub years: Vec<i64>,
    pub datasets: Vec<GrowthDataset>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_url_joins_base_and_params() {
        let client = ApiClient::new(ApiConfig::same_origin().with_base_url("http://localhost:5000/"));
        let params = QueryParams::new()
            .set("symbol", "AXISBANK.NS")
            .set("start_date", "2024-11-05")
            .set("end_date", "2025-05-05");
        assert_eq!(
            client.endpoint_url("price-history", &params),
            "http://localhost:5000/api/price-history?symbol=AXISBANK.NS&start_date=2024-11-05&end_date=2025-05-05"
        );
    }

    #[test]
    fn endpoint_url_without_params_has_no_query() {
        let client = ApiClient::new(ApiConfig::same_origin());
        assert_eq!(
            client.endpoint_url("macd-heatmap", &QueryParams::new()),
            "/api/macd-heatmap"
        );
    }

    #[test]
    fn params_stringify_values_in_insertion_order() {
        let params = QueryParams::new().set("amount", 5000.0).set("symbol", "TCS.NS");
        assert_eq!(params.encode(), "amount=5000&symbol=TCS.NS");
    }

    #[test]
    fn status_error_carries_the_code() {
        assert_eq!(ClientError::Status(502).to_string(), "HTTP error 502");
    }

    #[test]
    fn check_payload_rejects_reported_errors() {
        let err = check_payload(json!({"error": "no data"})).unwrap_err();
        assert!(matches!(err, ClientError::Api(msg) if msg == "no data"));
    }

    #[test]
    fn check_payload_ignores_empty_error_field() {
        assert!(check_payload(json!({"error": "", "dates": []})).is_ok());
        assert!(check_payload(json!({"dates": []})).is_ok());
    }

    #[test]
    fn decode_checked_reads_volatility_table() {
        let payload = json!({"symbols": ["A", "B"], "volatility": [1.2, 3.4]});
        let table: VolatilityTable = decode_checked(payload).unwrap();
        assert_eq!(table.symbols, vec!["A", "B"]);
        assert_eq!(table.volatility, vec![1.2, 3.4]);
    }

    #[test]
    fn decode_checked_fails_before_decoding_on_error_field() {
        let payload = json!({"error": "Invalid symbol or date range"});
        let err = decode_checked::<PriceHistory>(payload).unwrap_err();
        assert!(matches!(err, ClientError::Api(_)));
    }

    #[test]
    fn indicator_series_keeps_leading_nulls() {
        let payload = json!({
            "dates": ["2025-01-01", "2025-01-02"],
            "SMA": [null, 101.5],
            "EMA": [100.0, 100.7],
            "MACD": [null, 0.3],
            "Signal_Line": [null, 0.1]
        });
        let series: IndicatorSeries = decode_checked(payload).unwrap();
        assert_eq!(series.sma, vec![None, Some(101.5)]);
        assert_eq!(series.signal_line[0], None);
    }

    #[test]
    fn weekday_pairs_keep_monday_first() {
        let payload = json!({
            "Monday": 0.1, "Tuesday": -0.2, "Wednesday": null,
            "Thursday": 0.05, "Friday": 0.0
        });
        let (labels, values) = decode_checked::<WeekdayReturns>(payload).unwrap().into_pairs();
        assert_eq!(labels[0], "Monday");
        assert_eq!(labels[4], "Friday");
        assert_eq!(values, vec![Some(0.1), Some(-0.2), None, Some(0.05), Some(0.0)]);
    }

    #[test]
    fn cache_returns_only_stored_endpoints() {
        let mut cache = ResponseCache::new();
        assert!(cache.get("price-history").is_none());
        cache.insert("price-history", json!({"dates": []}));
        assert_eq!(cache.get("price-history"), Some(json!({"dates": []})));
        assert!(cache.get("daily-returns").is_none());
    }
}
