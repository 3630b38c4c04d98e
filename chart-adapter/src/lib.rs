//! Chart adapter over the page-global Plotly library.
//!
//! Each page shapes its payload into a [`ChartRequest`]; the adapter turns
//! that into the uniform `Plotly.newPlot(container, traces, layout, config)`
//! call. Trace and layout construction is plain data and runs anywhere; only
//! [`render`] touches the DOM and the `Plotly` global.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use js_sys::{Array, Function, Reflect};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};

/// Line colors, cycled by series position.
pub const SERIES_PALETTE: [&str; 5] = ["#007bff", "#28a745", "#dc3545", "#ffc107", "#17a2b8"];

const BAR_COLOR: &str = "#007bff";
const BUY_COLOR: &str = "green";
const SELL_COLOR: &str = "red";
const HEATMAP_LOW: &str = "#dc3545";
const HEATMAP_HIGH: &str = "#28a745";

const CHART_HEIGHT: u32 = 400;
const TOP_MARGIN: u32 = 20;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart container `{0}` not found")]
    MissingContainer(String),
    #[error("Plotly.js library not loaded")]
    PlotlyMissing,
    #[error("chart serialization failed: {0}")]
    Serialize(String),
    #[error("plot call failed: {0}")]
    PlotFailed(String),
}

/// One named line; `None` values render as gaps.
#[derive(Debug, Clone)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl NamedSeries {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Series with no gaps.
    pub fn solid(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
    }
}

/// One bar series of a grouped chart; color comes from the payload.
#[derive(Debug, Clone)]
pub struct BarGroup {
    pub label: String,
    pub values: Vec<f64>,
    pub color: String,
}

/// The five chart kinds the pages produce.
#[derive(Debug, Clone)]
pub enum ChartRequest {
    MultiLine {
        dates: Vec<String>,
        series: Vec<NamedSeries>,
    },
    Bar {
        labels: Vec<String>,
        values: Vec<Option<f64>>,
        title: String,
    },
    GroupedBar {
        labels: Vec<i64>,
        groups: Vec<BarGroup>,
    },
    SignalBars {
        dates: Vec<String>,
        buys: Vec<f64>,
        sells: Vec<f64>,
    },
    Heatmap {
        dates: Vec<String>,
        symbols: Vec<String>,
        matrix: Vec<Vec<f64>>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct LineStyle {
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub color: String,
}

/// One Plotly trace. Absent fields stay out of the serialized object so the
/// same shape covers scatter, bar, and heatmap traces.
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
}

impl Trace {
    fn blank(kind: &'static str) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            z: None,
            name: None,
            mode: None,
            line: None,
            marker: None,
            colorscale: None,
            showscale: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub t: u32,
}

/// Fixed, non-interactive layout: no title, fixed margins and height, width
/// left to the responsive config.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<&'static str>,
    pub margin: Margin,
    pub height: u32,
}

impl Layout {
    fn fixed(x_title: &str, y_title: &str, barmode: Option<&'static str>) -> Self {
        Self {
            title: String::new(),
            xaxis: Axis {
                title: x_title.to_string(),
            },
            yaxis: Axis {
                title: y_title.to_string(),
            },
            barmode,
            margin: Margin { t: TOP_MARGIN },
            height: CHART_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlotConfig {
    pub responsive: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self { responsive: true }
    }
}

impl ChartRequest {
    pub fn traces(&self) -> Vec<Trace> {
        match self {
            ChartRequest::MultiLine { dates, series } => series
                .iter()
                .enumerate()
                .map(|(idx, s)| {
                    let mut trace = Trace::blank("scatter");
                    trace.x = Some(json!(dates));
                    trace.y = Some(json!(s.values));
                    trace.name = Some(s.name.clone());
                    trace.mode = Some("lines");
                    trace.line = Some(LineStyle {
                        color: SERIES_PALETTE[idx % SERIES_PALETTE.len()].to_string(),
                    });
                    trace
                })
                .collect(),
            ChartRequest::Bar {
                labels,
                values,
                title,
            } => {
                let mut trace = Trace::blank("bar");
                trace.x = Some(json!(labels));
                trace.y = Some(json!(values));
                trace.name = Some(title.clone());
                trace.marker = Some(Marker {
                    color: BAR_COLOR.to_string(),
                });
                vec![trace]
            }
            ChartRequest::GroupedBar { labels, groups } => groups
                .iter()
                .map(|group| {
                    let mut trace = Trace::blank("bar");
                    trace.x = Some(json!(labels));
                    trace.y = Some(json!(group.values));
                    trace.name = Some(group.label.clone());
                    trace.marker = Some(Marker {
                        color: group.color.clone(),
                    });
                    trace
                })
                .collect(),
            ChartRequest::SignalBars { dates, buys, sells } => {
                let mut buy = Trace::blank("bar");
                buy.x = Some(json!(dates));
                buy.y = Some(json!(buys));
                buy.name = Some("Buy Signal".to_string());
                buy.marker = Some(Marker {
                    color: BUY_COLOR.to_string(),
                });

                // Sells diverge downward from the shared zero baseline.
                let negated: Vec<f64> = sells.iter().map(|v| -v).collect();
                let mut sell = Trace::blank("bar");
                sell.x = Some(json!(dates));
                sell.y = Some(json!(negated));
                sell.name = Some("Sell Signal".to_string());
                sell.marker = Some(Marker {
                    color: SELL_COLOR.to_string(),
                });

                vec![buy, sell]
            }
            ChartRequest::Heatmap {
                dates,
                symbols,
                matrix,
            } => {
                let mut trace = Trace::blank("heatmap");
                trace.x = Some(json!(dates));
                trace.y = Some(json!(symbols));
                trace.z = Some(json!(matrix));
                trace.colorscale = Some(json!([[0, HEATMAP_LOW], [1, HEATMAP_HIGH]]));
                trace.showscale = Some(false);
                vec![trace]
            }
        }
    }

    pub fn layout(&self) -> Layout {
        match self {
            ChartRequest::MultiLine { .. } => Layout::fixed("Date", "Value", None),
            ChartRequest::Bar { title, .. } => Layout::fixed("Date", title, None),
            ChartRequest::GroupedBar { .. } => Layout::fixed("Year", "Growth", Some("group")),
            ChartRequest::SignalBars { .. } => Layout::fixed("Date", "Signal", Some("relative")),
            ChartRequest::Heatmap { .. } => Layout::fixed("Date", "Symbol", None),
        }
    }
}

/// Render the request into the container, or say why the chart cannot be
/// drawn. Never panics: failures come back as values so one broken chart
/// cannot take the rest of the page down with it.
#[cfg(target_arch = "wasm32")]
pub fn render(container_id: &str, request: &ChartRequest) -> Result<(), ChartError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ChartError::PlotFailed("no document".to_string()))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| ChartError::MissingContainer(container_id.to_string()))?;

    let plotly = plotly_global().ok_or(ChartError::PlotlyMissing)?;
    let new_plot = Reflect::get(&plotly, &JsValue::from_str("newPlot"))
        .ok()
        .and_then(|v| v.dyn_into::<Function>().ok())
        .ok_or(ChartError::PlotlyMissing)?;

    let traces = to_js(&request.traces())?;
    let layout = to_js(&request.layout())?;
    let config = to_js(&PlotConfig::default())?;

    let args = Array::new();
    args.push(&JsValue::from(container));
    args.push(&traces);
    args.push(&layout);
    args.push(&config);
    new_plot
        .apply(&plotly, &args)
        .map_err(|err| ChartError::PlotFailed(js_error_message(&err)))?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn plotly_global() -> Option<JsValue> {
    Reflect::get(&js_sys::global(), &JsValue::from_str("Plotly"))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

#[cfg(target_arch = "wasm32")]
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, ChartError> {
    let text = serde_json::to_string(value).map_err(|e| ChartError::Serialize(e.to_string()))?;
    js_sys::JSON::parse(&text).map_err(|err| ChartError::Serialize(js_error_message(&err)))
}

#[cfg(target_arch = "wasm32")]
fn js_error_message(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
