//! Presentation layer: decode a raw endpoint payload and shape it into the
//! chart request its page renders. Decoding goes through the shared payload
//! check, so a server-reported error can never reach the adapter.

use serde_json::Value;

use api_client::{
    decode_checked, ClientError, DailyReturns, HeatmapGrid, IndicatorSeries, InvestmentSeries,
    PriceHistory, SignalSeries, SimulationOutcome, StrengthTable, VolatilityTable, VolumeSeries,
    WeekdayReturns, YearGrowth,
};
use chart_adapter::{BarGroup, ChartRequest, NamedSeries};

fn solid(values: Vec<f64>) -> Vec<Option<f64>> {
    values.into_iter().map(Some).collect()
}

pub fn price_history_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: PriceHistory = decode_checked(payload)?;
    Ok(ChartRequest::MultiLine {
        dates: data.dates,
        series: vec![
            NamedSeries::solid("open", data.open),
            NamedSeries::solid("high", data.high),
            NamedSeries::solid("low", data.low),
            NamedSeries::solid("close", data.close),
        ],
    })
}

pub fn daily_returns_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: DailyReturns = decode_checked(payload)?;
    Ok(ChartRequest::Bar {
        labels: data.dates,
        values: data.returns,
        title: "Daily Returns (%)".to_string(),
    })
}

pub fn volume_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: VolumeSeries = decode_checked(payload)?;
    Ok(ChartRequest::MultiLine {
        dates: data.dates,
        series: vec![
            NamedSeries::solid("volume", data.volume),
            NamedSeries::solid("volume_ma", data.volume_ma),
        ],
    })
}

/// Legend names keep the API's field spelling.
pub fn indicator_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: IndicatorSeries = decode_checked(payload)?;
    Ok(ChartRequest::MultiLine {
        dates: data.dates,
        series: vec![
            NamedSeries::new("SMA", data.sma),
            NamedSeries::new("EMA", data.ema),
            NamedSeries::new("MACD", data.macd),
            NamedSeries::new("Signal_Line", data.signal_line),
        ],
    })
}

pub fn signal_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: SignalSeries = decode_checked(payload)?;
    Ok(ChartRequest::SignalBars {
        dates: data.dates,
        buys: data.buy_signals,
        sells: data.sell_signals,
    })
}

pub fn heatmap_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: HeatmapGrid = decode_checked(payload)?;
    Ok(ChartRequest::Heatmap {
        dates: data.dates,
        symbols: data.symbols,
        matrix: data.matrix,
    })
}

pub fn volatility_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: VolatilityTable = decode_checked(payload)?;
    Ok(ChartRequest::Bar {
        labels: data.symbols,
        values: solid(data.volatility),
        title: "Volatility (%)".to_string(),
    })
}

pub fn strength_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: StrengthTable = decode_checked(payload)?;
    Ok(ChartRequest::Bar {
        labels: data.symbols,
        values: solid(data.scores),
        title: "Strength Score".to_string(),
    })
}

pub fn if_bought_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: InvestmentSeries = decode_checked(payload)?;
    Ok(ChartRequest::MultiLine {
        dates: data.dates,
        series: vec![NamedSeries::solid("investment_value", data.investment_value)],
    })
}

pub fn weekday_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: WeekdayReturns = decode_checked(payload)?;
    let (labels, values) = data.into_pairs();
    Ok(ChartRequest::Bar {
        labels,
        values,
        title: "Avg Return by Day".to_string(),
    })
}

pub fn year_growth_chart(payload: Value) -> Result<ChartRequest, ClientError> {
    let data: YearGrowth = decode_checked(payload)?;
    Ok(ChartRequest::GroupedBar {
        labels: data.years,
        groups: data
            .datasets
            .into_iter()
            .map(|d| BarGroup {
                label: d.label,
                values: d.data,
                color: d.background_color,
            })
            .collect(),
    })
}

/// Text summary shown in the simulator's status line.
pub fn simulation_summary(payload: Value) -> Result<String, ClientError> {
    let outcome: SimulationOutcome = decode_checked(payload)?;
    Ok(format!(
        "Final Value: ₹{:.2} ({:.2}%)",
        outcome.final_value, outcome.return_pct
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn volatility_payload_becomes_a_bar_request() {
        let request =
            volatility_chart(json!({"symbols": ["A", "B"], "volatility": [1.2, 3.4]})).unwrap();
        match request {
            ChartRequest::Bar {
                labels,
                values,
                title,
            } => {
                assert_eq!(labels, vec!["A", "B"]);
                assert_eq!(values, vec![Some(1.2), Some(3.4)]);
                assert_eq!(title, "Volatility (%)");
            }
            other => panic!("expected bar request, got {other:?}"),
        }
    }

    #[test]
    fn reported_error_never_becomes_a_chart_request() {
        let err = price_history_chart(json!({"error": "no data"})).unwrap_err();
        assert!(matches!(err, ClientError::Api(msg) if msg == "no data"));
    }

    #[test]
    fn price_history_lines_follow_ohlc_order() {
        let payload = json!({
            "dates": ["2025-01-01"],
            "open": [1.0], "high": [2.0], "low": [0.5], "close": [1.5]
        });
        match price_history_chart(payload).unwrap() {
            ChartRequest::MultiLine { series, .. } => {
                let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["open", "high", "low", "close"]);
            }
            other => panic!("expected multi-line request, got {other:?}"),
        }
    }

    #[test]
    fn indicator_lines_keep_api_field_names_and_gaps() {
        let payload = json!({
            "dates": ["a", "b"],
            "SMA": [null, 1.0], "EMA": [1.0, 1.1],
            "MACD": [null, 0.2], "Signal_Line": [null, 0.1]
        });
        match indicator_chart(payload).unwrap() {
            ChartRequest::MultiLine { series, .. } => {
                assert_eq!(series[0].name, "SMA");
                assert_eq!(series[3].name, "Signal_Line");
                assert_eq!(series[0].values, vec![None, Some(1.0)]);
            }
            other => panic!("expected multi-line request, got {other:?}"),
        }
    }

    #[test]
    fn signal_payload_passes_raw_magnitudes_to_the_adapter() {
        let payload = json!({
            "dates": ["a", "b"],
            "buy_signals": [1, 0],
            "sell_signals": [0, 1]
        });
        match signal_chart(payload).unwrap() {
            ChartRequest::SignalBars { buys, sells, .. } => {
                // Negation is the adapter's job, not the page's.
                assert_eq!(buys, vec![1.0, 0.0]);
                assert_eq!(sells, vec![0.0, 1.0]);
            }
            other => panic!("expected signal request, got {other:?}"),
        }
    }

    #[test]
    fn year_growth_groups_carry_backend_colors() {
        let payload = json!({
            "years": [2023, 2024],
            "datasets": [
                {"label": "AXISBANK.NS", "data": [0.1, 0.2], "backgroundColor": "#007bff"},
                {"label": "TCS.NS", "data": [0.3, 0.4], "backgroundColor": "#28a745"}
            ]
        });
        match year_growth_chart(payload).unwrap() {
            ChartRequest::GroupedBar { labels, groups } => {
                assert_eq!(labels, vec![2023, 2024]);
                assert_eq!(groups[1].label, "TCS.NS");
                assert_eq!(groups[1].color, "#28a745");
            }
            other => panic!("expected grouped request, got {other:?}"),
        }
    }

    #[test]
    fn weekday_bars_run_monday_through_friday() {
        let payload = json!({
            "Monday": 0.1, "Tuesday": 0.2, "Wednesday": 0.3,
            "Thursday": 0.4, "Friday": 0.5
        });
        match weekday_chart(payload).unwrap() {
            ChartRequest::Bar { labels, title, .. } => {
                assert_eq!(labels.first().map(String::as_str), Some("Monday"));
                assert_eq!(labels.last().map(String::as_str), Some("Friday"));
                assert_eq!(title, "Avg Return by Day");
            }
            other => panic!("expected bar request, got {other:?}"),
        }
    }

    #[test]
    fn simulation_summary_formats_value_and_percent() {
        let text =
            simulation_summary(json!({"final_value": 11525.5, "return_pct": 15.25})).unwrap();
        assert_eq!(text, "Final Value: ₹11525.50 (15.25%)");
    }

    #[test]
    fn simulation_error_surfaces_the_server_message() {
        let err = simulation_summary(json!({"error": "Invalid start date or amount"})).unwrap_err();
        assert_eq!(err.to_string(), "api error: Invalid start date or amount");
    }
}
