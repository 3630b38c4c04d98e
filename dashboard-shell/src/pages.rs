//! One controller per route.
//!
//! A controller reads its inputs, validates them, asks the data client for
//! the endpoint payload inside `spawn_local`, and hands the shaped result to
//! the chart adapter. Requests are never cancelled: a superseded fetch still
//! resolves and still renders, so the last response to arrive wins.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::Document;

use api_client::{ApiClient, ApiConfig, ClientError, QueryParams, ResponseCache};
use chart_adapter::{render, ChartRequest};

use crate::dom;
use crate::inputs::{self, DateRange};
use crate::views;
use crate::{report_error, Route, DEFAULT_SYMBOL};

type ShapeFn = fn(Value) -> Result<ChartRequest, ClientError>;

pub(crate) struct PageContext {
    pub(crate) document: Document,
    pub(crate) client: ApiClient,
}

impl PageContext {
    fn new(document: Document) -> Self {
        Self {
            document,
            client: ApiClient::new(ApiConfig::default()),
        }
    }
}

pub(crate) fn mount(route: Route, document: &Document) -> Result<(), JsValue> {
    match route {
        Route::Home => mount_home(document),
        Route::Result => mount_result(document),
        Route::PriceHistory => mount_page(document, Some("price-history-form"), refresh_price_history),
        Route::DailyReturns => mount_page(document, Some("daily-returns-form"), refresh_daily_returns),
        Route::VolumeTraded => mount_page(document, Some("volume-traded-form"), refresh_volume),
        Route::Indicators => mount_page(document, Some("indicator-form"), refresh_indicators),
        Route::Signals => mount_page(document, Some("signals-form"), refresh_signals),
        Route::Simulator => mount_page(document, Some("simulator-form"), refresh_simulator),
        Route::Heatmap => mount_page(document, None, refresh_heatmap),
        Route::Volatility => mount_page(document, None, refresh_volatility),
        Route::IfBought => mount_page(document, Some("bought-form"), refresh_if_bought),
        Route::Strength => mount_page(document, None, refresh_strength),
        Route::WeekdayReturns => mount_page(document, Some("weekday-returns-form"), refresh_weekday),
        Route::YearGrowth => mount_page(document, None, refresh_year_growth),
    }
}

/// Run the page's refresh once on load and again on every form submit.
fn mount_page(
    document: &Document,
    form_id: Option<&str>,
    refresh: fn(Rc<PageContext>),
) -> Result<(), JsValue> {
    let ctx = Rc::new(PageContext::new(document.clone()));
    refresh(ctx.clone());
    if let Some(form_id) = form_id {
        let ctx = ctx.clone();
        dom::on_submit(document, form_id, move || refresh(ctx.clone()))?;
    }
    Ok(())
}

// ---------- shared input reads ----------------------------------------------

fn current_symbol(document: &Document) -> String {
    inputs::resolve_symbol(dom::field_value(document, "symbol-select").as_deref())
}

fn current_range(document: &Document) -> DateRange {
    inputs::resolve_date_range(
        &dom::field_value(document, "start-date").unwrap_or_default(),
        &dom::field_value(document, "end-date").unwrap_or_default(),
        dom::today(),
    )
}

fn symbol_range_params(symbol: &str, range: &DateRange) -> QueryParams {
    QueryParams::new()
        .set("symbol", symbol)
        .set("start_date", &range.start)
        .set("end_date", &range.end)
}

/// Fetch → validate/shape → render, with every failure routed to the shared
/// reporter. The controller returns immediately; the work continues on the
/// event loop.
fn fetch_and_render(
    ctx: Rc<PageContext>,
    endpoint: &'static str,
    params: QueryParams,
    container: &'static str,
    shape: ShapeFn,
    label: &'static str,
) {
    spawn_local(async move {
        let payload = match ctx.client.fetch(endpoint, &params).await {
            Ok(payload) => payload,
            Err(err) => return report_error(label, &err.to_string()),
        };
        let request = match shape(payload) {
            Ok(request) => request,
            Err(err) => return report_error(label, &err.to_string()),
        };
        if let Err(err) = render(container, &request) {
            report_error(label, &err.to_string());
        }
    });
}

// ---------- landing page -----------------------------------------------------

fn mount_home(document: &Document) -> Result<(), JsValue> {
    let doc = document.clone();
    dom::on_submit(document, "home-form", move || {
        let symbol = dom::field_value(&doc, "symbol-select");
        let start = dom::field_value(&doc, "start-date").unwrap_or_default();
        let end = dom::field_value(&doc, "end-date").unwrap_or_default();
        match inputs::home_destination(symbol.as_deref(), &start, &end, dom::today()) {
            Ok(url) => {
                if let Err(err) = dom::navigate_to(&url) {
                    report_error("home", &dom::js_message(&err));
                }
            }
            Err(err) => report_error("home", &err.to_string()),
        }
    })
}

// ---------- result page ------------------------------------------------------

struct ResultSelection {
    symbol: String,
    range: DateRange,
}

fn mount_result(document: &Document) -> Result<(), JsValue> {
    let ctx = Rc::new(PageContext::new(document.clone()));
    let cache = Rc::new(RefCell::new(ResponseCache::new()));
    let defaults = inputs::default_date_range(dom::today());
    let selection = Rc::new(ResultSelection {
        symbol: dom::search_param("symbol").unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
        range: DateRange {
            start: dom::search_param("start_date").unwrap_or(defaults.start),
            end: dom::search_param("end_date").unwrap_or(defaults.end),
        },
    });

    wire_result_button(
        &ctx,
        &cache,
        &selection,
        "price-history-btn",
        "price-history",
        views::price_history_chart,
        "Error loading price history",
    )?;
    wire_result_button(
        &ctx,
        &cache,
        &selection,
        "daily-returns-btn",
        "daily-returns",
        views::daily_returns_chart,
        "Error loading daily returns",
    )?;
    wire_result_button(
        &ctx,
        &cache,
        &selection,
        "volume-traded-btn",
        "volume-traded",
        views::volume_chart,
        "Error loading volume traded",
    )?;
    Ok(())
}

/// The three result buttons share one container and one payload cache; a
/// payload is cached only after it passes the shared check, so cache hits
/// render without refetching.
fn wire_result_button(
    ctx: &Rc<PageContext>,
    cache: &Rc<RefCell<ResponseCache>>,
    selection: &Rc<ResultSelection>,
    button_id: &str,
    endpoint: &'static str,
    shape: ShapeFn,
    label: &'static str,
) -> Result<(), JsValue> {
    let document = ctx.document.clone();
    let ctx = ctx.clone();
    let cache = cache.clone();
    let selection = selection.clone();
    dom::on_click(&document, button_id, move || {
        if let Some(payload) = cache.borrow().get(endpoint) {
            show_result_chart(payload, shape, label);
            return;
        }
        let params = symbol_range_params(&selection.symbol, &selection.range);
        let ctx = ctx.clone();
        let cache = cache.clone();
        spawn_local(async move {
            let payload = match ctx.client.fetch(endpoint, &params).await {
                Ok(payload) => payload,
                Err(err) => return report_error(label, &err.to_string()),
            };
            match shape(payload.clone()) {
                Ok(request) => {
                    cache.borrow_mut().insert(endpoint, payload);
                    if let Err(err) = render("resultChart", &request) {
                        report_error(label, &err.to_string());
                    }
                }
                Err(err) => report_error(label, &err.to_string()),
            }
        });
    })
}

fn show_result_chart(payload: Value, shape: ShapeFn, label: &'static str) {
    match shape(payload) {
        Ok(request) => {
            if let Err(err) = render("resultChart", &request) {
                report_error(label, &err.to_string());
            }
        }
        Err(err) => report_error(label, &err.to_string()),
    }
}

// ---------- per-page refreshers ----------------------------------------------

fn refresh_price_history(ctx: Rc<PageContext>) {
    let symbol = current_symbol(&ctx.document);
    let range = current_range(&ctx.document);
    fetch_and_render(
        ctx,
        "price-history",
        symbol_range_params(&symbol, &range),
        "priceChart",
        views::price_history_chart,
        "Error loading price history",
    );
}

fn refresh_daily_returns(ctx: Rc<PageContext>) {
    let symbol = current_symbol(&ctx.document);
    let range = current_range(&ctx.document);
    fetch_and_render(
        ctx,
        "daily-returns",
        symbol_range_params(&symbol, &range),
        "returnsChart",
        views::daily_returns_chart,
        "Error loading daily returns",
    );
}

fn refresh_volume(ctx: Rc<PageContext>) {
    let symbol = current_symbol(&ctx.document);
    let range = current_range(&ctx.document);
    fetch_and_render(
        ctx,
        "volume-traded",
        symbol_range_params(&symbol, &range),
        "volumeChart",
        views::volume_chart,
        "Error loading volume traded",
    );
}

fn refresh_indicators(ctx: Rc<PageContext>) {
    let symbol = current_symbol(&ctx.document);
    let range = current_range(&ctx.document);
    fetch_and_render(
        ctx,
        "technical-indicators",
        symbol_range_params(&symbol, &range),
        "indicatorChart",
        views::indicator_chart,
        "Error loading technical indicators",
    );
}

fn refresh_signals(ctx: Rc<PageContext>) {
    let symbol = current_symbol(&ctx.document);
    let range = current_range(&ctx.document);
    fetch_and_render(
        ctx,
        "backtested-signals",
        symbol_range_params(&symbol, &range),
        "signalChart",
        views::signal_chart,
        "Error loading backtested signals",
    );
}

/// The simulator renders text, not a chart; validation failures and fetch
/// failures both land in the same status line.
fn refresh_simulator(ctx: Rc<PageContext>) {
    let doc = &ctx.document;
    let symbol = current_symbol(doc);
    let start_raw = dom::field_value(doc, "sim-start-date").unwrap_or_default();
    let amount_raw = dom::field_value(doc, "sim-amount").unwrap_or_default();

    let (start, amount) = match inputs::simulator_inputs(&start_raw, &amount_raw) {
        Ok(valid) => valid,
        Err(err) => return dom::set_text(doc, "sim-result", &err.to_string()),
    };

    let params = QueryParams::new()
        .set("symbol", symbol)
        .set("start_date", start)
        .set("amount", amount);
    let ctx = ctx.clone();
    spawn_local(async move {
        let outcome = match ctx.client.fetch("simulate", &params).await {
            Ok(payload) => views::simulation_summary(payload),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(text) => dom::set_text(&ctx.document, "sim-result", &text),
            Err(err) => {
                dom::set_text(&ctx.document, "sim-result", &format!("Error: {err}"));
                report_error("Error loading simulator", &err.to_string());
            }
        }
    });
}

fn refresh_heatmap(ctx: Rc<PageContext>) {
    fetch_and_render(
        ctx,
        "macd-heatmap",
        QueryParams::new(),
        "heatmapChart",
        views::heatmap_chart,
        "Error loading heatmap",
    );
}

fn refresh_volatility(ctx: Rc<PageContext>) {
    fetch_and_render(
        ctx,
        "volatility",
        QueryParams::new(),
        "volatilityChart",
        views::volatility_chart,
        "Error loading volatility",
    );
}

fn refresh_if_bought(ctx: Rc<PageContext>) {
    let doc = &ctx.document;
    let symbol = current_symbol(doc);
    let buy_date = match inputs::require_date(
        &dom::field_value(doc, "buy-date").unwrap_or_default(),
    ) {
        Ok(date) => date,
        Err(err) => return report_error("ifbought", &err.to_string()),
    };
    if !dom::has_element(doc, "ifBoughtChart") {
        return report_error("ifbought", "Chart container ifBoughtChart not found.");
    }
    let params = QueryParams::new().set("symbol", symbol).set("date", buy_date);
    fetch_and_render(
        ctx,
        "ifbought",
        params,
        "ifBoughtChart",
        views::if_bought_chart,
        "Error loading if bought",
    );
}

fn refresh_strength(ctx: Rc<PageContext>) {
    fetch_and_render(
        ctx,
        "strength-score",
        QueryParams::new(),
        "strengthChart",
        views::strength_chart,
        "Error loading strength score",
    );
}

fn refresh_weekday(ctx: Rc<PageContext>) {
    let symbol = current_symbol(&ctx.document);
    fetch_and_render(
        ctx,
        "returns-by-day",
        QueryParams::new().set("symbol", symbol),
        "dayReturnsChart",
        views::weekday_chart,
        "Error loading weekday returns",
    );
}

fn refresh_year_growth(ctx: Rc<PageContext>) {
    fetch_and_render(
        ctx,
        "year-wise-growth",
        QueryParams::new(),
        "yearGrowthChart",
        views::year_growth_chart,
        "Error loading year-wise growth",
    );
}
