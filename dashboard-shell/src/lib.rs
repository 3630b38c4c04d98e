//! Page shell for the analytics dashboard.
//!
//! Every page carries a `data-page` attribute on `<body>`; the shell decodes
//! it into a [`Route`] and mounts the matching controller. Controllers read
//! their inputs through thin DOM helpers, call the data client, and hand the
//! shaped payload to the chart adapter. All failures converge on one
//! reporting function; nothing propagates past a controller, so one broken
//! page section cannot block the others.

pub mod inputs;
pub mod views;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod pages;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Symbol used whenever the page has no selector or it is empty.
pub const DEFAULT_SYMBOL: &str = "AXISBANK.NS";

/// Pages the shell knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Result,
    PriceHistory,
    DailyReturns,
    VolumeTraded,
    Indicators,
    Signals,
    Simulator,
    Heatmap,
    Volatility,
    IfBought,
    Strength,
    WeekdayReturns,
    YearGrowth,
}

impl Route {
    pub const ALL: [Route; 14] = [
        Route::Home,
        Route::Result,
        Route::PriceHistory,
        Route::DailyReturns,
        Route::VolumeTraded,
        Route::Indicators,
        Route::Signals,
        Route::Simulator,
        Route::Heatmap,
        Route::Volatility,
        Route::IfBought,
        Route::Strength,
        Route::WeekdayReturns,
        Route::YearGrowth,
    ];

    /// Decode the `data-page` attribute; unknown pages get no controller.
    pub fn from_page_attr(attr: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.page_attr() == attr)
    }

    pub fn page_attr(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Result => "result",
            Route::PriceHistory => "price-history",
            Route::DailyReturns => "daily-returns",
            Route::VolumeTraded => "volume-traded",
            Route::Indicators => "indicators",
            Route::Signals => "signals",
            Route::Simulator => "simulator",
            Route::Heatmap => "heatmap",
            Route::Volatility => "volatility",
            Route::IfBought => "ifbought",
            Route::Strength => "strength",
            Route::WeekdayReturns => "weekday-returns",
            Route::YearGrowth => "year-growth",
        }
    }
}

/// Single reporting path for every failure class. The missing-Plotly case
/// gets the extra hint because ad blockers strip the CDN script.
#[cfg(target_arch = "wasm32")]
pub(crate) fn report_error(context: &str, message: &str) {
    let text = if message.contains("Plotly.js library not loaded") {
        format!("{context}: {message}. Check the network connection, browser settings, or ad blockers.")
    } else {
        format!("{context}: {message}")
    };
    web_sys::console::error_1(&JsValue::from_str(&text));
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = mount_current_page() {
        report_error("boot", &dom::js_message(&err));
    }
}

#[cfg(target_arch = "wasm32")]
fn mount_current_page() -> Result<(), JsValue> {
    let document = dom::document()?;
    let Some(attr) = dom::page_attribute(&document) else {
        return Ok(());
    };
    let Some(route) = Route::from_page_attr(&attr) else {
        // Static pages (about, contact, learn) have no controller.
        return Ok(());
    };
    pages::mount(route, &document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_round_trip_through_page_attrs() {
        for route in Route::ALL {
            assert_eq!(Route::from_page_attr(route.page_attr()), Some(route));
        }
    }

    #[test]
    fn unknown_pages_have_no_route() {
        assert_eq!(Route::from_page_attr("learn"), None);
        assert_eq!(Route::from_page_attr(""), None);
    }

    #[test]
    fn every_dashboard_page_is_routed() {
        assert_eq!(Route::ALL.len(), 14);
    }
}
