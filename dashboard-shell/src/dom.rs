//! Thin DOM readers and event wiring used by the controllers. Everything
//! here is wasm-only; controllers pass the values on to the pure input and
//! view layers.

use chrono::NaiveDate;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Event, HtmlInputElement, HtmlSelectElement};

pub(crate) fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub(crate) fn page_attribute(document: &Document) -> Option<String> {
    document.body().and_then(|b| b.get_attribute("data-page"))
}

/// Current value of a text/date input or a select, if the element exists.
pub(crate) fn field_value(document: &Document, id: &str) -> Option<String> {
    let element = document.get_element_by_id(id)?;
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        return Some(select.value());
    }
    None
}

pub(crate) fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(element) = document.get_element_by_id(id) {
        element.set_text_content(Some(text));
    }
}

pub(crate) fn has_element(document: &Document, id: &str) -> bool {
    document.get_element_by_id(id).is_some()
}

/// Attach a submit handler that swallows the browser default. A page
/// without the form is left alone.
pub(crate) fn on_submit(
    document: &Document,
    form_id: &str,
    mut handler: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let Some(form) = document.get_element_by_id(form_id) else {
        return Ok(());
    };
    let cb = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
        event.prevent_default();
        handler();
    }));
    form.add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

pub(crate) fn on_click(
    document: &Document,
    id: &str,
    mut handler: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let Some(element) = document.get_element_by_id(id) else {
        return Ok(());
    };
    let cb = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_event: Event| {
        handler();
    }));
    element.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

/// Today's date from the browser clock.
pub(crate) fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .unwrap_or(NaiveDate::MIN)
}

/// One query parameter of the current page URL.
pub(crate) fn search_param(key: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get(key)
}

/// Full-page navigation, used by the landing form.
pub(crate) fn navigate_to(url: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.location().set_href(url)
}

pub(crate) fn js_message(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
