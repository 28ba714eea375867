//! The checkout page as a [`CheckoutView`].
//!
//! The server-rendered templates give the relevant nodes fixed ids; a missing
//! node is logged and skipped rather than failing the submission.

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{self, Array};
use web_sys::{Document, Element, FormData, HtmlButtonElement, HtmlFormElement};

use crate::components::notify;
use crate::error::{CheckoutError, Result};
use crate::model::FormSnapshot;
use crate::ports::{CheckoutView, ToastVariant};

pub const CHECKOUT_FORM_ID: &str = "checkout-form";
pub const SUBSCRIPTION_FORM_ID: &str = "subscription-form";
pub const PAY_BUTTON_ID: &str = "pay-btn";
pub const PAY_BUTTON_TEXT_ID: &str = "pay-btn-text";
pub const PAY_BUTTON_SPINNER_ID: &str = "pay-btn-spinner";
pub const CARD_ERRORS_ID: &str = "card-errors";
pub const ORDER_SUMMARY_ID: &str = "order-summary";
pub const ORDER_TOTAL_ID: &str = "order-total";

/// Bootstrap's "display: none" utility class.
pub const HIDDEN_CLASS: &str = "d-none";

pub fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|win| win.document())
        .ok_or_else(|| CheckoutError::Config("no document".into()))
}

/// Run `f` once the document is parsed: right away unless `readyState` is
/// still `"loading"`, otherwise on `DOMContentLoaded`.
pub fn on_ready<F>(document: &Document, f: F)
where
    F: FnOnce() + 'static,
{
    if document.ready_state() != "loading" {
        f();
        return;
    }
    let callback = Closure::once_into_js(f);
    if let Err(err) =
        document.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
    {
        tracing::error!("cannot wait for DOMContentLoaded: {err:?}");
    }
}

/// The form with `id`, if the page has one.
pub fn find_form(document: &Document, id: &str) -> Option<HtmlFormElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
}

/// Capture the form's string fields, in document order. File inputs are skipped.
pub fn snapshot_form(form: &HtmlFormElement) -> Result<FormSnapshot> {
    let data = FormData::new_with_form(form).map_err(js_to_transport_error)?;
    let entries = js_sys::try_iter(data.as_ref())
        .map_err(js_to_transport_error)?
        .ok_or_else(|| CheckoutError::Transport("FormData is not iterable".into()))?;

    let mut snapshot = FormSnapshot::new();
    for entry in entries {
        let entry = Array::from(&entry.map_err(js_to_transport_error)?);
        if let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
            snapshot.push(name, value);
        }
    }
    Ok(snapshot)
}

/// DOM-backed view of one checkout form.
#[derive(Clone, Debug)]
pub struct DomView {
    document: Document,
    form: HtmlFormElement,
}

impl DomView {
    pub fn new(document: Document, form: HtmlFormElement) -> Self {
        Self { document, form }
    }

    fn element(&self, id: &str) -> Option<Element> {
        let found = self.document.get_element_by_id(id);
        if found.is_none() {
            tracing::warn!("#{id} not found");
        }
        found
    }

    fn button(&self) -> Option<HtmlButtonElement> {
        self.element(PAY_BUTTON_ID)
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
    }
}

impl CheckoutView for DomView {
    fn set_submit_enabled(&self, enabled: bool) {
        if let Some(button) = self.button() {
            button.set_disabled(!enabled);
        }
    }

    fn set_submit_label(&self, label: &str) {
        if let Some(text) = self.element(PAY_BUTTON_TEXT_ID) {
            text.set_text_content(Some(label));
        }
    }

    fn set_busy_indicator(&self, visible: bool) {
        if let Some(spinner) = self.element(PAY_BUTTON_SPINNER_ID) {
            let classes = spinner.class_list();
            let _ = if visible {
                classes.remove_1(HIDDEN_CLASS)
            } else {
                classes.add_1(HIDDEN_CLASS)
            };
        }
    }

    fn set_error_text(&self, text: &str) {
        if let Some(errors) = self.element(CARD_ERRORS_ID) {
            errors.set_text_content(Some(text));
        }
    }

    fn show_toast(&self, message: &str, variant: ToastVariant) {
        notify(message, variant);
    }

    fn show_empty_summary(&self, message: &str) {
        let Some(summary) = self.element(ORDER_SUMMARY_ID) else {
            return;
        };
        summary.set_inner_html("");
        match self.document.create_element("p") {
            Ok(p) => {
                p.set_class_name("text-muted mb-0");
                p.set_text_content(Some(message));
                let _ = summary.append_child(&p);
            }
            Err(_) => summary.set_text_content(Some(message)),
        }
    }

    fn set_total(&self, formatted: &str) {
        if let Some(total) = self.element(ORDER_TOTAL_ID) {
            total.set_text_content(Some(formatted));
        }
    }

    fn reset_form(&self) {
        self.form.reset();
    }

    fn disable_inputs(&self) {
        let Ok(controls) = self.form.query_selector_all("input, select, textarea, button") else {
            return;
        };
        for idx in 0..controls.length() {
            if let Some(control) = controls.item(idx).and_then(|n| n.dyn_into::<Element>().ok()) {
                let _ = control.set_attribute("disabled", "");
            }
        }
        self.set_submit_enabled(false);
    }

    fn redirect(&self, url: &str) {
        let navigated = web_sys::window()
            .map(|win| win.location().set_href(url))
            .unwrap_or_else(|| Err(JsValue::from_str("no window")));
        if let Err(err) = navigated {
            tracing::error!("redirect to {url} failed: {err:?}");
        }
    }
}

fn js_to_transport_error(value: JsValue) -> CheckoutError {
    CheckoutError::Transport(format!("{value:?}"))
}
