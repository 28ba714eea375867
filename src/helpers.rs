//! Page-wide helpers that do not depend on the checkout configuration.

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlButtonElement, ScrollBehavior, ScrollToOptions, Window};

use crate::dom::HIDDEN_CLASS;

/// Forms opting into the submit spinner.
pub const SPINNER_FORM_SELECTOR: &str = "form.with-spinner";
pub const SCROLL_TO_TOP_ID: &str = "scroll-to-top";
/// Scroll offset, in pixels, past which the scroll-to-top button shows.
pub const SCROLL_THRESHOLD: f64 = 300.0;

pub fn scroll_button_visible(scroll_y: f64) -> bool {
    scroll_y > SCROLL_THRESHOLD
}

/// Append a spinner to the submit button of every `form.with-spinner` and
/// disable it when the form is submitted. Buttons are never re-enabled.
pub fn install_submit_spinners(document: &Document) {
    let Ok(forms) = document.query_selector_all(SPINNER_FORM_SELECTOR) else {
        return;
    };
    for idx in 0..forms.length() {
        let Some(form) = forms.item(idx).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let target = form.clone();
        let document = document.clone();
        let on_submit = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let Some(button) = target
                .query_selector("button[type=\"submit\"]")
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
            else {
                return;
            };
            if let Ok(spinner) = document.create_element("span") {
                spinner.set_class_name("spinner-border spinner-border-sm ms-2");
                let _ = spinner.set_attribute("role", "status");
                let _ = spinner.set_attribute("aria-hidden", "true");
                let _ = button.append_child(&spinner);
            }
            button.set_disabled(true);
        });
        if form
            .add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())
            .is_ok()
        {
            on_submit.forget();
        }
    }
}

/// Toggle `#scroll-to-top` with the scroll position and smooth-scroll to the
/// top when it is clicked.
pub fn install_scroll_to_top(window: &Window, document: &Document) {
    let Some(button) = document.get_element_by_id(SCROLL_TO_TOP_ID) else {
        return;
    };

    let on_scroll = {
        let window = window.clone();
        let button = button.clone();
        Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let visible = scroll_button_visible(window.scroll_y().unwrap_or_default());
            let classes = button.class_list();
            let _ = if visible {
                classes.remove_1(HIDDEN_CLASS)
            } else {
                classes.add_1(HIDDEN_CLASS)
            };
        })
    };
    if window
        .add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())
        .is_ok()
    {
        on_scroll.forget();
    }

    let on_click = {
        let window = window.clone();
        Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let options = ScrollToOptions::new();
            options.set_top(0.0);
            options.set_behavior(ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        })
    };
    if button
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .is_ok()
    {
        on_click.forget();
    }
}
