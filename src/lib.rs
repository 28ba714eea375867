//! Stripe card checkout for the FitHub shop pages.
//!
//! On load the module reads the page configuration, loads Stripe.js, mounts the
//! card Element into `#card-element`, and wires whichever of
//! `#checkout-form` (one-time cart payment) and `#subscription-form` the page
//! contains. Without a `STRIPE_PUBLIC_KEY` nothing is wired.

pub mod backend;
pub mod bindings;
pub mod client;
pub mod components;
pub mod config;
pub mod dom;
pub mod error;
pub mod helpers;
pub mod interop;
pub mod model;
pub mod ports;
pub mod state;
pub mod workflow;

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlFormElement};

pub use backend::HttpBackend;
pub use bindings::*;
pub use client::*;
pub use components::*;
pub use config::{PageConfig, SuccessMode};
pub use error::{CheckoutError, StripeError};
pub use interop::load_stripejs;
pub use model::*;
pub use ports::*;
pub use state::CheckoutState;
pub use workflow::*;

thread_local! {
    static WIRED: Cell<bool> = const { Cell::new(false) };
}

/// WASM entry point.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::INFO)
            .build(),
    );

    let document = match dom::document() {
        Ok(document) => document,
        Err(err) => {
            tracing::error!("{err}");
            return;
        }
    };
    dom::on_ready(&document, boot);
}

/// Page helpers and checkout wiring, once the DOM is parsed.
fn boot() {
    if let (Some(window), Ok(document)) = (web_sys::window(), dom::document()) {
        helpers::install_submit_spinners(&document);
        helpers::install_scroll_to_top(&window, &document);
    }

    match PageConfig::from_window() {
        Ok(config) => mount(config),
        Err(err) => tracing::error!("{err}"),
    }
}

/// Wire checkout from an explicit configuration object, for pages that keep
/// their settings out of `window`.
#[wasm_bindgen]
pub fn init_checkout(config: JsValue) -> Result<(), JsValue> {
    let config = PageConfig::from_js(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    mount(config);
    Ok(())
}

/// Wire the checkout forms once per page. No-op without a publishable key.
pub fn mount(config: PageConfig) {
    if !config.is_enabled() {
        tracing::debug!("STRIPE_PUBLIC_KEY not set, checkout disabled");
        return;
    }
    if WIRED.with(|wired| wired.replace(true)) {
        tracing::debug!("checkout already wired");
        return;
    }
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = wire(&config).await {
            tracing::error!("checkout setup failed: {err}");
        }
    });
}

async fn wire(config: &PageConfig) -> error::Result<()> {
    let document = dom::document()?;
    let checkout_form = dom::find_form(&document, dom::CHECKOUT_FORM_ID);
    let subscription_form = dom::find_form(&document, dom::SUBSCRIPTION_FORM_ID);
    if checkout_form.is_none() && subscription_form.is_none() {
        return Ok(());
    }

    load_stripejs().await?;
    let key = config.public_key().unwrap_or_default();
    let (stripe, _elements, card) = mount_card_element(key, CARD_ELEMENT_SELECTOR)?;
    let processor = StripeProcessor::new(stripe, card);
    let backend = HttpBackend::from_config(config);

    if let Some(form) = checkout_form {
        if config.payment_intent_url().is_some() {
            let flow = OneTimeCheckout::new(
                dom::DomView::new(document.clone(), form.clone()),
                backend.clone(),
                processor.clone(),
                OneTimeOptions::from_config(config),
            );
            attach(&form, &processor, Rc::new(flow))?;
        } else {
            tracing::warn!(
                "#{} present but CREATE_PAYMENT_INTENT_URL missing",
                dom::CHECKOUT_FORM_ID
            );
        }
    }

    if let Some(form) = subscription_form {
        if config.subscription_url().is_some() {
            let flow = SubscriptionCheckout::new(
                dom::DomView::new(document.clone(), form.clone()),
                backend,
                processor.clone(),
                SubscriptionOptions::from_config(config),
            );
            attach(&form, &processor, Rc::new(flow))?;
        } else {
            tracing::warn!(
                "#{} present but CREATE_SUBSCRIPTION_URL missing",
                dom::SUBSCRIPTION_FORM_ID
            );
        }
    }

    Ok(())
}

/// Route card validation events and form submits into `flow`.
fn attach(
    form: &HtmlFormElement,
    processor: &StripeProcessor,
    flow: Rc<dyn CheckoutFlow>,
) -> error::Result<()> {
    {
        let flow = flow.clone();
        on_card_change(processor.card(), move |error| {
            flow.widget_changed(error.as_ref().map(|e| e.message.as_str()));
        })?;
    }

    let target = form.clone();
    let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        event.prevent_default();
        let snapshot = match dom::snapshot_form(&target) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!("reading checkout form failed: {err}");
                return;
            }
        };
        let flow = flow.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = flow.submit(snapshot).await;
            tracing::debug!("checkout submit finished: {outcome:?}");
        });
    });
    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())
        .map_err(|e| CheckoutError::Config(format!("{e:?}")))?;
    on_submit.forget();
    Ok(())
}
