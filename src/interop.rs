//! interop.rs
//!
//! Load Stripe.js v3 at runtime (no inline JS).
//!
//! # Overview
//! `load_stripejs()` resolves immediately when `window.Stripe` already exists
//! (the page included the script itself). Otherwise it injects a single
//! `<script id="stripejs-sdk" src="https://js.stripe.com/v3/" defer>`
//! into `<head>`, or reuses one injected earlier, and resolves once the
//! script's `load` event fires.
//!
//! # Usage
//! ```rust,ignore
//! wasm_bindgen_futures::spawn_local(async {
//!     if let Err(err) = load_stripejs().await {
//!         tracing::error!("{err}");
//!     }
//! });
//! ```

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::{Promise, Reflect};
use web_sys::{Document, HtmlScriptElement};

use crate::error::{CheckoutError, Result};

pub const STRIPE_SCRIPT_ID: &str = "stripejs-sdk";
pub const STRIPE_SCRIPT_SRC: &str = "https://js.stripe.com/v3/";

/// Whether `window.Stripe` exists (script loaded & parsed).
pub fn stripe_loaded() -> bool {
    web_sys::window()
        .and_then(|win| Reflect::has(&win, &JsValue::from_str("Stripe")).ok())
        .unwrap_or(false)
}

/// Make sure Stripe.js is loaded exactly once per page.
pub async fn load_stripejs() -> Result<()> {
    if stripe_loaded() {
        return Ok(());
    }

    let document = web_sys::window()
        .and_then(|win| win.document())
        .ok_or_else(|| CheckoutError::Config("no document".into()))?;
    let script = stripe_script(&document)?;

    // Resolve/reject straight from the script's load/error events.
    let promise = Promise::new(&mut |resolve, reject| {
        let _ = script.add_event_listener_with_callback("load", &resolve);
        let _ = script.add_event_listener_with_callback("error", &reject);
    });
    JsFuture::from(promise)
        .await
        .map_err(|_| CheckoutError::Transport(format!("failed to load {STRIPE_SCRIPT_SRC}")))?;

    if stripe_loaded() {
        tracing::debug!("Stripe.js loaded");
        Ok(())
    } else {
        Err(CheckoutError::Transport("Stripe.js loaded without defining window.Stripe".into()))
    }
}

/// The `<script id="stripejs-sdk">`, inserted into `<head>` if missing.
fn stripe_script(document: &Document) -> Result<HtmlScriptElement> {
    if let Some(existing) = document.get_element_by_id(STRIPE_SCRIPT_ID) {
        return existing.dyn_into().map_err(|_| {
            CheckoutError::Config(format!("#{STRIPE_SCRIPT_ID} is not a <script>"))
        });
    }

    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(js_to_config_error)?
        .dyn_into()
        .map_err(|_| CheckoutError::Config("create script".into()))?;
    script.set_id(STRIPE_SCRIPT_ID);
    script.set_src(STRIPE_SCRIPT_SRC);
    script.set_defer(true);

    document
        .head()
        .ok_or_else(|| CheckoutError::Config("head missing".into()))?
        .append_child(&script)
        .map_err(js_to_config_error)?;
    Ok(script)
}

fn js_to_config_error(value: JsValue) -> CheckoutError {
    CheckoutError::Config(format!("{value:?}"))
}
