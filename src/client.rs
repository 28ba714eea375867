//! fithub_checkout/src/client.rs
//!
//! High-level Rust API over the Stripe.js card Element.
//!
//! This module provides:
//! - `mount_card_element()` to initialize Stripe, create Elements, and mount the card input.
//! - `on_card_change()` to forward the card's validation messages.
//! - `confirm_card_payment()` to finalize a PaymentIntent, optionally attaching billing details.
//! - `create_payment_method()` to tokenize the card for subscriptions.
//! - `StripeProcessor`, the [`PaymentProcessor`] the checkout workflows run against.
//!
//! # Example Usage
//! ```rust,ignore
//! let (stripe, _elements, card) = mount_card_element("pk_test_...", "#card-element")?;
//! let processor = StripeProcessor::new(stripe, card);
//! match processor.confirm_card_payment(&secret, Some(&billing)).await {
//!     Ok(ConfirmationOutcome::Succeeded) => tracing::info!("paid"),
//!     Ok(ConfirmationOutcome::Pending(status)) => tracing::warn!("status {status}"),
//!     Err(err) => tracing::error!("{err}"),
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::{Object, Reflect};

use crate::bindings::{new_stripe, JsCardElement, JsElements, JsStripe};
use crate::error::{CheckoutError, Result, StripeError};
use crate::model::{BillingContact, BillingDetails, ConfirmationOutcome};
use crate::ports::PaymentProcessor;

/// Selector of the card Element's mount point.
pub const CARD_ELEMENT_SELECTOR: &str = "#card-element";

/// Minimal representation of a confirmed PaymentIntent.
#[derive(Clone, Debug, Deserialize)]
pub struct PaymentIntentInfo {
    /// Stripe's internal identifier, e.g. `pi_1Fxxxxxx`.
    #[serde(default)]
    pub id: String,
    /// Final status, e.g. `"succeeded"`.
    pub status: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PaymentMethodInfo {
    pub id: String,
}

/// What `confirmCardPayment` resolves to.
#[derive(Debug, Deserialize)]
struct ConfirmCardPaymentResponse {
    #[serde(default)]
    error: Option<StripeError>,
    #[serde(rename = "paymentIntent", default)]
    payment_intent: Option<PaymentIntentInfo>,
}

/// What `createPaymentMethod` resolves to.
#[derive(Debug, Deserialize)]
struct CreatePaymentMethodResponse {
    #[serde(default)]
    error: Option<StripeError>,
    #[serde(rename = "paymentMethod", default)]
    payment_method: Option<PaymentMethodInfo>,
}

/// The `change` event payload of a card Element.
#[derive(Debug, Deserialize)]
struct CardChangeEvent {
    #[serde(default)]
    error: Option<StripeError>,
}

#[derive(Serialize)]
struct PaymentMethodParams<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    billing_details: &'a BillingContact,
}

/// Initialize Stripe.js, create an Elements instance, and mount a card Element.
///
/// # Arguments
///
/// * `publishable_key` – Your Stripe publishable key (starts with `pk_`).
/// * `mount_selector` – CSS selector of the mount point, e.g. `"#card-element"`.
pub fn mount_card_element(
    publishable_key: &str,
    mount_selector: &str,
) -> std::result::Result<(JsStripe, JsElements, JsCardElement), StripeError> {
    let stripe = new_stripe(publishable_key).map_err(js_to_stripe_error)?;
    let elements = stripe
        .elements(JsValue::undefined())
        .map_err(js_to_stripe_error)?;
    let card = elements
        .create_element("card", JsValue::undefined())
        .map_err(js_to_stripe_error)?;
    card.mount(mount_selector).map_err(js_to_stripe_error)?;
    Ok((stripe, elements, card))
}

/// Call `handler` with the card's current validation error (or `None`) on
/// every `change` event. The listener lives for the rest of the page.
pub fn on_card_change<F>(
    card: &JsCardElement,
    mut handler: F,
) -> std::result::Result<(), StripeError>
where
    F: FnMut(Option<StripeError>) + 'static,
{
    let closure = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
        let error = from_value::<CardChangeEvent>(event)
            .ok()
            .and_then(|event| event.error);
        handler(error);
    });
    card.on("change", closure.as_ref().unchecked_ref())
        .map_err(js_to_stripe_error)?;
    closure.forget();
    Ok(())
}

/// Confirm a PaymentIntent with the card Element.
///
/// With `billing`, the call is
/// `confirmCardPayment(secret, { payment_method: { card, billing_details } })`;
/// without it, `confirmCardPayment(secret)` reuses the payment method
/// already attached server-side.
pub async fn confirm_card_payment(
    stripe: &JsStripe,
    card: &JsCardElement,
    client_secret: &str,
    billing: Option<&BillingDetails>,
) -> Result<ConfirmationOutcome> {
    let data = match billing {
        Some(billing) => {
            let payment_method = Object::new();
            set(&payment_method, "card", card.as_ref())?;
            let billing_js = to_value(billing).map_err(serde_to_checkout_error)?;
            set(&payment_method, "billing_details", &billing_js)?;
            let data = Object::new();
            set(&data, "payment_method", &payment_method)?;
            JsValue::from(data)
        }
        None => JsValue::undefined(),
    };

    let promise = stripe
        .confirm_card_payment(client_secret, data)
        .map_err(js_to_transport_error)?;
    let value = JsFuture::from(promise)
        .await
        .map_err(js_to_transport_error)?;
    let response: ConfirmCardPaymentResponse =
        from_value(value).map_err(serde_to_checkout_error)?;

    match (response.error, response.payment_intent) {
        (Some(err), _) => Err(CheckoutError::Processor(err)),
        (None, Some(intent)) => {
            tracing::debug!("payment intent {} is {}", intent.id, intent.status);
            Ok(ConfirmationOutcome::from_status(&intent.status))
        }
        (None, None) => Err(CheckoutError::Transport(
            "confirmCardPayment returned neither error nor paymentIntent".into(),
        )),
    }
}

/// Tokenize the card Element into a reusable PaymentMethod id.
pub async fn create_payment_method(
    stripe: &JsStripe,
    card: &JsCardElement,
    contact: &BillingContact,
) -> Result<String> {
    let params = PaymentMethodParams {
        kind: "card",
        billing_details: contact,
    };
    let data = to_value(&params).map_err(serde_to_checkout_error)?;
    set(&data, "card", card.as_ref())?;

    let promise = stripe
        .create_payment_method(data)
        .map_err(js_to_transport_error)?;
    let value = JsFuture::from(promise)
        .await
        .map_err(js_to_transport_error)?;
    let response: CreatePaymentMethodResponse =
        from_value(value).map_err(serde_to_checkout_error)?;

    match (response.error, response.payment_method) {
        (Some(err), _) => Err(CheckoutError::Processor(err)),
        (None, Some(method)) => Ok(method.id),
        (None, None) => Err(CheckoutError::Transport(
            "createPaymentMethod returned neither error nor paymentMethod".into(),
        )),
    }
}

/// Stripe.js behind the [`PaymentProcessor`] port.
#[derive(Clone, Debug)]
pub struct StripeProcessor {
    stripe: JsStripe,
    card: JsCardElement,
}

impl StripeProcessor {
    pub fn new(stripe: JsStripe, card: JsCardElement) -> Self {
        Self { stripe, card }
    }

    pub fn card(&self) -> &JsCardElement {
        &self.card
    }
}

#[async_trait(?Send)]
impl PaymentProcessor for StripeProcessor {
    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        billing: Option<&BillingDetails>,
    ) -> Result<ConfirmationOutcome> {
        confirm_card_payment(&self.stripe, &self.card, client_secret, billing).await
    }

    async fn create_payment_method(&self, contact: &BillingContact) -> Result<String> {
        create_payment_method(&self.stripe, &self.card, contact).await
    }
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_to_transport_error)
}

/// Convert any caught `JsValue` into a `StripeError` with best effort.
fn js_to_stripe_error(value: JsValue) -> StripeError {
    from_value::<StripeError>(value.clone()).unwrap_or_else(|_| {
        StripeError::from_message(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    })
}

/// A thrown exception or rejected promise never reached Stripe's API.
fn js_to_transport_error(value: JsValue) -> CheckoutError {
    CheckoutError::Transport(js_to_stripe_error(value).message)
}

fn serde_to_checkout_error(err: serde_wasm_bindgen::Error) -> CheckoutError {
    CheckoutError::Transport(err.to_string())
}
