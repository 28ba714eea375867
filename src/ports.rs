//! Seams between the checkout workflow and the outside world.
//!
//! The workflow only talks to these traits. In the browser they are backed by
//! the DOM ([`crate::dom`]), `gloo-net` ([`crate::backend`]) and Stripe.js
//! ([`crate::client`]); tests substitute recording mocks.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    BillingContact, BillingDetails, ConfirmationOutcome, FormSnapshot, IntentResponse,
};

/// Color of a toast notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastVariant {
    Success,
    Danger,
}

impl ToastVariant {
    /// Bootstrap contextual class suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastVariant::Success => "success",
            ToastVariant::Danger => "danger",
        }
    }
}

/// Everything the workflow changes on the page.
pub trait CheckoutView {
    fn set_submit_enabled(&self, enabled: bool);
    fn set_submit_label(&self, label: &str);
    fn set_busy_indicator(&self, visible: bool);
    /// Replace the inline error text; an empty string clears it.
    fn set_error_text(&self, text: &str);
    fn show_toast(&self, message: &str, variant: ToastVariant);
    fn show_empty_summary(&self, message: &str);
    fn set_total(&self, formatted: &str);
    fn reset_form(&self);
    /// Disable every input of the form, submit control included.
    fn disable_inputs(&self);
    fn redirect(&self, url: &str);
}

/// The shop backend.
#[async_trait(?Send)]
pub trait PaymentBackend {
    async fn create_payment_intent(&self, form: &FormSnapshot) -> Result<IntentResponse>;

    /// `form` already carries the `payment_method_id` field.
    async fn create_subscription(&self, form: &FormSnapshot) -> Result<IntentResponse>;

    /// Fire-and-forget: the response is never inspected.
    fn clear_cart(&self, csrf_token: &str);
}

/// The payment processor, holding the card widget reference itself.
#[async_trait(?Send)]
pub trait PaymentProcessor {
    /// Confirm a PaymentIntent. `billing` is attached to the card on one-time
    /// payments and omitted for subscriptions.
    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        billing: Option<&BillingDetails>,
    ) -> Result<ConfirmationOutcome>;

    /// Tokenize the card widget, returning the PaymentMethod id.
    async fn create_payment_method(&self, contact: &BillingContact) -> Result<String>;
}
