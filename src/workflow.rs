//! Checkout submission workflows.
//!
//! [`OneTimeCheckout`] drives the cart payment form and
//! [`SubscriptionCheckout`] the plan subscription form. Both sequence the same
//! steps (backend intent, processor confirmation) over a shared [`Session`]
//! that owns the state machine and the submit control. Remote calls are
//! awaited one after another; any failure, transport errors included, puts
//! the form back into a resubmittable state.

use std::cell::Cell;

use async_trait::async_trait;

use crate::config::{PageConfig, SuccessMode};
use crate::error::CheckoutError;
use crate::model::{ConfirmationOutcome, FormSnapshot, IntentResponse, Money, PAYMENT_METHOD_FIELD};
use crate::ports::{CheckoutView, PaymentBackend, PaymentProcessor, ToastVariant};
use crate::state::CheckoutState;

pub const BUSY_LABEL: &str = "Processing...";
pub const PAY_LABEL: &str = "Confirm & Pay";
pub const SUBSCRIBE_LABEL: &str = "Subscribe & Pay";
pub const PAID_LABEL: &str = "Paid";
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty.";
pub const PAYMENT_SUCCESS_MESSAGE: &str = "Payment successful! Thank you for your order.";

/// Result of one call to `submit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form was not idle; nothing was sent.
    Ignored,
    Succeeded,
    /// Recovered from an error; the form is resubmittable.
    Failed(CheckoutError),
    /// Confirmed with a status other than `succeeded`; the form is resubmittable.
    RequiresAction(String),
}

/// A wired checkout form, as seen by the page's event listeners.
#[async_trait(?Send)]
pub trait CheckoutFlow {
    async fn submit(&self, form: FormSnapshot) -> SubmitOutcome;
    fn widget_changed(&self, error: Option<&str>);
}

/// Button texts used by a form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labels {
    pub idle: String,
    pub busy: String,
    pub paid: String,
}

impl Labels {
    pub fn new(idle: impl Into<String>) -> Self {
        Self {
            idle: idle.into(),
            busy: BUSY_LABEL.into(),
            paid: PAID_LABEL.into(),
        }
    }
}

/// Terminal success handling of the one-time form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuccessBehavior {
    InPage {
        empty_summary: String,
        zero_total: Money,
        message: String,
    },
    Redirect(String),
}

/// Settings of the one-time payment form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OneTimeOptions {
    pub labels: Labels,
    pub billing_email: String,
    pub success: SuccessBehavior,
    /// Mirror error messages into a danger toast.
    pub toast_errors: bool,
}

impl OneTimeOptions {
    /// In-page success with toasts.
    pub fn in_page(billing_email: impl Into<String>, currency_symbol: &str) -> Self {
        Self {
            labels: Labels::new(PAY_LABEL),
            billing_email: billing_email.into(),
            success: SuccessBehavior::InPage {
                empty_summary: EMPTY_CART_MESSAGE.into(),
                zero_total: Money::zero(currency_symbol),
                message: PAYMENT_SUCCESS_MESSAGE.into(),
            },
            toast_errors: true,
        }
    }

    /// Redirect on success, inline errors only.
    pub fn redirect(billing_email: impl Into<String>, success_url: impl Into<String>) -> Self {
        Self {
            labels: Labels::new(PAY_LABEL),
            billing_email: billing_email.into(),
            success: SuccessBehavior::Redirect(success_url.into()),
            toast_errors: false,
        }
    }

    pub fn from_config(config: &PageConfig) -> Self {
        match (config.checkout_success_mode, config.success_url()) {
            (SuccessMode::Redirect, Some(url)) => Self::redirect(config.email(), url),
            (SuccessMode::Redirect, None) => {
                tracing::warn!(
                    "redirect success mode without CHECKOUT_SUCCESS_URL, staying in page"
                );
                Self::in_page(config.email(), &config.currency_symbol)
            }
            (SuccessMode::InPage, _) => Self::in_page(config.email(), &config.currency_symbol),
        }
    }
}

/// Settings of the subscription form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionOptions {
    pub labels: Labels,
    pub success_url: String,
    pub toast_errors: bool,
}

impl SubscriptionOptions {
    pub fn new(success_url: impl Into<String>) -> Self {
        Self {
            labels: Labels::new(SUBSCRIBE_LABEL),
            success_url: success_url.into(),
            toast_errors: false,
        }
    }

    pub fn from_config(config: &PageConfig) -> Self {
        Self::new(config.subscription_success_url.clone())
    }
}

/// The per-form state machine and the submit control it guards.
pub struct Session<V> {
    view: V,
    state: Cell<CheckoutState>,
    labels: Labels,
    toast_errors: bool,
}

impl<V: CheckoutView> Session<V> {
    pub fn new(view: V, labels: Labels, toast_errors: bool) -> Self {
        Self {
            view,
            state: Cell::new(CheckoutState::Idle),
            labels,
            toast_errors,
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state.get()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    fn transition(&self, next: CheckoutState) {
        let current = self.state.get();
        debug_assert!(
            current.can_transition_to(next),
            "invalid checkout transition {current} -> {next}"
        );
        tracing::debug!("checkout: {current} -> {next}");
        self.state.set(next);
    }

    /// Leave `Idle` for `first`, locking the submit control before anything
    /// else happens. Returns `false` if a submission is already running or
    /// the session is consumed.
    fn begin(&self, first: CheckoutState) -> bool {
        if !self.state.get().accepts_submit() {
            tracing::debug!("checkout: submit ignored in state {}", self.state.get());
            return false;
        }
        self.transition(first);
        self.view.set_submit_enabled(false);
        self.view.set_submit_label(&self.labels.busy);
        self.view.set_busy_indicator(true);
        self.view.set_error_text("");
        true
    }

    /// Give the control back to the user after `exit`.
    fn recover(&self, exit: CheckoutState, message: &str) {
        self.transition(exit);
        self.view.set_error_text(message);
        self.view.set_submit_label(&self.labels.idle);
        self.view.set_busy_indicator(false);
        self.view.set_submit_enabled(true);
        self.transition(CheckoutState::Idle);
    }

    fn fail(&self, exit: CheckoutState, err: CheckoutError) -> SubmitOutcome {
        tracing::warn!("checkout {exit}: {err}");
        let message = err.user_message();
        if self.toast_errors {
            self.view
                .show_toast(&format!("Payment failed: {message}"), ToastVariant::Danger);
        }
        self.recover(exit, &message);
        SubmitOutcome::Failed(err)
    }

    fn requires_action(&self, status: String) -> SubmitOutcome {
        tracing::warn!("checkout confirmed with status {status}");
        let message = format!("Payment not completed (status: {status}). Please try again.");
        if self.toast_errors {
            self.view.show_toast(&message, ToastVariant::Danger);
        }
        self.recover(CheckoutState::RequiresAction, &message);
        SubmitOutcome::RequiresAction(status)
    }

    /// Validation feedback from the card widget. Never touches the state.
    pub fn widget_changed(&self, error: Option<&str>) {
        self.view.set_error_text(error.unwrap_or_default());
    }
}

/// One-time card payment for the cart.
pub struct OneTimeCheckout<V, B, P> {
    session: Session<V>,
    backend: B,
    processor: P,
    billing_email: String,
    success: SuccessBehavior,
}

impl<V, B, P> OneTimeCheckout<V, B, P>
where
    V: CheckoutView,
    B: PaymentBackend,
    P: PaymentProcessor,
{
    pub fn new(view: V, backend: B, processor: P, options: OneTimeOptions) -> Self {
        Self {
            session: Session::new(view, options.labels, options.toast_errors),
            backend,
            processor,
            billing_email: options.billing_email,
            success: options.success,
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.session.state()
    }

    pub fn view(&self) -> &V {
        self.session.view()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn widget_changed(&self, error: Option<&str>) {
        self.session.widget_changed(error);
    }

    /// Run one submission attempt for `form`.
    pub async fn submit(&self, form: FormSnapshot) -> SubmitOutcome {
        if !self.session.begin(CheckoutState::Submitting) {
            return SubmitOutcome::Ignored;
        }

        self.session.transition(CheckoutState::AwaitingIntent);
        let secret = match self
            .backend
            .create_payment_intent(&form)
            .await
            .and_then(IntentResponse::into_client_secret)
        {
            Ok(secret) => secret,
            Err(err) => return self.session.fail(CheckoutState::IntentError, err),
        };

        self.session.transition(CheckoutState::AwaitingConfirmation);
        let billing = form.billing_details(&self.billing_email);
        match self.processor.confirm_card_payment(&secret, Some(&billing)).await {
            Ok(ConfirmationOutcome::Succeeded) => {
                self.session.transition(CheckoutState::Succeeded);
                self.finish(&form);
                SubmitOutcome::Succeeded
            }
            Ok(ConfirmationOutcome::Pending(status)) => self.session.requires_action(status),
            Err(err) => self.session.fail(CheckoutState::ConfirmationError, err),
        }
    }

    fn finish(&self, form: &FormSnapshot) {
        let view = self.session.view();
        match &self.success {
            SuccessBehavior::Redirect(url) => {
                tracing::info!("payment succeeded, redirecting to {url}");
                view.redirect(url);
            }
            SuccessBehavior::InPage {
                empty_summary,
                zero_total,
                message,
            } => {
                tracing::info!("payment succeeded");
                view.show_toast(message, ToastVariant::Success);
                self.backend.clear_cart(form.csrf_token());
                view.show_empty_summary(empty_summary);
                view.set_total(&zero_total.to_string());
                view.reset_form();
                view.disable_inputs();
                view.set_submit_enabled(false);
                view.set_submit_label(&self.session.labels().paid);
                view.set_busy_indicator(false);
            }
        }
    }
}

/// Subscription sign-up: tokenize the card, then create and confirm.
pub struct SubscriptionCheckout<V, B, P> {
    session: Session<V>,
    backend: B,
    processor: P,
    success_url: String,
}

impl<V, B, P> SubscriptionCheckout<V, B, P>
where
    V: CheckoutView,
    B: PaymentBackend,
    P: PaymentProcessor,
{
    pub fn new(view: V, backend: B, processor: P, options: SubscriptionOptions) -> Self {
        Self {
            session: Session::new(view, options.labels, options.toast_errors),
            backend,
            processor,
            success_url: options.success_url,
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.session.state()
    }

    pub fn view(&self) -> &V {
        self.session.view()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn widget_changed(&self, error: Option<&str>) {
        self.session.widget_changed(error);
    }

    pub async fn submit(&self, form: FormSnapshot) -> SubmitOutcome {
        if !self.session.begin(CheckoutState::Tokenizing) {
            return SubmitOutcome::Ignored;
        }

        let contact = form.billing_contact();
        let payment_method = match self.processor.create_payment_method(&contact).await {
            Ok(id) => id,
            Err(err) => return self.session.fail(CheckoutState::TokenizationError, err),
        };

        self.session.transition(CheckoutState::Submitting);
        let form = form.with_field(PAYMENT_METHOD_FIELD, payment_method);

        self.session.transition(CheckoutState::AwaitingIntent);
        let secret = match self
            .backend
            .create_subscription(&form)
            .await
            .and_then(IntentResponse::into_client_secret)
        {
            Ok(secret) => secret,
            Err(err) => return self.session.fail(CheckoutState::IntentError, err),
        };

        self.session.transition(CheckoutState::AwaitingConfirmation);
        match self.processor.confirm_card_payment(&secret, None).await {
            Ok(ConfirmationOutcome::Succeeded) => {
                self.session.transition(CheckoutState::Succeeded);
                tracing::info!(
                    "subscription payment succeeded, redirecting to {}",
                    self.success_url
                );
                self.session.view().redirect(&self.success_url);
                SubmitOutcome::Succeeded
            }
            Ok(ConfirmationOutcome::Pending(status)) => self.session.requires_action(status),
            Err(err) => self.session.fail(CheckoutState::ConfirmationError, err),
        }
    }
}

#[async_trait(?Send)]
impl<V, B, P> CheckoutFlow for OneTimeCheckout<V, B, P>
where
    V: CheckoutView,
    B: PaymentBackend,
    P: PaymentProcessor,
{
    async fn submit(&self, form: FormSnapshot) -> SubmitOutcome {
        OneTimeCheckout::submit(self, form).await
    }

    fn widget_changed(&self, error: Option<&str>) {
        OneTimeCheckout::widget_changed(self, error);
    }
}

#[async_trait(?Send)]
impl<V, B, P> CheckoutFlow for SubscriptionCheckout<V, B, P>
where
    V: CheckoutView,
    B: PaymentBackend,
    P: PaymentProcessor,
{
    async fn submit(&self, form: FormSnapshot) -> SubmitOutcome {
        SubscriptionCheckout::submit(self, form).await
    }

    fn widget_changed(&self, error: Option<&str>) {
        SubscriptionCheckout::widget_changed(self, error);
    }
}
