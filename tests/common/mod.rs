#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use fithub_checkout::error::Result;
use fithub_checkout::{
    BillingContact, BillingDetails, CheckoutError, CheckoutView, ConfirmationOutcome,
    FormSnapshot, IntentResponse, PaymentBackend, PaymentProcessor, StripeError, ToastVariant,
    CSRF_FIELD,
};
use tokio::sync::oneshot;

pub fn checkout_form() -> FormSnapshot {
    FormSnapshot::new()
        .with_field(CSRF_FIELD, "csrf-abc")
        .with_field("full_name", "Sam Doe")
        .with_field("address", "1 Main St")
        .with_field("city", "Dublin")
        .with_field("postcode", "D01 F5P2")
        .with_field("country", "IE")
}

pub fn subscription_form() -> FormSnapshot {
    FormSnapshot::new()
        .with_field(CSRF_FIELD, "csrf-xyz")
        .with_field("plan", "pro")
        .with_field("full_name", "Alex Roe")
        .with_field("email", "alex@example.com")
}

pub fn declined(message: &str) -> CheckoutError {
    CheckoutError::Processor(StripeError {
        message: message.into(),
        error_type: Some("card_error".into()),
        code: Some("card_declined".into()),
    })
}

/// Everything the workflow did to the page.
pub struct ViewState {
    pub submit_enabled: Cell<bool>,
    pub label: RefCell<String>,
    pub busy: Cell<bool>,
    pub error_text: RefCell<String>,
    pub toasts: RefCell<Vec<(String, ToastVariant)>>,
    pub summary: RefCell<Option<String>>,
    pub total: RefCell<String>,
    pub form_resets: Cell<usize>,
    pub inputs_disabled: Cell<bool>,
    pub redirects: RefCell<Vec<String>>,
}

#[derive(Clone)]
pub struct MockView(pub Rc<ViewState>);

impl MockView {
    pub fn new(label: &str, total: &str) -> Self {
        Self(Rc::new(ViewState {
            submit_enabled: Cell::new(true),
            label: RefCell::new(label.into()),
            busy: Cell::new(false),
            error_text: RefCell::new(String::new()),
            toasts: RefCell::new(Vec::new()),
            summary: RefCell::new(None),
            total: RefCell::new(total.into()),
            form_resets: Cell::new(0),
            inputs_disabled: Cell::new(false),
            redirects: RefCell::new(Vec::new()),
        }))
    }

    pub fn submit_enabled(&self) -> bool {
        self.0.submit_enabled.get()
    }

    pub fn label(&self) -> String {
        self.0.label.borrow().clone()
    }

    pub fn busy(&self) -> bool {
        self.0.busy.get()
    }

    pub fn error_text(&self) -> String {
        self.0.error_text.borrow().clone()
    }

    pub fn toasts(&self) -> Vec<(String, ToastVariant)> {
        self.0.toasts.borrow().clone()
    }

    pub fn summary(&self) -> Option<String> {
        self.0.summary.borrow().clone()
    }

    pub fn total(&self) -> String {
        self.0.total.borrow().clone()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.0.redirects.borrow().clone()
    }
}

impl CheckoutView for MockView {
    fn set_submit_enabled(&self, enabled: bool) {
        self.0.submit_enabled.set(enabled);
    }

    fn set_submit_label(&self, label: &str) {
        *self.0.label.borrow_mut() = label.into();
    }

    fn set_busy_indicator(&self, visible: bool) {
        self.0.busy.set(visible);
    }

    fn set_error_text(&self, text: &str) {
        *self.0.error_text.borrow_mut() = text.into();
    }

    fn show_toast(&self, message: &str, variant: ToastVariant) {
        self.0.toasts.borrow_mut().push((message.into(), variant));
    }

    fn show_empty_summary(&self, message: &str) {
        *self.0.summary.borrow_mut() = Some(message.into());
    }

    fn set_total(&self, formatted: &str) {
        *self.0.total.borrow_mut() = formatted.into();
    }

    fn reset_form(&self) {
        self.0.form_resets.set(self.0.form_resets.get() + 1);
    }

    fn disable_inputs(&self) {
        self.0.inputs_disabled.set(true);
        self.0.submit_enabled.set(false);
    }

    fn redirect(&self, url: &str) {
        self.0.redirects.borrow_mut().push(url.into());
    }
}

/// Scripted backend. Panics on a call it has no answer for.
#[derive(Default)]
pub struct MockBackend {
    observed: Option<MockView>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    intents: RefCell<VecDeque<Result<IntentResponse>>>,
    subscriptions: RefCell<VecDeque<Result<IntentResponse>>>,
    pub intent_calls: RefCell<Vec<FormSnapshot>>,
    pub subscription_calls: RefCell<Vec<FormSnapshot>>,
    pub cart_clears: RefCell<Vec<String>>,
    /// Submit-control state seen at each remote call.
    pub enabled_during_calls: RefCell<Vec<bool>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observing(mut self, view: &MockView) -> Self {
        self.observed = Some(view.clone());
        self
    }

    /// Hold intent creation until `gate` fires.
    pub fn gated(self, gate: oneshot::Receiver<()>) -> Self {
        *self.gate.borrow_mut() = Some(gate);
        self
    }

    pub fn with_intent(self, response: Result<IntentResponse>) -> Self {
        self.intents.borrow_mut().push_back(response);
        self
    }

    pub fn with_subscription(self, response: Result<IntentResponse>) -> Self {
        self.subscriptions.borrow_mut().push_back(response);
        self
    }

    fn observe(&self) {
        if let Some(view) = &self.observed {
            self.enabled_during_calls
                .borrow_mut()
                .push(view.submit_enabled());
        }
    }
}

#[async_trait(?Send)]
impl PaymentBackend for MockBackend {
    async fn create_payment_intent(&self, form: &FormSnapshot) -> Result<IntentResponse> {
        self.observe();
        self.intent_calls.borrow_mut().push(form.clone());
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.intents
            .borrow_mut()
            .pop_front()
            .expect("unexpected create_payment_intent call")
    }

    async fn create_subscription(&self, form: &FormSnapshot) -> Result<IntentResponse> {
        self.observe();
        self.subscription_calls.borrow_mut().push(form.clone());
        self.subscriptions
            .borrow_mut()
            .pop_front()
            .expect("unexpected create_subscription call")
    }

    fn clear_cart(&self, csrf_token: &str) {
        self.cart_clears.borrow_mut().push(csrf_token.into());
    }
}

/// Scripted processor. Panics on a call it has no answer for.
#[derive(Default)]
pub struct MockProcessor {
    observed: Option<MockView>,
    confirmations: RefCell<VecDeque<Result<ConfirmationOutcome>>>,
    methods: RefCell<VecDeque<Result<String>>>,
    pub confirm_calls: RefCell<Vec<(String, Option<BillingDetails>)>>,
    pub tokenize_calls: RefCell<Vec<BillingContact>>,
    pub enabled_during_calls: RefCell<Vec<bool>>,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observing(mut self, view: &MockView) -> Self {
        self.observed = Some(view.clone());
        self
    }

    pub fn with_confirmation(self, outcome: Result<ConfirmationOutcome>) -> Self {
        self.confirmations.borrow_mut().push_back(outcome);
        self
    }

    pub fn with_payment_method(self, outcome: Result<String>) -> Self {
        self.methods.borrow_mut().push_back(outcome);
        self
    }

    fn observe(&self) {
        if let Some(view) = &self.observed {
            self.enabled_during_calls
                .borrow_mut()
                .push(view.submit_enabled());
        }
    }
}

#[async_trait(?Send)]
impl PaymentProcessor for MockProcessor {
    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        billing: Option<&BillingDetails>,
    ) -> Result<ConfirmationOutcome> {
        self.observe();
        self.confirm_calls
            .borrow_mut()
            .push((client_secret.into(), billing.cloned()));
        self.confirmations
            .borrow_mut()
            .pop_front()
            .expect("unexpected confirm_card_payment call")
    }

    async fn create_payment_method(&self, contact: &BillingContact) -> Result<String> {
        self.observe();
        self.tokenize_calls.borrow_mut().push(contact.clone());
        self.methods
            .borrow_mut()
            .pop_front()
            .expect("unexpected create_payment_method call")
    }
}
