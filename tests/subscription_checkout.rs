#![cfg(not(target_arch = "wasm32"))]

mod common;

use common::*;
use fithub_checkout::{
    CheckoutError, CheckoutState, ConfirmationOutcome, IntentResponse, SubmitOutcome,
    SubscriptionCheckout, SubscriptionOptions, PAYMENT_METHOD_FIELD, SUBSCRIBE_LABEL,
};

type Checkout = SubscriptionCheckout<MockView, MockBackend, MockProcessor>;

fn subscription(view: &MockView, backend: MockBackend, processor: MockProcessor) -> Checkout {
    SubscriptionCheckout::new(
        view.clone(),
        backend.observing(view),
        processor.observing(view),
        SubscriptionOptions::new("/subscriptions/success/"),
    )
}

fn view() -> MockView {
    MockView::new(SUBSCRIBE_LABEL, "€29.00")
}

#[tokio::test]
async fn test_success_redirects_to_subscription_page() {
    let view = view();
    let checkout = subscription(
        &view,
        MockBackend::new().with_subscription(Ok(IntentResponse::secret("pi_sub_secret"))),
        MockProcessor::new()
            .with_payment_method(Ok("pm_123".into()))
            .with_confirmation(Ok(ConfirmationOutcome::Succeeded)),
    );

    let outcome = checkout.submit(subscription_form()).await;

    assert_eq!(outcome, SubmitOutcome::Succeeded);
    assert_eq!(checkout.state(), CheckoutState::Succeeded);
    assert_eq!(
        view.redirects(),
        vec!["/subscriptions/success/".to_string()]
    );
    assert!(view.toasts().is_empty());
    assert!(checkout.backend().cart_clears.borrow().is_empty());
}

#[tokio::test]
async fn test_payment_method_is_attached_to_backend_request() {
    let view = view();
    let checkout = subscription(
        &view,
        MockBackend::new().with_subscription(Ok(IntentResponse::secret("pi_sub_secret"))),
        MockProcessor::new()
            .with_payment_method(Ok("pm_123".into()))
            .with_confirmation(Ok(ConfirmationOutcome::Succeeded)),
    );

    checkout.submit(subscription_form()).await;

    let calls = checkout.backend().subscription_calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].get(PAYMENT_METHOD_FIELD), Some("pm_123"));
    assert_eq!(calls[0].get("plan"), Some("pro"));
    assert_eq!(calls[0].csrf_token(), "csrf-xyz");

    let contacts = checkout.processor().tokenize_calls.borrow();
    assert_eq!(contacts[0].name, "Alex Roe");
    assert_eq!(contacts[0].email, "alex@example.com");
}

#[tokio::test]
async fn test_confirmation_resends_no_billing_details() {
    let view = view();
    let checkout = subscription(
        &view,
        MockBackend::new().with_subscription(Ok(IntentResponse::secret("pi_sub_secret"))),
        MockProcessor::new()
            .with_payment_method(Ok("pm_123".into()))
            .with_confirmation(Ok(ConfirmationOutcome::Succeeded)),
    );

    checkout.submit(subscription_form()).await;

    let confirm_calls = checkout.processor().confirm_calls.borrow();
    assert_eq!(
        confirm_calls.as_slice(),
        &[("pi_sub_secret".to_string(), None)]
    );
}

#[tokio::test]
async fn test_tokenization_error_skips_backend() {
    let view = view();
    let checkout = subscription(
        &view,
        MockBackend::new(),
        MockProcessor::new().with_payment_method(Err(declined("Your card number is invalid."))),
    );

    let outcome = checkout.submit(subscription_form()).await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(CheckoutError::Processor(_))
    ));
    assert!(checkout.backend().subscription_calls.borrow().is_empty());
    assert_eq!(view.error_text(), "Your card number is invalid.");
    assert!(view.submit_enabled());
    assert!(!view.busy());
    assert_eq!(view.label(), SUBSCRIBE_LABEL);
    assert_eq!(checkout.state(), CheckoutState::Idle);
}

#[tokio::test]
async fn test_backend_error_never_confirms() {
    let view = view();
    let checkout = subscription(
        &view,
        MockBackend::new().with_subscription(Ok(IntentResponse::error("No such plan"))),
        MockProcessor::new().with_payment_method(Ok("pm_123".into())),
    );

    let outcome = checkout.submit(subscription_form()).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(CheckoutError::Backend("No such plan".into()))
    );
    assert!(checkout.processor().confirm_calls.borrow().is_empty());
    assert_eq!(view.error_text(), "No such plan");
    assert!(view.toasts().is_empty());
    assert!(view.submit_enabled());
    assert!(view.redirects().is_empty());
}

#[tokio::test]
async fn test_confirmation_error_recovers() {
    let view = view();
    let checkout = subscription(
        &view,
        MockBackend::new().with_subscription(Ok(IntentResponse::secret("pi_sub_secret"))),
        MockProcessor::new()
            .with_payment_method(Ok("pm_123".into()))
            .with_confirmation(Err(declined("Your card has insufficient funds."))),
    );

    checkout.submit(subscription_form()).await;

    assert_eq!(view.error_text(), "Your card has insufficient funds.");
    assert!(view.submit_enabled());
    assert!(view.redirects().is_empty());
    assert_eq!(checkout.state(), CheckoutState::Idle);
}

#[tokio::test]
async fn test_control_disabled_for_all_three_remote_calls() {
    let view = view();
    let checkout = subscription(
        &view,
        MockBackend::new().with_subscription(Ok(IntentResponse::secret("pi_sub_secret"))),
        MockProcessor::new()
            .with_payment_method(Ok("pm_123".into()))
            .with_confirmation(Ok(ConfirmationOutcome::Succeeded)),
    );

    checkout.submit(subscription_form()).await;

    assert_eq!(
        *checkout.backend().enabled_during_calls.borrow(),
        vec![false]
    );
    assert_eq!(
        *checkout.processor().enabled_during_calls.borrow(),
        vec![false, false]
    );
}

#[tokio::test]
async fn test_pending_status_recovers_without_redirect() {
    let view = view();
    let checkout = subscription(
        &view,
        MockBackend::new().with_subscription(Ok(IntentResponse::secret("pi_sub_secret"))),
        MockProcessor::new()
            .with_payment_method(Ok("pm_123".into()))
            .with_confirmation(Ok(ConfirmationOutcome::Pending("processing".into()))),
    );

    let outcome = checkout.submit(subscription_form()).await;

    assert_eq!(outcome, SubmitOutcome::RequiresAction("processing".into()));
    assert!(view.redirects().is_empty());
    assert!(view.submit_enabled());
}

#[tokio::test]
async fn test_submit_after_success_is_ignored() {
    let view = view();
    let checkout = subscription(
        &view,
        MockBackend::new().with_subscription(Ok(IntentResponse::secret("pi_sub_secret"))),
        MockProcessor::new()
            .with_payment_method(Ok("pm_123".into()))
            .with_confirmation(Ok(ConfirmationOutcome::Succeeded)),
    );

    checkout.submit(subscription_form()).await;
    assert_eq!(
        checkout.submit(subscription_form()).await,
        SubmitOutcome::Ignored
    );
    assert_eq!(checkout.processor().tokenize_calls.borrow().len(), 1);
}
